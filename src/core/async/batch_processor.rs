//! Concurrent reconciliation with our-number partitioning
//!
//! `BatchProcessor` splits the decoded events by our-number. Each partition is
//! reconciled sequentially on its own tokio task, so events for one boleto keep
//! their file order while different boletos progress in parallel. Results are
//! merged back into the original event order, which makes the report identical
//! to a sequential run.
//!
//! ```text
//! BatchProcessor
//!     ├── Arc<SharedBoletoStore>  (per-record locking)
//!     └── as_of                   (reference date for overdue events)
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::join_all;
use tracing::{error, info};

use super::SharedBoletoStore;
use crate::core::reconciler::{apply_event, ReconciliationResult};
use crate::core::state_machine::Applied;
use crate::types::{BoletoError, ReturnEvent};

/// Outcome of one event, tagged with its position in the input
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    pub index: usize,
    pub event: ReturnEvent,
    pub result: Result<Applied, BoletoError>,
}

#[derive(Debug, Clone)]
pub struct BatchProcessor {
    store: Arc<SharedBoletoStore>,
    as_of: NaiveDate,
}

impl BatchProcessor {
    pub fn new(store: Arc<SharedBoletoStore>, as_of: NaiveDate) -> Self {
        Self { store, as_of }
    }

    /// Group events by our-number, preserving order inside each group
    pub fn partition_by_our_number(
        &self,
        events: Vec<ReturnEvent>,
    ) -> HashMap<String, Vec<(usize, ReturnEvent)>> {
        let mut partitions: HashMap<String, Vec<(usize, ReturnEvent)>> = HashMap::new();

        for (index, event) in events.into_iter().enumerate() {
            partitions
                .entry(event.our_number.clone())
                .or_default()
                .push((index, event));
        }

        partitions
    }

    /// Reconcile one partition in order
    pub async fn process_partition(
        &self,
        events: Vec<(usize, ReturnEvent)>,
    ) -> Vec<ProcessingResult> {
        let mut results = Vec::with_capacity(events.len());

        for (index, event) in events {
            let result = self
                .store
                .update(&event.our_number, |record| apply_event(&event, self.as_of, record));
            results.push(ProcessingResult {
                index,
                event,
                result,
            });
        }

        results
    }

    /// Reconcile every event, partitions running concurrently
    pub async fn process_batch(&self, events: Vec<ReturnEvent>) -> ReconciliationResult {
        let partitions = self.partition_by_our_number(events);
        info!(partitions = partitions.len(), "Dispatching reconciliation partitions");

        let (pending, tasks): (Vec<_>, Vec<_>) = partitions
            .into_values()
            .map(|partition| {
                let processor = self.clone();
                let pending = partition.clone();
                let task =
                    tokio::spawn(async move { processor.process_partition(partition).await });
                (pending, task)
            })
            .unzip();

        let mut outcomes = Vec::new();
        for (partition, joined) in pending.into_iter().zip(join_all(tasks).await) {
            match joined {
                Ok(partition_results) => outcomes.extend(partition_results),
                Err(e) => {
                    error!(error = %e, events = partition.len(), "Reconciliation task panicked");
                    outcomes.extend(failed_partition(partition, &e.to_string()));
                }
            }
        }
        outcomes.sort_by_key(|outcome| outcome.index);

        let mut result = ReconciliationResult::new();
        for outcome in outcomes {
            result.push(outcome.event, outcome.result);
        }

        info!(
            applied = result.applied.len(),
            changed = result.changed(),
            rejected = result.rejected.len(),
            "Reconciliation finished"
        );
        result
    }
}

/// Reject every event of a partition whose task never reported back
///
/// Whatever the task applied before failing stays in the store; the events
/// are still reported so none silently vanish from the run.
fn failed_partition(events: Vec<(usize, ReturnEvent)>, reason: &str) -> Vec<ProcessingResult> {
    events
        .into_iter()
        .map(|(index, event)| ProcessingResult {
            index,
            event,
            result: Err(BoletoError::IoError {
                message: format!("reconciliation task failed: {}", reason),
            }),
        })
        .collect()
}
