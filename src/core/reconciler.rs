//! Reconciliation coordinator
//!
//! Drives decoded return events through the state machine against the
//! persisted boleto set. Each event touches at most one boleto, inside the
//! repository's exclusive `update` scope. Failures are per event: the rest of
//! the file still applies.
//!
//! Rejections keep their specific kind. An unknown our-number
//! ([`BoletoError::UnknownBoleto`]) is reported separately from a known
//! boleto whose transition is illegal, so operators can tell "the bank sent
//! something we never issued" from "we cannot apply this to our boleto".

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::state_machine::{apply, mark_overdue_if_due, Applied, Transition, TransitionOutcome};
use super::traits::{BoletoRepository, LookupOverlay};
use crate::types::{BoletoError, BoletoRecord, ReturnEvent};

/// An event that was applied, with the boleto as it now stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedEvent {
    pub event: ReturnEvent,
    pub record: BoletoRecord,
    pub outcome: TransitionOutcome,
}

/// An event that could not be applied
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedEvent {
    pub event: ReturnEvent,
    pub reason: BoletoError,
}

/// Partition of a run's events into applied and rejected
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconciliationResult {
    pub applied: Vec<AppliedEvent>,
    pub rejected: Vec<RejectedEvent>,
}

impl ReconciliationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// File the outcome of one event
    pub fn push(&mut self, event: ReturnEvent, outcome: Result<Applied, BoletoError>) {
        match outcome {
            Ok(applied) => self.applied.push(AppliedEvent {
                event,
                record: applied.record,
                outcome: applied.outcome,
            }),
            Err(reason) => {
                warn!(
                    line = event.line,
                    our_number = %event.our_number,
                    kind = reason.kind(),
                    %reason,
                    "Return event rejected"
                );
                self.rejected.push(RejectedEvent { event, reason });
            }
        }
    }

    /// Number of applied events that actually changed a boleto
    pub fn changed(&self) -> usize {
        self.applied
            .iter()
            .filter(|applied| applied.outcome == TransitionOutcome::Changed)
            .count()
    }
}

/// Translate `event` and apply it to `record` in place
///
/// The record is only overwritten when the transition is legal; on error it
/// is left exactly as it was.
pub fn apply_event(
    event: &ReturnEvent,
    as_of: NaiveDate,
    record: &mut BoletoRecord,
) -> Result<Applied, BoletoError> {
    let transition = Transition::from_event(event, as_of)?;
    let applied = apply(record, &transition)?;
    if applied.outcome == TransitionOutcome::Changed {
        *record = applied.record.clone();
    }
    debug!(
        our_number = %event.our_number,
        status = %applied.record.status,
        outcome = ?applied.outcome,
        "Return event applied"
    );
    Ok(applied)
}

/// Sequential reconciliation against a repository
#[derive(Debug, Clone, Copy)]
pub struct Reconciler {
    /// Reference date for overdue events that carry no occurrence date
    as_of: NaiveDate,
}

impl Reconciler {
    pub fn new(as_of: NaiveDate) -> Self {
        Reconciler { as_of }
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    /// Apply one event through the repository's exclusive scope
    pub fn reconcile_event<R: BoletoRepository>(
        &self,
        event: &ReturnEvent,
        repository: &mut R,
    ) -> Result<Applied, BoletoError> {
        repository.update(&event.our_number, |record| {
            apply_event(event, self.as_of, record)
        })
    }

    /// Apply every event in order, collecting per-event outcomes
    pub fn reconcile<R: BoletoRepository>(
        &self,
        events: Vec<ReturnEvent>,
        repository: &mut R,
    ) -> ReconciliationResult {
        let mut result = ReconciliationResult::new();
        for event in events {
            let outcome = self.reconcile_event(&event, repository);
            result.push(event, outcome);
        }

        info!(
            applied = result.applied.len(),
            changed = result.changed(),
            rejected = result.rejected.len(),
            "Reconciliation finished"
        );
        result
    }

    /// Reconcile against a lookup callback instead of a repository
    ///
    /// Returns the result together with the latest version of every boleto
    /// the run looked up, for the caller to persist.
    pub fn reconcile_with_lookup<L>(
        &self,
        events: Vec<ReturnEvent>,
        lookup: L,
    ) -> (ReconciliationResult, Vec<BoletoRecord>)
    where
        L: FnMut(&str) -> Option<BoletoRecord>,
    {
        let mut overlay = LookupOverlay::new(lookup);
        let result = self.reconcile(events, &mut overlay);
        let mut touched: Vec<BoletoRecord> = overlay.into_touched().into_values().collect();
        touched.sort_by_key(|record| record.id);
        (result, touched)
    }
}

/// Mark every issued boleto past its due date as overdue
///
/// Returns the boletos that changed.
pub fn sweep_overdue<R: BoletoRepository>(repository: &mut R, today: NaiveDate) -> Vec<BoletoRecord> {
    let mut changed = Vec::new();
    for our_number in repository.our_numbers() {
        let swept = repository.update(&our_number, |record| {
            Ok(mark_overdue_if_due(record, today).map(|applied| {
                *record = applied.record.clone();
                applied.record
            }))
        });
        if let Ok(Some(record)) = swept {
            changed.push(record);
        }
    }

    info!(%today, overdue = changed.len(), "Overdue sweep finished");
    changed
}
