//! Concurrent reconciliation strategy
//!
//! Runs the partitioned `BatchProcessor` on a tokio multi-thread runtime.
//!
//! ```text
//! AsyncReconcileStrategy
//!     ├── ReconcileConfig (max_concurrent)
//!     ├── read_return_file_async + decode_return
//!     └── BatchProcessor (our-number partitioning)
//!         └── SharedBoletoStore (DashMap, per-record locking)
//! ```
//!
//! The whole file is decoded before any task starts, so a structural error
//! still aborts the run without touching a boleto.

use crate::cnab::decode_return;
use crate::core::r#async::{BatchProcessor, SharedBoletoStore};
use crate::io::read_return_file_async;
use crate::strategy::{ReconcileReport, ReconcileStrategy};
use crate::types::{BoletoError, BoletoRecord};
use chrono::NaiveDate;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Tuning for concurrent runs
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconcileConfig {
    /// Worker threads for the tokio runtime
    pub max_concurrent: usize,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            max_concurrent: num_cpus::get(),
        }
    }
}

impl ReconcileConfig {
    /// Zero falls back to the default
    pub fn new(max_concurrent: usize) -> Self {
        let default = Self::default();

        let max_concurrent = if max_concurrent == 0 {
            warn!(
                requested = max_concurrent,
                fallback = default.max_concurrent,
                "Invalid max_concurrent, using default"
            );
            default.max_concurrent
        } else {
            max_concurrent
        };

        Self { max_concurrent }
    }
}

#[derive(Debug, Clone)]
pub struct AsyncReconcileStrategy {
    config: ReconcileConfig,
}

impl AsyncReconcileStrategy {
    pub fn new(config: ReconcileConfig) -> Self {
        Self { config }
    }
}

impl ReconcileStrategy for AsyncReconcileStrategy {
    fn process(
        &self,
        return_path: &Path,
        boletos: Vec<BoletoRecord>,
        as_of: NaiveDate,
    ) -> Result<ReconcileReport, BoletoError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent)
            .build()
            .map_err(|e| BoletoError::IoError {
                message: format!("Failed to create tokio runtime: {}", e),
            })?;

        runtime.block_on(async {
            let bytes = read_return_file_async(return_path).await?;
            let events = decode_return(&bytes)?;

            let store = Arc::new(SharedBoletoStore::from_records(boletos));
            let processor = BatchProcessor::new(Arc::clone(&store), as_of);
            let result = processor.process_batch(events).await;

            Ok(ReconcileReport {
                result,
                boletos: store.get_all_records(),
            })
        })
    }
}
