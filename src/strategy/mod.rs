//! Reconciliation strategy module
//!
//! Defines the Strategy pattern for a complete reconciliation run: reading the
//! return file, decoding it, and applying its events to the boleto set. The
//! sequential and the concurrent implementation are selected at runtime and
//! produce identical reports.

use crate::cli::StrategyType;
use crate::core::ReconciliationResult;
use crate::types::{BoletoError, BoletoRecord};
use chrono::NaiveDate;
use std::path::Path;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncReconcileStrategy, ReconcileConfig};
pub use sync::SyncReconcileStrategy;

/// Everything a reconciliation run produces
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileReport {
    pub result: ReconciliationResult,
    /// The full boleto set after the run, sorted by id
    pub boletos: Vec<BoletoRecord>,
}

/// A complete reconciliation pipeline
///
/// Structural errors in the return file abort the run before any boleto is
/// touched. Per-event failures end up in the report instead.
pub trait ReconcileStrategy: Send + Sync {
    fn process(
        &self,
        return_path: &Path,
        boletos: Vec<BoletoRecord>,
        as_of: NaiveDate,
    ) -> Result<ReconcileReport, BoletoError>;
}

pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<ReconcileConfig>,
) -> Box<dyn ReconcileStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncReconcileStrategy),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncReconcileStrategy::new(config))
        }
    }
}
