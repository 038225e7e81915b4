//! Boleto lifecycle and reconciliation
//!
//! - `state_machine` - Legal status transitions and idempotent settlement
//! - `traits` - Repository abstraction with per-record exclusive updates
//! - `boleto_store` - In-memory repository for sequential runs
//! - `reconciler` - Applies return events and collects applied/rejected outcomes
//! - `async` - Concurrent store and partitioned batch processing

pub mod r#async;
pub mod boleto_store;
pub mod reconciler;
pub mod state_machine;
pub mod traits;

pub use boleto_store::BoletoStore;
pub use r#async::{BatchProcessor, SharedBoletoStore};
pub use reconciler::{
    apply_event, sweep_overdue, AppliedEvent, ReconciliationResult, Reconciler, RejectedEvent,
};
pub use state_machine::{
    apply, cancel, mark_overdue_if_due, register_payment, Applied, Transition, TransitionOutcome,
};
pub use traits::{BoletoRepository, LookupOverlay};
