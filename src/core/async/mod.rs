//! Concurrent reconciliation components
//!
//! Thread-safe counterparts of the sequential core, built on `DashMap`:
//!
//! - **SharedBoletoStore**: boleto set with per-entry locking
//! - **BatchProcessor**: partitions events by our-number and reconciles the
//!   partitions on tokio tasks
//!
//! Events for the same boleto are applied in file order; events for
//! different boletos proceed in parallel. No global lock is taken.

pub mod batch_processor;
pub mod boleto_store;

pub use batch_processor::{BatchProcessor, ProcessingResult};
pub use boleto_store::SharedBoletoStore;
