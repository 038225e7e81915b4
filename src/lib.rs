//! Boleto interchange and reconciliation engine
//!
//! # Overview
//!
//! Generates CNAB240 remittance batches that register boletos with a bank,
//! decodes the bank's return files, and reconciles the reported settlements,
//! expirations and cancellations against the boleto set.
//!
//! # Architecture
//!
//! - [`types`] - Boleto records, lifecycle status, money and errors
//! - [`cnab`] - Fixed-width codec, remittance encoder, return decoder
//! - [`core`] - Business logic components:
//!   - [`core::state_machine`] - Legal status transitions
//!   - [`core::reconciler`] - Applies return events through a repository
//!   - [`core::r#async`] - Concurrent store and partitioned processing
//! - [`strategy`] - Sequential and concurrent reconciliation pipelines
//! - [`io`] - Boleto CSV export, review report, interchange files
//! - [`config`] - Beneficiary profile loading
//! - [`cli`] - Command-line arguments and subcommands
//! - [`telemetry`] - Logging setup
//!
//! # Lifecycle
//!
//! - **Issued**: registered with the bank, awaiting payment
//! - **Paid**: settled; carries the payment date, amount and method
//! - **Overdue**: due date passed without payment; can still be paid
//! - **Cancelled**: withdrawn; a late settlement is still recorded

pub mod cli;
pub mod cnab;
pub mod config;
pub mod core;
pub mod io;
pub mod strategy;
pub mod telemetry;
pub mod types;

pub use cnab::{decode_return, encode_remittance, encode_return, RemittanceBatch};
pub use core::{BoletoRepository, BoletoStore, ReconciliationResult, Reconciler};
pub use types::{
    BeneficiaryProfile, BoletoError, BoletoRecord, BoletoStatus, Cents, ReturnEvent, Settlement,
};
