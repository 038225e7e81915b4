//! Types module
//!
//! Contains core data structures used throughout the engine:
//! - `boleto`: Boleto records, lifecycle status and settlement facts
//! - `beneficiary`: Beneficiary profile supplied per remittance batch
//! - `event`: Return events decoded from settlement files
//! - `money`: Integer-cent currency
//! - `error`: Error types for the engine

pub mod beneficiary;
pub mod boleto;
pub mod error;
pub mod event;
pub mod money;

pub use beneficiary::BeneficiaryProfile;
pub use boleto::{
    BoletoId, BoletoRecord, BoletoStatus, Payer, PaymentMethod, Settlement, TaxIdKind,
};
pub use error::{BoletoError, ErrorCategory};
pub use event::{ReportedStatus, ReturnEvent};
pub use money::Cents;
