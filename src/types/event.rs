//! Return events decoded from settlement files
//!
//! A [`ReturnEvent`] is never persisted. It is the input of reconciliation,
//! which turns it into a state-machine transition for exactly one boleto.

use chrono::NaiveDate;
use std::fmt;

use super::money::Cents;

/// Status reported by the bank for a boleto
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportedStatus {
    Paid,
    Overdue,
    Cancelled,
    /// Movement code outside the mapped table, kept verbatim
    Unknown(String),
}

impl fmt::Display for ReportedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportedStatus::Paid => f.write_str("paid"),
            ReportedStatus::Overdue => f.write_str("overdue"),
            ReportedStatus::Cancelled => f.write_str("cancelled"),
            ReportedStatus::Unknown(code) => write!(f, "unknown({})", code),
        }
    }
}

/// One detail record of a return file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnEvent {
    /// 1-based line in the source file (0 for synthetic events)
    pub line: usize,
    pub our_number: String,
    /// Raw bank movement code
    pub movement_code: String,
    pub status: ReportedStatus,
    pub paid_on: Option<NaiveDate>,
    pub paid_amount: Option<Cents>,
    /// Date the bank registered the occurrence
    pub occurred_on: Option<NaiveDate>,
}

impl ReturnEvent {
    /// Event reporting a settlement, as the bank would echo it back
    pub fn paid(our_number: &str, paid_on: NaiveDate, amount: Cents) -> Self {
        ReturnEvent {
            line: 0,
            our_number: our_number.to_string(),
            movement_code: "06".to_string(),
            status: ReportedStatus::Paid,
            paid_on: Some(paid_on),
            paid_amount: Some(amount),
            occurred_on: Some(paid_on),
        }
    }

    pub fn cancelled(our_number: &str, occurred_on: NaiveDate) -> Self {
        ReturnEvent {
            line: 0,
            our_number: our_number.to_string(),
            movement_code: "09".to_string(),
            status: ReportedStatus::Cancelled,
            paid_on: None,
            paid_amount: None,
            occurred_on: Some(occurred_on),
        }
    }

    pub fn overdue(our_number: &str, occurred_on: NaiveDate) -> Self {
        ReturnEvent {
            line: 0,
            our_number: our_number.to_string(),
            movement_code: "23".to_string(),
            status: ReportedStatus::Overdue,
            paid_on: None,
            paid_amount: None,
            occurred_on: Some(occurred_on),
        }
    }
}
