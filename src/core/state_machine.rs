//! Boleto lifecycle state machine
//!
//! Every status change in the system goes through [`apply`]: return-file
//! events, operator-registered payments and cancellations, and the scheduled
//! overdue sweep all build a [`Transition`] and hand it over here.
//!
//! ```text
//!            ┌──────── Settle ────────┐
//!   Issued ──┼── MarkOverdue ─► Overdue ──Settle──► Paid
//!            └──── Cancel ────► Cancelled ─Settle──► Paid
//! ```
//!
//! `Paid` is final: its settlement facts never change. A repeated settlement
//! with the same date and amount is accepted as a no-op; any other request on
//! a paid boleto is rejected.

use chrono::NaiveDate;

use crate::types::{
    BoletoError, BoletoRecord, BoletoStatus, Cents, PaymentMethod, ReportedStatus, ReturnEvent,
    Settlement,
};

/// A requested status change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Settle(Settlement),
    MarkOverdue { as_of: NaiveDate },
    Cancel,
}

impl Transition {
    /// Name of the status this transition leads to
    pub fn target(&self) -> &'static str {
        match self {
            Transition::Settle(_) => "paid",
            Transition::MarkOverdue { .. } => "overdue",
            Transition::Cancel => "cancelled",
        }
    }

    /// Translate a bank return event into a transition
    ///
    /// Overdue events are evaluated at the bank's occurrence date when present,
    /// otherwise at `as_of`.
    pub fn from_event(event: &ReturnEvent, as_of: NaiveDate) -> Result<Self, BoletoError> {
        match &event.status {
            ReportedStatus::Paid => {
                let paid_on = event
                    .paid_on
                    .ok_or_else(|| BoletoError::missing_payment_data(&event.our_number, "date"))?;
                let amount = event
                    .paid_amount
                    .ok_or_else(|| BoletoError::missing_payment_data(&event.our_number, "amount"))?;
                Ok(Transition::Settle(Settlement {
                    paid_on,
                    amount,
                    method: PaymentMethod::Boleto,
                }))
            }
            ReportedStatus::Overdue => Ok(Transition::MarkOverdue {
                as_of: event.occurred_on.unwrap_or(as_of),
            }),
            ReportedStatus::Cancelled => Ok(Transition::Cancel),
            ReportedStatus::Unknown(code) => {
                Err(BoletoError::unrecognized_status(&event.our_number, code))
            }
        }
    }
}

/// Whether a successful transition changed the record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    Changed,
    /// The record already was in the requested state with the same facts
    Unchanged,
}

/// Result of a legal transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub record: BoletoRecord,
    pub outcome: TransitionOutcome,
}

impl Applied {
    fn changed(record: &BoletoRecord, status: BoletoStatus) -> Self {
        Applied {
            record: BoletoRecord {
                status,
                ..record.clone()
            },
            outcome: TransitionOutcome::Changed,
        }
    }

    fn unchanged(record: &BoletoRecord) -> Self {
        Applied {
            record: record.clone(),
            outcome: TransitionOutcome::Unchanged,
        }
    }
}

/// Apply `transition` to `record`, returning the record's next version
///
/// The input record is never modified; callers persist `Applied::record`.
///
/// # Errors
///
/// - [`BoletoError::AlreadySettled`] for anything but a matching settlement on a paid boleto
/// - [`BoletoError::ConflictingSettlement`] when a paid boleto is settled with other facts
/// - [`BoletoError::NotYetDue`] when marking overdue on or before the due date
/// - [`BoletoError::IllegalTransition`] when marking a cancelled boleto overdue
/// - [`BoletoError::IncompleteRecord`] when an overdue check has no due date to compare
pub fn apply(record: &BoletoRecord, transition: &Transition) -> Result<Applied, BoletoError> {
    let our_number = record.reference();

    match (&record.status, transition) {
        (BoletoStatus::Paid(recorded), Transition::Settle(reported)) => {
            if recorded.same_facts(reported) {
                Ok(Applied::unchanged(record))
            } else {
                Err(BoletoError::ConflictingSettlement {
                    our_number,
                    recorded_amount: recorded.amount,
                    recorded_on: recorded.paid_on,
                    reported_amount: reported.amount,
                    reported_on: reported.paid_on,
                })
            }
        }
        (BoletoStatus::Paid(_), other) => Err(BoletoError::already_settled(
            &our_number,
            match other {
                Transition::Cancel => "cancel",
                _ => "mark overdue",
            },
        )),

        (
            BoletoStatus::Issued | BoletoStatus::Overdue | BoletoStatus::Cancelled,
            Transition::Settle(settlement),
        ) => Ok(Applied::changed(record, BoletoStatus::Paid(*settlement))),

        (BoletoStatus::Issued, Transition::MarkOverdue { as_of }) => {
            let due_date = record
                .due_date
                .ok_or_else(|| BoletoError::incomplete_record(&our_number, "due_date"))?;
            if *as_of > due_date {
                Ok(Applied::changed(record, BoletoStatus::Overdue))
            } else {
                Err(BoletoError::NotYetDue {
                    our_number,
                    due_date,
                    as_of: *as_of,
                })
            }
        }
        (BoletoStatus::Overdue, Transition::MarkOverdue { .. }) => Ok(Applied::unchanged(record)),
        (BoletoStatus::Cancelled, Transition::MarkOverdue { .. }) => Err(
            BoletoError::illegal_transition(&our_number, "cancelled", "overdue"),
        ),

        (BoletoStatus::Issued | BoletoStatus::Overdue, Transition::Cancel) => {
            Ok(Applied::changed(record, BoletoStatus::Cancelled))
        }
        (BoletoStatus::Cancelled, Transition::Cancel) => Ok(Applied::unchanged(record)),
    }
}

/// Operator-registered payment (cash, PIX, transfer, or a boleto paid outside the return flow)
pub fn register_payment(
    record: &BoletoRecord,
    paid_on: NaiveDate,
    amount: Cents,
    method: PaymentMethod,
) -> Result<Applied, BoletoError> {
    apply(
        record,
        &Transition::Settle(Settlement {
            paid_on,
            amount,
            method,
        }),
    )
}

/// Operator cancellation
pub fn cancel(record: &BoletoRecord) -> Result<Applied, BoletoError> {
    apply(record, &Transition::Cancel)
}

/// Scheduled re-evaluation: marks an issued boleto overdue once `today` is past its due date
///
/// Returns `None` when there is nothing to change.
pub fn mark_overdue_if_due(record: &BoletoRecord, today: NaiveDate) -> Option<Applied> {
    match (&record.status, record.due_date) {
        (BoletoStatus::Issued, Some(due_date)) if today > due_date => {
            apply(record, &Transition::MarkOverdue { as_of: today }).ok()
        }
        _ => None,
    }
}
