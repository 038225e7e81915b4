//! Boleto records and their lifecycle status
//!
//! The status is a tagged enum: payment facts only exist inside
//! [`BoletoStatus::Paid`], so a record can never carry a payment date
//! without also being paid.

use chrono::NaiveDate;
use std::fmt;

use super::money::Cents;

/// Internal boleto identifier assigned by the persistence layer
pub type BoletoId = u64;

/// How a settlement reached the beneficiary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Settled through the bank's return file
    Boleto,
    Pix,
    Transfer,
    Cash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Boleto => "boleto",
            PaymentMethod::Pix => "pix",
            PaymentMethod::Transfer => "transfer",
            PaymentMethod::Cash => "cash",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "boleto" => Some(PaymentMethod::Boleto),
            "pix" => Some(PaymentMethod::Pix),
            "transfer" => Some(PaymentMethod::Transfer),
            "cash" => Some(PaymentMethod::Cash),
            _ => None,
        }
    }
}

/// Payment facts recorded when a boleto is settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub paid_on: NaiveDate,
    pub amount: Cents,
    pub method: PaymentMethod,
}

impl Settlement {
    /// Duplicate deliveries of the same settlement agree on date and amount
    pub fn same_facts(&self, other: &Settlement) -> bool {
        self.paid_on == other.paid_on && self.amount == other.amount
    }
}

/// Lifecycle status of a boleto
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoletoStatus {
    /// Registered with the bank, awaiting payment
    Issued,
    /// Settled; the only status that never changes again
    Paid(Settlement),
    /// Due date passed without payment
    Overdue,
    /// Withdrawn from collection
    Cancelled,
}

impl BoletoStatus {
    pub fn name(&self) -> &'static str {
        match self {
            BoletoStatus::Issued => "issued",
            BoletoStatus::Paid(_) => "paid",
            BoletoStatus::Overdue => "overdue",
            BoletoStatus::Cancelled => "cancelled",
        }
    }

    pub fn settlement(&self) -> Option<&Settlement> {
        match self {
            BoletoStatus::Paid(settlement) => Some(settlement),
            _ => None,
        }
    }

    pub fn is_paid(&self) -> bool {
        matches!(self, BoletoStatus::Paid(_))
    }
}

impl fmt::Display for BoletoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Payer tax registration kind, derived from the tax id length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxIdKind {
    /// Individual (11 digits)
    Cpf,
    /// Company (14 digits)
    Cnpj,
}

impl TaxIdKind {
    pub fn of(tax_id: &str) -> Self {
        if tax_id.chars().filter(char::is_ascii_digit).count() > 11 {
            TaxIdKind::Cnpj
        } else {
            TaxIdKind::Cpf
        }
    }

    /// Registration type code used by the layout
    pub fn code(&self) -> u64 {
        match self {
            TaxIdKind::Cpf => 1,
            TaxIdKind::Cnpj => 2,
        }
    }
}

/// Snapshot of the payer's identity and address at issue time
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Payer {
    pub tax_id: String,
    pub name: String,
    pub address: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

/// A boleto as known to the persistence layer
///
/// Our-number, face value and due date are optional because records exist
/// before the bank assigns an identifier; the encoder refuses to remit a
/// record while any of them is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoletoRecord {
    pub id: BoletoId,
    pub our_number: Option<String>,
    pub document_number: String,
    pub client_id: u64,
    pub contract_id: u64,
    pub installment: u32,
    pub face_value: Option<Cents>,
    pub due_date: Option<NaiveDate>,
    pub payer: Payer,
    pub status: BoletoStatus,
}

impl BoletoRecord {
    /// Identifier used in error messages and logs
    pub fn reference(&self) -> String {
        self.our_number
            .clone()
            .unwrap_or_else(|| format!("#{}", self.id))
    }
}
