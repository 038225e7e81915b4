//! Error types for the boleto interchange engine
//!
//! Every failure the engine can report is a variant of [`BoletoError`]. Variants
//! carry the context an operator needs to act on them (our-number, line number,
//! field name) without re-reading the file.
//!
//! # Error Categories
//!
//! - **Structural**: the file itself is corrupt (bad line length, trailer count
//!   mismatch, unknown record type). Decoding of the whole file is aborted.
//! - **Business**: a single record cannot be reconciled (unknown our-number,
//!   illegal transition, conflicting settlement). Collected per record.
//! - **Encoding**: an outbound batch cannot be produced (empty batch, incomplete
//!   boleto). Generation of the whole batch is aborted.
//! - **Io**: file system, CSV and configuration failures around the engine.

use chrono::NaiveDate;
use thiserror::Error;

use super::money::Cents;

/// Coarse classification of a [`BoletoError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Structural,
    Business,
    Encoding,
    Io,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Structural => "structural",
            ErrorCategory::Business => "business",
            ErrorCategory::Encoding => "encoding",
            ErrorCategory::Io => "io",
        }
    }
}

/// Main error type for the boleto engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BoletoError {
    /// File not found at the specified path
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError { message: String },

    /// CSV parsing error in a boleto export
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    CsvError {
        line: Option<u64>,
        message: String,
    },

    /// Beneficiary or engine configuration could not be loaded
    #[error("Invalid configuration: {message}")]
    ConfigError { message: String },

    /// A fixed-width field holds a value that does not fit its slot
    ///
    /// Raised while decoding a numeric slot containing non-digits, or while
    /// encoding a number wider than its field.
    #[error("Format error{} in field '{field}': {value:?}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    FormatError {
        /// 1-based line number (None while encoding)
        line: Option<usize>,
        /// Layout field name
        field: String,
        /// Raw offending value
        value: String,
    },

    /// A line is not exactly 240 characters long
    #[error("Malformed line {line}: expected 240 characters, found {length}")]
    MalformedLine { line: usize, length: usize },

    /// The trailer's declared record count disagrees with the file contents
    #[error("Record count mismatch: trailer declares {declared}, file contains {actual}")]
    CountMismatch { declared: u64, actual: u64 },

    /// Record type (column 8) is not part of the layout
    #[error("Unknown record type '{record_type}' at line {line}")]
    UnknownRecordType { line: usize, record_type: char },

    /// Detail line carries a segment code the decoder does not accept
    #[error("Unexpected segment '{segment}' at line {line}")]
    UnknownSegment { line: usize, segment: char },

    /// The file does not start with a file header
    #[error("Missing file header at line 1")]
    MissingHeader,

    /// The file does not end with a file trailer
    #[error("Missing file trailer")]
    MissingTrailer,

    /// A record appears where the layout does not allow one
    #[error("Unexpected record at line {line}: {message}")]
    UnexpectedRecord { line: usize, message: String },

    /// An outbound batch was requested with no boletos
    #[error("Cannot build a remittance batch with no boletos")]
    EmptyBatch,

    /// A boleto lacks a field required by the layout
    #[error("Boleto {boleto} is missing required field '{field}'")]
    IncompleteRecord { boleto: String, field: String },

    /// The return file references a boleto this system never issued
    #[error("Unknown boleto with our number {our_number}")]
    UnknownBoleto { our_number: String },

    /// The boleto is already paid; its payment facts are immutable
    #[error("Boleto {our_number} is already settled, cannot {attempted}")]
    AlreadySettled {
        our_number: String,
        attempted: String,
    },

    /// A second settlement disagrees with the one already recorded
    #[error("Conflicting settlement for boleto {our_number}: recorded {recorded_amount} on {recorded_on}, reported {reported_amount} on {reported_on}")]
    ConflictingSettlement {
        our_number: String,
        recorded_amount: Cents,
        recorded_on: NaiveDate,
        reported_amount: Cents,
        reported_on: NaiveDate,
    },

    /// A paid event arrived without a payment date or amount
    #[error("Paid event for boleto {our_number} is missing its {field}")]
    MissingPaymentData { our_number: String, field: String },

    /// Overdue requested before the due date has passed
    #[error("Boleto {our_number} is not overdue on {as_of} (due {due_date})")]
    NotYetDue {
        our_number: String,
        due_date: NaiveDate,
        as_of: NaiveDate,
    },

    /// Transition not allowed from the current status
    #[error("Boleto {our_number} cannot move from {from} to {to}")]
    IllegalTransition {
        our_number: String,
        from: String,
        to: String,
    },

    /// The bank reported a movement code the engine does not map
    #[error("Boleto {our_number} reported with unrecognized movement code '{code}'")]
    UnrecognizedStatus { our_number: String, code: String },

    /// Amount could not be represented in whole cents
    #[error("Invalid amount '{amount}'")]
    InvalidAmount { amount: String },
}

impl From<std::io::Error> for BoletoError {
    fn from(error: std::io::Error) -> Self {
        BoletoError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for BoletoError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        BoletoError::CsvError {
            line,
            message: error.to_string(),
        }
    }
}

impl From<toml::de::Error> for BoletoError {
    fn from(error: toml::de::Error) -> Self {
        BoletoError::ConfigError {
            message: error.to_string(),
        }
    }
}

impl BoletoError {
    /// Which handling policy applies to this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            BoletoError::FileNotFound { .. }
            | BoletoError::IoError { .. }
            | BoletoError::CsvError { .. }
            | BoletoError::ConfigError { .. } => ErrorCategory::Io,
            BoletoError::MalformedLine { .. }
            | BoletoError::CountMismatch { .. }
            | BoletoError::UnknownRecordType { .. }
            | BoletoError::UnknownSegment { .. }
            | BoletoError::MissingHeader
            | BoletoError::MissingTrailer
            | BoletoError::UnexpectedRecord { .. } => ErrorCategory::Structural,
            BoletoError::FormatError { line, .. } => {
                if line.is_some() {
                    ErrorCategory::Structural
                } else {
                    ErrorCategory::Encoding
                }
            }
            BoletoError::EmptyBatch | BoletoError::IncompleteRecord { .. } => {
                ErrorCategory::Encoding
            }
            BoletoError::UnknownBoleto { .. }
            | BoletoError::AlreadySettled { .. }
            | BoletoError::ConflictingSettlement { .. }
            | BoletoError::MissingPaymentData { .. }
            | BoletoError::NotYetDue { .. }
            | BoletoError::IllegalTransition { .. }
            | BoletoError::UnrecognizedStatus { .. }
            | BoletoError::InvalidAmount { .. } => ErrorCategory::Business,
        }
    }

    /// Short machine-readable name used in operator reports
    pub fn kind(&self) -> &'static str {
        match self {
            BoletoError::FileNotFound { .. } => "file_not_found",
            BoletoError::IoError { .. } => "io_error",
            BoletoError::CsvError { .. } => "csv_error",
            BoletoError::ConfigError { .. } => "config_error",
            BoletoError::FormatError { .. } => "format_error",
            BoletoError::MalformedLine { .. } => "malformed_line",
            BoletoError::CountMismatch { .. } => "count_mismatch",
            BoletoError::UnknownRecordType { .. } => "unknown_record_type",
            BoletoError::UnknownSegment { .. } => "unknown_segment",
            BoletoError::MissingHeader => "missing_header",
            BoletoError::MissingTrailer => "missing_trailer",
            BoletoError::UnexpectedRecord { .. } => "unexpected_record",
            BoletoError::EmptyBatch => "empty_batch",
            BoletoError::IncompleteRecord { .. } => "incomplete_record",
            BoletoError::UnknownBoleto { .. } => "unknown_boleto",
            BoletoError::AlreadySettled { .. } => "already_settled",
            BoletoError::ConflictingSettlement { .. } => "conflicting_settlement",
            BoletoError::MissingPaymentData { .. } => "missing_payment_data",
            BoletoError::NotYetDue { .. } => "not_yet_due",
            BoletoError::IllegalTransition { .. } => "illegal_transition",
            BoletoError::UnrecognizedStatus { .. } => "unrecognized_status",
            BoletoError::InvalidAmount { .. } => "invalid_amount",
        }
    }
}

// Helper functions for creating common errors

impl BoletoError {
    pub fn format_error(line: Option<usize>, field: &str, value: &str) -> Self {
        BoletoError::FormatError {
            line,
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub fn incomplete_record(boleto: &str, field: &str) -> Self {
        BoletoError::IncompleteRecord {
            boleto: boleto.to_string(),
            field: field.to_string(),
        }
    }

    pub fn unknown_boleto(our_number: &str) -> Self {
        BoletoError::UnknownBoleto {
            our_number: our_number.to_string(),
        }
    }

    pub fn already_settled(our_number: &str, attempted: &str) -> Self {
        BoletoError::AlreadySettled {
            our_number: our_number.to_string(),
            attempted: attempted.to_string(),
        }
    }

    pub fn missing_payment_data(our_number: &str, field: &str) -> Self {
        BoletoError::MissingPaymentData {
            our_number: our_number.to_string(),
            field: field.to_string(),
        }
    }

    pub fn illegal_transition(our_number: &str, from: &str, to: &str) -> Self {
        BoletoError::IllegalTransition {
            our_number: our_number.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub fn unrecognized_status(our_number: &str, code: &str) -> Self {
        BoletoError::UnrecognizedStatus {
            our_number: our_number.to_string(),
            code: code.to_string(),
        }
    }

    pub fn invalid_amount(amount: &str) -> Self {
        BoletoError::InvalidAmount {
            amount: amount.to_string(),
        }
    }
}
