//! CSV format handling for boleto exports and review reports
//!
//! This module centralizes the CSV persistence adapter:
//! - `BoletoCsvRow` for (de)serialization of the boleto export
//! - Conversion between CSV rows and `BoletoRecord`
//! - Reading and writing the boleto export
//! - The rejected-event review report
//!
//! Amounts are decimal strings converted to exact cents. Dates are ISO
//! `YYYY-MM-DD`.

use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim, Writer};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::debug;

use super::files::not_found_or_io;
use crate::core::RejectedEvent;
use crate::types::{
    BoletoError, BoletoRecord, BoletoStatus, Cents, Payer, PaymentMethod, Settlement,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One row of the boleto export
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoletoCsvRow {
    pub id: u64,
    pub our_number: Option<String>,
    pub document_number: String,
    pub client_id: u64,
    pub contract_id: u64,
    pub installment: u32,
    pub face_value: Option<String>,
    pub due_date: Option<String>,
    pub payer_tax_id: String,
    pub payer_name: String,
    pub payer_address: String,
    pub payer_neighborhood: String,
    pub payer_city: String,
    pub payer_state: String,
    pub payer_postal_code: String,
    pub status: String,
    pub paid_on: Option<String>,
    pub paid_amount: Option<String>,
    pub payment_method: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn row_error(line: u64, message: String) -> BoletoError {
    BoletoError::CsvError {
        line: Some(line),
        message,
    }
}

fn parse_date(line: u64, field: &str, value: Option<String>) -> Result<Option<NaiveDate>, BoletoError> {
    match non_blank(value) {
        Some(raw) => NaiveDate::parse_from_str(&raw, DATE_FORMAT)
            .map(Some)
            .map_err(|_| row_error(line, format!("Invalid {} '{}'", field, raw))),
        None => Ok(None),
    }
}

fn parse_amount(line: u64, field: &str, value: Option<String>) -> Result<Option<Cents>, BoletoError> {
    match non_blank(value) {
        Some(raw) => raw
            .parse::<Cents>()
            .map(Some)
            .map_err(|e| row_error(line, format!("Invalid {}: {}", field, e))),
        None => Ok(None),
    }
}

/// Convert a CSV row into a domain record
///
/// `line` is only used for error context.
pub fn convert_csv_row(row: BoletoCsvRow, line: u64) -> Result<BoletoRecord, BoletoError> {
    let face_value = parse_amount(line, "face_value", row.face_value)?;
    let due_date = parse_date(line, "due_date", row.due_date)?;
    let paid_on = parse_date(line, "paid_on", row.paid_on)?;
    let paid_amount = parse_amount(line, "paid_amount", row.paid_amount)?;

    let status = match row.status.trim().to_lowercase().as_str() {
        "" | "issued" => BoletoStatus::Issued,
        "overdue" => BoletoStatus::Overdue,
        "cancelled" => BoletoStatus::Cancelled,
        "paid" => {
            let (Some(paid_on), Some(amount)) = (paid_on, paid_amount) else {
                return Err(row_error(
                    line,
                    format!("Paid boleto {} requires paid_on and paid_amount", row.id),
                ));
            };
            let method = match non_blank(row.payment_method) {
                Some(raw) => PaymentMethod::parse(&raw).ok_or_else(|| {
                    row_error(line, format!("Invalid payment_method '{}'", raw))
                })?,
                None => PaymentMethod::Boleto,
            };
            BoletoStatus::Paid(Settlement {
                paid_on,
                amount,
                method,
            })
        }
        other => {
            return Err(row_error(
                line,
                format!("Invalid status '{}' for boleto {}", other, row.id),
            ))
        }
    };

    Ok(BoletoRecord {
        id: row.id,
        our_number: non_blank(row.our_number),
        document_number: row.document_number,
        client_id: row.client_id,
        contract_id: row.contract_id,
        installment: row.installment,
        face_value,
        due_date,
        payer: Payer {
            tax_id: row.payer_tax_id,
            name: row.payer_name,
            address: row.payer_address,
            neighborhood: row.payer_neighborhood,
            city: row.payer_city,
            state: row.payer_state,
            postal_code: row.payer_postal_code,
        },
        status,
    })
}

/// Convert a domain record back into its CSV row
pub fn record_to_row(record: &BoletoRecord) -> BoletoCsvRow {
    let settlement = record.status.settlement();

    BoletoCsvRow {
        id: record.id,
        our_number: record.our_number.clone(),
        document_number: record.document_number.clone(),
        client_id: record.client_id,
        contract_id: record.contract_id,
        installment: record.installment,
        face_value: record.face_value.map(|value| value.to_string()),
        due_date: record.due_date.map(|date| date.format(DATE_FORMAT).to_string()),
        payer_tax_id: record.payer.tax_id.clone(),
        payer_name: record.payer.name.clone(),
        payer_address: record.payer.address.clone(),
        payer_neighborhood: record.payer.neighborhood.clone(),
        payer_city: record.payer.city.clone(),
        payer_state: record.payer.state.clone(),
        payer_postal_code: record.payer.postal_code.clone(),
        status: record.status.name().to_string(),
        paid_on: settlement.map(|s| s.paid_on.format(DATE_FORMAT).to_string()),
        paid_amount: settlement.map(|s| s.amount.to_string()),
        payment_method: settlement.map(|s| s.method.as_str().to_string()),
    }
}

/// Read a boleto export
///
/// Any malformed row fails the whole read: a partial boleto set would make
/// reconciliation report known boletos as unknown.
pub fn read_boletos(path: &Path) -> Result<Vec<BoletoRecord>, BoletoError> {
    let file = File::open(path).map_err(|e| not_found_or_io(path, e))?;

    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .buffer_capacity(8 * 1024)
        .from_reader(file);

    let mut records = Vec::new();
    for row in reader.deserialize::<BoletoCsvRow>() {
        let row = row?;
        // Header is line 1
        let line = records.len() as u64 + 2;
        records.push(convert_csv_row(row, line)?);
    }

    debug!(path = %path.display(), boletos = records.len(), "Boleto export loaded");
    Ok(records)
}

/// Write boletos in export format, sorted by id for deterministic output
pub fn write_boletos_csv(records: &[BoletoRecord], output: &mut dyn Write) -> Result<(), BoletoError> {
    let mut sorted: Vec<&BoletoRecord> = records.iter().collect();
    sorted.sort_by_key(|record| record.id);

    let mut writer = Writer::from_writer(output);
    for record in sorted {
        writer.serialize(record_to_row(record))?;
    }
    writer.flush()?;

    Ok(())
}

/// Write the review report for rejected events
pub fn write_rejections_csv(
    rejected: &[RejectedEvent],
    output: &mut dyn Write,
) -> Result<(), BoletoError> {
    let mut writer = Writer::from_writer(output);

    writer.write_record(["line", "our_number", "status", "category", "reason"])?;
    for entry in rejected {
        writer.write_record(&[
            entry.event.line.to_string(),
            entry.event.our_number.clone(),
            entry.event.status.to_string(),
            entry.reason.category().as_str().to_string(),
            entry.reason.to_string(),
        ])?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReturnEvent;
    use rstest::rstest;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    const HEADER: &str = "id,our_number,document_number,client_id,contract_id,installment,\
face_value,due_date,payer_tax_id,payer_name,payer_address,payer_neighborhood,payer_city,\
payer_state,payer_postal_code,status,paid_on,paid_amount,payment_method";

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    fn row(status: &str) -> BoletoCsvRow {
        BoletoCsvRow {
            id: 7,
            our_number: Some("0000000007".to_string()),
            document_number: "CT1-07".to_string(),
            client_id: 1,
            contract_id: 10,
            installment: 7,
            face_value: Some("150.00".to_string()),
            due_date: Some("2024-05-10".to_string()),
            status: status.to_string(),
            ..Default::default()
        }
    }

    #[rstest]
    #[case("issued", BoletoStatus::Issued)]
    #[case("", BoletoStatus::Issued)]
    #[case("OVERDUE", BoletoStatus::Overdue)]
    #[case("cancelled", BoletoStatus::Cancelled)]
    fn test_convert_unpaid_status(#[case] status: &str, #[case] expected: BoletoStatus) {
        let record = convert_csv_row(row(status), 2).unwrap();
        assert_eq!(record.status, expected);
        assert_eq!(record.face_value, Some(Cents(15_000)));
        assert_eq!(record.due_date, NaiveDate::from_ymd_opt(2024, 5, 10));
    }

    #[test]
    fn test_convert_paid_row() {
        let paid = BoletoCsvRow {
            paid_on: Some("2024-05-09".to_string()),
            paid_amount: Some("150.00".to_string()),
            payment_method: Some("pix".to_string()),
            ..row("paid")
        };

        let record = convert_csv_row(paid, 2).unwrap();
        let settlement = record.status.settlement().unwrap();
        assert_eq!(settlement.amount, Cents(15_000));
        assert_eq!(settlement.method, PaymentMethod::Pix);
    }

    #[rstest]
    #[case::paid_without_facts(row("paid"))]
    #[case::bad_status(row("archived"))]
    #[case::sub_cent(BoletoCsvRow { face_value: Some("1.005".to_string()), ..row("issued") })]
    #[case::bad_date(BoletoCsvRow { due_date: Some("10/05/2024".to_string()), ..row("issued") })]
    fn test_convert_invalid_row(#[case] input: BoletoCsvRow) {
        let err = convert_csv_row(input, 5).unwrap_err();
        assert!(matches!(err, BoletoError::CsvError { line: Some(5), .. }));
    }

    #[test]
    fn test_blank_our_number_is_none() {
        let record = convert_csv_row(
            BoletoCsvRow {
                our_number: Some("  ".to_string()),
                ..row("issued")
            },
            2,
        )
        .unwrap();
        assert_eq!(record.our_number, None);
    }

    #[test]
    fn test_write_then_read_export() {
        let paid = convert_csv_row(
            BoletoCsvRow {
                paid_on: Some("2024-05-09".to_string()),
                paid_amount: Some("150.00".to_string()),
                payment_method: Some("boleto".to_string()),
                ..row("paid")
            },
            2,
        )
        .unwrap();
        let issued = BoletoRecord {
            id: 3,
            our_number: None,
            ..convert_csv_row(row("issued"), 3).unwrap()
        };

        let mut output = Vec::new();
        write_boletos_csv(&[paid.clone(), issued.clone()], &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(text.starts_with(HEADER));

        let file = create_temp_csv(&text);
        let records = read_boletos(file.path()).unwrap();
        assert_eq!(records, vec![issued, paid]);
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_boletos(Path::new("nonexistent.csv")).unwrap_err();
        assert!(matches!(err, BoletoError::FileNotFound { .. }));
    }

    #[test]
    fn test_read_unreadable_path_is_not_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_boletos(dir.path()).unwrap_err();
        assert!(!matches!(err, BoletoError::FileNotFound { .. }));
        assert_eq!(err.category(), crate::types::ErrorCategory::Io);
    }

    #[test]
    fn test_read_reports_line_of_bad_row() {
        let content = format!(
            "{}\n1,001,D1,1,1,1,10.00,2024-05-10,,,,,,,,issued,,,\n2,002,D2,1,1,2,10.00,2024-05-10,,,,,,,,lost,,,\n",
            HEADER
        );
        let file = create_temp_csv(&content);

        let err = read_boletos(file.path()).unwrap_err();
        assert!(matches!(err, BoletoError::CsvError { line: Some(3), .. }));
    }

    #[test]
    fn test_write_rejections() {
        let event = ReturnEvent {
            line: 4,
            ..ReturnEvent::cancelled("0000000099", NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
        };
        let rejected = vec![RejectedEvent {
            reason: BoletoError::unknown_boleto(&event.our_number),
            event,
        }];

        let mut output = Vec::new();
        write_rejections_csv(&rejected, &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "line,our_number,status,category,reason");
        assert!(lines[1].starts_with("4,0000000099,cancelled,business,"));
    }
}
