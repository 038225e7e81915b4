//! Batch encoder
//!
//! Builds complete CNAB240 files. A remittance batch is one file header, a
//! Segment P / Segment Q pair per boleto and one file trailer whose record
//! count is `2n + 2`. Any invalid boleto aborts the whole batch so that the
//! bank never receives a partial picture of the beneficiary's receivables.
//!
//! [`encode_return`] produces the bank's side of the exchange (Segment T
//! records). It is what the bank simulator and the test fixtures use to
//! fabricate settlement files.

use chrono::NaiveDate;
use tracing::info;

use super::codec::{encode_identifier, RecordWriter};
use super::layout::*;
use crate::types::{BeneficiaryProfile, BoletoError, BoletoRecord, Cents, ReturnEvent, TaxIdKind};

/// Line terminator used by the interchange format
pub const CRLF: &str = "\r\n";

/// Audit data describing an encoded batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchMetadata {
    pub file_name: String,
    pub sequence: u32,
    pub generated_on: NaiveDate,
    pub boleto_count: usize,
    pub record_count: usize,
    pub total_value: Cents,
}

/// An encoded outbound file and its audit metadata
#[derive(Debug, Clone)]
pub struct RemittanceBatch {
    pub bytes: Vec<u8>,
    pub metadata: BatchMetadata,
}

impl RemittanceBatch {
    /// Lines of the file without terminators
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        std::str::from_utf8(&self.bytes)
            .unwrap_or_default()
            .split(CRLF)
            .filter(|line| !line.is_empty())
    }
}

/// `REMESSA_<DDMMYYYY>_<sequence>.REM`
pub fn remittance_file_name(generated_on: NaiveDate, sequence: u32) -> String {
    format!(
        "REMESSA_{}_{}.REM",
        generated_on.format("%d%m%Y"),
        sequence
    )
}

/// Fields of a boleto that must be present before it can be remitted
struct RemittableBoleto<'a> {
    record: &'a BoletoRecord,
    our_number: &'a str,
    face_value: Cents,
    due_date: NaiveDate,
}

impl<'a> RemittableBoleto<'a> {
    fn check(record: &'a BoletoRecord) -> Result<Self, BoletoError> {
        let reference = record.reference();
        let our_number = record
            .our_number
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| BoletoError::incomplete_record(&reference, "our_number"))?;
        // Rejected up front so a bad identifier aborts the batch before any line is built
        encode_identifier(&OUR_NUMBER, our_number)?;
        let due_date = record
            .due_date
            .ok_or_else(|| BoletoError::incomplete_record(&reference, "due_date"))?;
        let face_value = record
            .face_value
            .ok_or_else(|| BoletoError::incomplete_record(&reference, "face_value"))?;
        if face_value.0 < 0 {
            return Err(BoletoError::format_error(
                None,
                FACE_VALUE.name,
                &face_value.to_string(),
            ));
        }

        Ok(RemittableBoleto {
            record,
            our_number,
            face_value,
            due_date,
        })
    }
}

/// Encode an outbound remittance batch
///
/// # Errors
///
/// - [`BoletoError::EmptyBatch`] when `boletos` is empty
/// - [`BoletoError::IncompleteRecord`] naming the first boleto and field missing
/// - [`BoletoError::FormatError`] when a value does not fit its numeric slot
pub fn encode_remittance(
    profile: &BeneficiaryProfile,
    boletos: &[BoletoRecord],
    sequence: u32,
    generated_on: NaiveDate,
) -> Result<RemittanceBatch, BoletoError> {
    if boletos.is_empty() {
        return Err(BoletoError::EmptyBatch);
    }

    // Validate everything first: no partial files
    let remittable = boletos
        .iter()
        .map(RemittableBoleto::check)
        .collect::<Result<Vec<_>, _>>()?;

    let mut lines = Vec::with_capacity(2 * remittable.len() + 2);
    lines.push(file_header(profile, FILE_CODE_REMITTANCE, sequence, generated_on)?);

    let mut total_value = Cents::ZERO;
    let mut record_sequence: u64 = 0;
    for boleto in &remittable {
        record_sequence += 1;
        lines.push(segment_p(profile, boleto, record_sequence, generated_on)?);
        record_sequence += 1;
        lines.push(segment_q(profile, boleto.record, record_sequence)?);

        total_value = total_value
            .checked_add(boleto.face_value)
            .ok_or_else(|| BoletoError::format_error(None, "total_value", "overflow"))?;
    }

    let record_count = lines.len() + 1;
    lines.push(file_trailer(profile, record_count as u64)?);

    let metadata = BatchMetadata {
        file_name: remittance_file_name(generated_on, sequence),
        sequence,
        generated_on,
        boleto_count: remittable.len(),
        record_count,
        total_value,
    };

    info!(
        file = %metadata.file_name,
        boletos = metadata.boleto_count,
        records = metadata.record_count,
        total = %metadata.total_value,
        "Encoded remittance batch"
    );

    Ok(RemittanceBatch {
        bytes: join_lines(&lines),
        metadata,
    })
}

/// Encode a bank return file reporting `events`
///
/// Each event becomes one Segment T record; the trailer declares the number
/// of detail records.
pub fn encode_return(
    profile: &BeneficiaryProfile,
    events: &[ReturnEvent],
    sequence: u32,
    generated_on: NaiveDate,
) -> Result<Vec<u8>, BoletoError> {
    let mut lines = Vec::with_capacity(events.len() + 2);
    lines.push(file_header(profile, FILE_CODE_RETURN, sequence, generated_on)?);

    for (index, event) in events.iter().enumerate() {
        lines.push(segment_t(profile, event, index as u64 + 1)?);
    }

    lines.push(file_trailer(profile, events.len() as u64)?);
    Ok(join_lines(&lines))
}

fn join_lines(lines: &[String]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(lines.len() * (LINE_WIDTH + CRLF.len()));
    for line in lines {
        bytes.extend_from_slice(line.as_bytes());
        bytes.extend_from_slice(CRLF.as_bytes());
    }
    bytes
}

fn file_header(
    profile: &BeneficiaryProfile,
    file_code: u64,
    sequence: u32,
    generated_on: NaiveDate,
) -> Result<String, BoletoError> {
    let mut record = RecordWriter::new();
    record
        .number(&BANK_CODE, profile.bank_code.into())?
        .number(&LOT_NUMBER, LOT_FILE_HEADER)?
        .text(&RECORD_TYPE, &RECORD_FILE_HEADER.to_string())
        .number(&HEADER_TAX_ID_KIND, TaxIdKind::of(&profile.tax_id).code())?
        .digits(&HEADER_TAX_ID, &profile.tax_id)?
        .number(&HEADER_WALLET, profile.wallet.into())?
        .number(&HEADER_AGENCY, profile.agency.into())?
        .number(&HEADER_ACCOUNT, profile.account)?
        .text(&HEADER_ACCOUNT_DIGIT, &profile.account_digit)
        .text(&HEADER_COMPANY_NAME, &profile.name)
        .text(&HEADER_BANK_NAME, &profile.bank_name)
        .number(&HEADER_FILE_CODE, file_code)?
        .date(&HEADER_GENERATED_ON, Some(generated_on))
        .number(&HEADER_GENERATED_AT, 0)?
        .number(&HEADER_SEQUENCE, sequence.into())?
        .number(&HEADER_LAYOUT_VERSION, LAYOUT_VERSION)?;
    Ok(record.finish())
}

fn detail_prefix(
    record: &mut RecordWriter,
    profile: &BeneficiaryProfile,
    sequence: u64,
    segment: char,
    movement: &str,
) -> Result<(), BoletoError> {
    record
        .number(&BANK_CODE, profile.bank_code.into())?
        .number(&LOT_NUMBER, LOT_DETAIL)?
        .text(&RECORD_TYPE, &RECORD_DETAIL.to_string())
        .number(&DETAIL_SEQUENCE, sequence)?
        .text(&DETAIL_SEGMENT, &segment.to_string())
        .text(&DETAIL_MOVEMENT, movement);
    Ok(())
}

fn segment_p(
    profile: &BeneficiaryProfile,
    boleto: &RemittableBoleto<'_>,
    sequence: u64,
    issued_on: NaiveDate,
) -> Result<String, BoletoError> {
    let mut record = RecordWriter::new();
    detail_prefix(&mut record, profile, sequence, SEGMENT_P, MOVEMENT_REGISTER)?;
    record
        .number(&P_AGENCY, profile.agency.into())?
        .number(&P_ACCOUNT, profile.account)?
        .text(&P_ACCOUNT_DIGIT, &profile.account_digit)
        .identifier(&OUR_NUMBER, boleto.our_number)?
        .number(&P_WALLET, profile.wallet.into())?
        .text(&DOCUMENT_NUMBER, &boleto.record.document_number)
        .date(&DUE_DATE, Some(boleto.due_date))
        .number(&FACE_VALUE, boleto.face_value.0 as u64)?
        .number(&P_SPECIES, SPECIES_DM)?
        .text(&P_ACCEPTANCE, ACCEPTANCE_NOT_ACCEPTED)
        .date(&P_ISSUED_ON, Some(issued_on));
    Ok(record.finish())
}

fn segment_q(
    profile: &BeneficiaryProfile,
    boleto: &BoletoRecord,
    sequence: u64,
) -> Result<String, BoletoError> {
    let payer = &boleto.payer;
    let mut record = RecordWriter::new();
    detail_prefix(&mut record, profile, sequence, SEGMENT_Q, MOVEMENT_REGISTER)?;
    record
        .number(&Q_TAX_ID_KIND, TaxIdKind::of(&payer.tax_id).code())?
        .digits(&Q_TAX_ID, &payer.tax_id)?
        .text(&Q_NAME, &payer.name)
        .text(&Q_ADDRESS, &payer.address)
        .text(&Q_NEIGHBORHOOD, &payer.neighborhood)
        .digits(&Q_POSTAL_CODE, &payer.postal_code)?
        .text(&Q_CITY, &payer.city)
        .text(&Q_STATE, &payer.state);
    Ok(record.finish())
}

fn segment_t(
    profile: &BeneficiaryProfile,
    event: &ReturnEvent,
    sequence: u64,
) -> Result<String, BoletoError> {
    let movement_code = if event.movement_code.trim().is_empty() {
        movement_for_status(&event.status)
    } else {
        event.movement_code.clone()
    };
    let mut record = RecordWriter::new();
    detail_prefix(&mut record, profile, sequence, SEGMENT_T, &movement_code)?;
    let paid_amount = event.paid_amount.map(|c| c.0.max(0) as u64).unwrap_or(0);
    record
        .identifier(&OUR_NUMBER, &event.our_number)?
        .number(&FACE_VALUE, paid_amount)?
        .number(&T_PAID_AMOUNT, paid_amount)?
        .date(&T_PAID_ON, event.paid_on)
        .date(&T_OCCURRED_ON, event.occurred_on);
    Ok(record.finish())
}

fn file_trailer(profile: &BeneficiaryProfile, record_count: u64) -> Result<String, BoletoError> {
    let mut record = RecordWriter::new();
    record
        .number(&BANK_CODE, profile.bank_code.into())?
        .number(&LOT_NUMBER, LOT_FILE_TRAILER)?
        .text(&RECORD_TYPE, &RECORD_FILE_TRAILER.to_string())
        .number(&TRAILER_LOT_COUNT, 1)?
        .number(&TRAILER_RECORD_COUNT, record_count)?;
    Ok(record.finish())
}
