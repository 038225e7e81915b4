//! Batch decoder for settlement-bank return files
//!
//! Decoding is all-or-nothing: a file with any structural defect yields an
//! error and no events. Validation covers line width, record types, the
//! header/trailer frame and the trailer's declared detail count. Business
//! validity of individual events is left to reconciliation.
//!
//! The decoder is a pure function of the input bytes.

use chrono::NaiveDate;
use tracing::{debug, info};

use super::codec::RecordReader;
use super::layout::*;
use crate::types::{BoletoError, Cents, ReturnEvent};

/// Identification data from the return file header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnHeader {
    pub bank_code: u16,
    pub beneficiary_tax_id: String,
    pub sequence: u32,
    pub generated_on: Option<NaiveDate>,
}

/// A fully validated return file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnFile {
    pub header: ReturnHeader,
    pub events: Vec<ReturnEvent>,
}

/// Decode a return file into its ordered events
pub fn decode_return(bytes: &[u8]) -> Result<Vec<ReturnEvent>, BoletoError> {
    decode_return_file(bytes).map(|file| file.events)
}

/// Decode a return file, keeping its header
///
/// # Errors
///
/// Structural errors abort the whole file:
/// - [`BoletoError::MalformedLine`] for any line that is not 240 characters
/// - [`BoletoError::UnknownRecordType`] / [`BoletoError::UnknownSegment`]
/// - [`BoletoError::MissingHeader`] / [`BoletoError::MissingTrailer`]
/// - [`BoletoError::UnexpectedRecord`] for records outside the frame
/// - [`BoletoError::CountMismatch`] when the trailer disagrees with the details
/// - [`BoletoError::FormatError`] for non-numeric data in numeric slots
pub fn decode_return_file(bytes: &[u8]) -> Result<ReturnFile, BoletoError> {
    let text = String::from_utf8_lossy(bytes);
    let mut lines: Vec<&str> = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }

    let mut header: Option<ReturnHeader> = None;
    let mut declared: Option<u64> = None;
    let mut events = Vec::new();

    for (index, raw) in lines.iter().enumerate() {
        let line = index + 1;
        let record = RecordReader::new(line, raw)?;
        let record_type = record.char_at(&RECORD_TYPE);

        if declared.is_some() {
            return Err(BoletoError::UnexpectedRecord {
                line,
                message: "record after file trailer".to_string(),
            });
        }

        match record_type {
            RECORD_FILE_HEADER => {
                if header.is_some() {
                    return Err(BoletoError::UnexpectedRecord {
                        line,
                        message: "second file header".to_string(),
                    });
                }
                header = Some(parse_header(&record)?);
            }
            _ if header.is_none() => return Err(BoletoError::MissingHeader),
            RECORD_LOT_HEADER | RECORD_LOT_TRAILER => {
                debug!(line, "Skipping lot control record");
            }
            RECORD_DETAIL => events.push(parse_detail(&record)?),
            RECORD_FILE_TRAILER => {
                declared = Some(record.number(&TRAILER_RECORD_COUNT)?);
            }
            other => {
                return Err(BoletoError::UnknownRecordType {
                    line,
                    record_type: other,
                })
            }
        }
    }

    let header = header.ok_or(BoletoError::MissingHeader)?;
    let declared = declared.ok_or(BoletoError::MissingTrailer)?;
    let actual = events.len() as u64;
    if declared != actual {
        return Err(BoletoError::CountMismatch { declared, actual });
    }

    info!(
        bank = header.bank_code,
        sequence = header.sequence,
        events = events.len(),
        "Decoded return file"
    );

    Ok(ReturnFile { header, events })
}

fn parse_header(record: &RecordReader) -> Result<ReturnHeader, BoletoError> {
    let file_code = record.number(&HEADER_FILE_CODE)?;
    if file_code != FILE_CODE_RETURN {
        return Err(BoletoError::UnexpectedRecord {
            line: record.line(),
            message: format!("file code {} is not a return file", file_code),
        });
    }

    let bank_code = record.number(&BANK_CODE)?;
    let sequence = record.number(&HEADER_SEQUENCE)?;
    Ok(ReturnHeader {
        // Both slots are narrower than their target types
        bank_code: bank_code as u16,
        beneficiary_tax_id: record.text(&HEADER_TAX_ID),
        sequence: sequence as u32,
        generated_on: record.date(&HEADER_GENERATED_ON)?,
    })
}

fn parse_detail(record: &RecordReader) -> Result<ReturnEvent, BoletoError> {
    let segment = record.char_at(&DETAIL_SEGMENT);
    if segment != SEGMENT_T {
        return Err(BoletoError::UnknownSegment {
            line: record.line(),
            segment,
        });
    }

    let our_number = record.text(&OUR_NUMBER);
    if our_number.is_empty() {
        return Err(BoletoError::format_error(
            Some(record.line()),
            OUR_NUMBER.name,
            &record.raw(&OUR_NUMBER),
        ));
    }

    let movement_code = record.text(&DETAIL_MOVEMENT);
    let paid_amount = match record.number(&T_PAID_AMOUNT)? {
        0 => None,
        cents => Some(Cents(cents as i64)),
    };

    let event = ReturnEvent {
        line: record.line(),
        status: status_for_movement(&movement_code),
        our_number,
        movement_code,
        paid_on: record.date(&T_PAID_ON)?,
        paid_amount,
        occurred_on: record.date(&T_OCCURRED_ON)?,
    };
    debug!(
        line = event.line,
        our_number = %event.our_number,
        status = %event.status,
        "Decoded return event"
    );
    Ok(event)
}
