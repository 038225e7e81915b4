//! Fixed-width field codec
//!
//! Encoding never fails for text: values are normalised to upper-case ASCII,
//! then truncated or blank-padded on the right. Numbers are zero-padded on the
//! left and rejected when wider than their slot. Decoding works on character
//! positions so that a stray non-ASCII byte cannot shift every later field.

use chrono::NaiveDate;

use super::layout::{Field, LINE_WIDTH};
use crate::types::BoletoError;

/// Side of the field the value is anchored to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// Fit `value` into exactly `width` characters
///
/// Left-aligned values are padded on the right and truncated at the end;
/// right-aligned values are padded on the left and keep their trailing
/// characters when truncated.
pub fn encode_field(value: &str, width: usize, align: Align, pad: char) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() >= width {
        return match align {
            Align::Left => chars[..width].iter().collect(),
            Align::Right => chars[chars.len() - width..].iter().collect(),
        };
    }

    let padding: String = std::iter::repeat(pad).take(width - chars.len()).collect();
    match align {
        Align::Left => format!("{}{}", value, padding),
        Align::Right => format!("{}{}", padding, value),
    }
}

/// Upper-case ASCII rendition of free text
///
/// Portuguese diacritics are folded to their base letter; anything else
/// outside printable ASCII becomes a blank.
pub fn normalize_text(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' | 'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
            'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'E',
            'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' | 'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
            'ú' | 'ù' | 'û' | 'ü' | 'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
            'ç' | 'Ç' => 'C',
            'ñ' | 'Ñ' => 'N',
            c if c.is_ascii_graphic() || c == ' ' => c.to_ascii_uppercase(),
            _ => ' ',
        })
        .collect()
}

/// Encode a text field: normalised, left-aligned, blank-padded
pub fn encode_text(field: &Field, value: &str) -> String {
    encode_field(&normalize_text(value), field.width, Align::Left, ' ')
}

/// Encode an identifier verbatim: left-aligned, blank-padded
///
/// Identifiers are matched byte for byte when the bank echoes them back, so
/// they are never normalised or truncated. Anything but printable ASCII, or
/// a value wider than the slot, is a [`BoletoError::FormatError`].
pub fn encode_identifier(field: &Field, value: &str) -> Result<String, BoletoError> {
    if value.len() > field.width || !value.chars().all(|c| c.is_ascii_graphic()) {
        return Err(BoletoError::format_error(None, field.name, value));
    }
    Ok(encode_field(value, field.width, Align::Left, ' '))
}

/// Encode a numeric field: right-aligned, zero-padded
pub fn encode_number(field: &Field, value: u64) -> Result<String, BoletoError> {
    let digits = value.to_string();
    if digits.len() > field.width {
        return Err(BoletoError::format_error(None, field.name, &digits));
    }
    Ok(encode_field(&digits, field.width, Align::Right, '0'))
}

/// Encode a digit string that may carry punctuation (tax ids, postal codes)
pub fn encode_digits(field: &Field, value: &str) -> Result<String, BoletoError> {
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    if digits.len() > field.width {
        return Err(BoletoError::format_error(None, field.name, value));
    }
    Ok(encode_field(&digits, field.width, Align::Right, '0'))
}

/// Encode a date as `DDMMYYYY`, or zeros when absent
pub fn encode_date(field: &Field, date: Option<NaiveDate>) -> String {
    match date {
        Some(date) => encode_field(&date.format("%d%m%Y").to_string(), field.width, Align::Right, '0'),
        None => encode_field("", field.width, Align::Right, '0'),
    }
}

/// Builds one record, starting from an all-blank line
#[derive(Debug, Clone)]
pub struct RecordWriter {
    columns: Vec<char>,
}

impl RecordWriter {
    pub fn new() -> Self {
        RecordWriter {
            columns: vec![' '; LINE_WIDTH],
        }
    }

    fn put(&mut self, field: &Field, encoded: &str) {
        for (column, c) in field.range().zip(encoded.chars()) {
            self.columns[column] = c;
        }
    }

    pub fn text(&mut self, field: &Field, value: &str) -> &mut Self {
        let encoded = encode_text(field, value);
        self.put(field, &encoded);
        self
    }

    pub fn identifier(&mut self, field: &Field, value: &str) -> Result<&mut Self, BoletoError> {
        let encoded = encode_identifier(field, value)?;
        self.put(field, &encoded);
        Ok(self)
    }

    pub fn number(&mut self, field: &Field, value: u64) -> Result<&mut Self, BoletoError> {
        let encoded = encode_number(field, value)?;
        self.put(field, &encoded);
        Ok(self)
    }

    pub fn digits(&mut self, field: &Field, value: &str) -> Result<&mut Self, BoletoError> {
        let encoded = encode_digits(field, value)?;
        self.put(field, &encoded);
        Ok(self)
    }

    pub fn date(&mut self, field: &Field, date: Option<NaiveDate>) -> &mut Self {
        let encoded = encode_date(field, date);
        self.put(field, &encoded);
        self
    }

    pub fn finish(&self) -> String {
        self.columns.iter().collect()
    }
}

impl Default for RecordWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// A validated 240-character input line
#[derive(Debug, Clone)]
pub struct RecordReader {
    /// 1-based line number in the source file
    line: usize,
    columns: Vec<char>,
}

impl RecordReader {
    /// Wrap a raw line, rejecting anything but exactly 240 characters
    pub fn new(line: usize, raw: &str) -> Result<Self, BoletoError> {
        let columns: Vec<char> = raw.chars().collect();
        if columns.len() != LINE_WIDTH {
            return Err(BoletoError::MalformedLine {
                line,
                length: columns.len(),
            });
        }
        Ok(RecordReader { line, columns })
    }

    pub fn line(&self) -> usize {
        self.line
    }

    /// Raw, untrimmed slice of a field
    pub fn raw(&self, field: &Field) -> String {
        self.columns[field.range()].iter().collect()
    }

    pub fn char_at(&self, field: &Field) -> char {
        self.columns[field.start - 1]
    }

    pub fn text(&self, field: &Field) -> String {
        self.raw(field).trim().to_string()
    }

    pub fn number(&self, field: &Field) -> Result<u64, BoletoError> {
        let raw = self.raw(field);
        if !raw.chars().all(|c| c.is_ascii_digit()) {
            return Err(BoletoError::format_error(Some(self.line), field.name, &raw));
        }
        raw.parse::<u64>()
            .map_err(|_| BoletoError::format_error(Some(self.line), field.name, &raw))
    }

    /// `DDMMYYYY`; an all-zero slot means "no date"
    pub fn date(&self, field: &Field) -> Result<Option<NaiveDate>, BoletoError> {
        if self.number(field)? == 0 {
            return Ok(None);
        }
        let raw = self.raw(field);
        NaiveDate::parse_from_str(&raw, "%d%m%Y")
            .map(Some)
            .map_err(|_| BoletoError::format_error(Some(self.line), field.name, &raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cnab::layout::{DUE_DATE, FACE_VALUE, OUR_NUMBER, Q_NAME, Q_POSTAL_CODE};
    use rstest::rstest;

    #[rstest]
    #[case::pad_text("ABC", 5, Align::Left, ' ', "ABC  ")]
    #[case::pad_number("42", 5, Align::Right, '0', "00042")]
    #[case::truncate_text("ABCDEFG", 3, Align::Left, ' ', "ABC")]
    #[case::truncate_right("12345", 3, Align::Right, '0', "345")]
    #[case::exact("ABC", 3, Align::Left, ' ', "ABC")]
    #[case::empty("", 2, Align::Right, '0', "00")]
    fn test_encode_field(
        #[case] value: &str,
        #[case] width: usize,
        #[case] align: Align,
        #[case] pad: char,
        #[case] expected: &str,
    ) {
        assert_eq!(encode_field(value, width, align, pad), expected);
    }

    #[test]
    fn test_normalize_text_folds_accents() {
        assert_eq!(normalize_text("João da Conceição"), "JOAO DA CONCEICAO");
        assert_eq!(normalize_text("Rua 7 – Nº 3"), "RUA 7   N  3");
    }

    #[test]
    fn test_encode_text_truncates_long_names() {
        let long = "A".repeat(60);
        assert_eq!(encode_text(&Q_NAME, &long).len(), Q_NAME.width);
    }

    #[test]
    fn test_encode_number_rejects_overflow() {
        let result = encode_number(&FACE_VALUE, 1_000_000_000_000_000);
        assert!(matches!(
            result,
            Err(BoletoError::FormatError { line: None, .. })
        ));
    }

    #[rstest]
    #[case::kept_verbatim("ab12cd", Ok("ab12cd              ".to_string()))]
    #[case::full_width("12345678901234567890", Ok("12345678901234567890".to_string()))]
    #[case::too_long("123456789012345678901", Err(()))]
    #[case::inner_blank("12 34", Err(()))]
    #[case::non_ascii("Nº123", Err(()))]
    fn test_encode_identifier(#[case] value: &str, #[case] expected: Result<String, ()>) {
        let encoded = encode_identifier(&OUR_NUMBER, value).map_err(|e| {
            assert!(matches!(e, BoletoError::FormatError { line: None, .. }));
        });
        assert_eq!(encoded, expected);
    }

    #[test]
    fn test_encode_digits_strips_punctuation() {
        assert_eq!(encode_digits(&Q_POSTAL_CODE, "01310-100").unwrap(), "01310100");
    }

    #[test]
    fn test_writer_reader_fields() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let mut writer = RecordWriter::new();
        writer.text(&OUR_NUMBER, "00012345");
        writer.number(&FACE_VALUE, 150_075).unwrap();
        writer.date(&DUE_DATE, Some(date));
        let line = writer.finish();
        assert_eq!(line.len(), LINE_WIDTH);

        let reader = RecordReader::new(1, &line).unwrap();
        assert_eq!(reader.text(&OUR_NUMBER), "00012345");
        assert_eq!(reader.number(&FACE_VALUE).unwrap(), 150_075);
        assert_eq!(reader.date(&DUE_DATE).unwrap(), Some(date));
    }

    #[test]
    fn test_reader_rejects_short_line() {
        let result = RecordReader::new(7, "0011");
        assert_eq!(
            result.unwrap_err(),
            BoletoError::MalformedLine { line: 7, length: 4 }
        );
    }

    #[test]
    fn test_reader_number_rejects_non_digits() {
        let mut line = " ".repeat(LINE_WIDTH);
        line.replace_range(FACE_VALUE.range(), "0000000001A0000");
        let reader = RecordReader::new(3, &line).unwrap();
        assert!(matches!(
            reader.number(&FACE_VALUE),
            Err(BoletoError::FormatError { line: Some(3), .. })
        ));
    }

    #[test]
    fn test_reader_zero_date_is_absent() {
        let mut line = " ".repeat(LINE_WIDTH);
        line.replace_range(DUE_DATE.range(), "00000000");
        let reader = RecordReader::new(1, &line).unwrap();
        assert_eq!(reader.date(&DUE_DATE).unwrap(), None);
    }

    #[test]
    fn test_reader_invalid_date() {
        let mut line = " ".repeat(LINE_WIDTH);
        line.replace_range(DUE_DATE.range(), "31022024");
        let reader = RecordReader::new(1, &line).unwrap();
        assert!(reader.date(&DUE_DATE).is_err());
    }
}
