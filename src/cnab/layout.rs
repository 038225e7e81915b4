//! CNAB240 layout table
//!
//! Column positions are 1-based and inclusive, as printed in the bank's layout
//! manual. Positions not listed here are filled with blanks.

use crate::types::ReportedStatus;

/// Every record in the file is exactly this many characters
pub const LINE_WIDTH: usize = 240;

/// Layout version written in the file header
pub const LAYOUT_VERSION: u64 = 103;

/// A fixed-width slot in a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    /// 1-based first column
    pub start: usize,
    pub width: usize,
}

impl Field {
    pub const fn new(name: &'static str, start: usize, width: usize) -> Self {
        Field { name, start, width }
    }

    /// 0-based character range within the line
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start - 1..self.start - 1 + self.width
    }
}

// Record types (column 8)
pub const RECORD_FILE_HEADER: char = '0';
pub const RECORD_LOT_HEADER: char = '1';
pub const RECORD_DETAIL: char = '3';
pub const RECORD_LOT_TRAILER: char = '5';
pub const RECORD_FILE_TRAILER: char = '9';

// Lot numbers (columns 4-7)
pub const LOT_FILE_HEADER: u64 = 0;
pub const LOT_DETAIL: u64 = 1;
pub const LOT_FILE_TRAILER: u64 = 9999;

// Detail segment codes (column 14)
pub const SEGMENT_P: char = 'P';
pub const SEGMENT_Q: char = 'Q';
pub const SEGMENT_T: char = 'T';

// File header code (column 143)
pub const FILE_CODE_REMITTANCE: u64 = 1;
pub const FILE_CODE_RETURN: u64 = 2;

/// Movement code for registering a new boleto
pub const MOVEMENT_REGISTER: &str = "01";
/// Species "duplicata mercantil"
pub const SPECIES_DM: u64 = 2;
/// Boletos are remitted as not accepted by the payer
pub const ACCEPTANCE_NOT_ACCEPTED: &str = "N";

// Common to every record
pub const BANK_CODE: Field = Field::new("bank_code", 1, 3);
pub const LOT_NUMBER: Field = Field::new("lot_number", 4, 4);
pub const RECORD_TYPE: Field = Field::new("record_type", 8, 1);

// File header
pub const HEADER_TAX_ID_KIND: Field = Field::new("beneficiary_tax_id_kind", 18, 1);
pub const HEADER_TAX_ID: Field = Field::new("beneficiary_tax_id", 19, 14);
pub const HEADER_WALLET: Field = Field::new("wallet", 33, 2);
pub const HEADER_AGENCY: Field = Field::new("agency", 53, 5);
pub const HEADER_ACCOUNT: Field = Field::new("account", 59, 12);
pub const HEADER_ACCOUNT_DIGIT: Field = Field::new("account_digit", 71, 1);
pub const HEADER_COMPANY_NAME: Field = Field::new("beneficiary_name", 73, 30);
pub const HEADER_BANK_NAME: Field = Field::new("bank_name", 103, 30);
pub const HEADER_FILE_CODE: Field = Field::new("file_code", 143, 1);
pub const HEADER_GENERATED_ON: Field = Field::new("generated_on", 144, 8);
pub const HEADER_GENERATED_AT: Field = Field::new("generated_at", 152, 6);
pub const HEADER_SEQUENCE: Field = Field::new("file_sequence", 158, 6);
pub const HEADER_LAYOUT_VERSION: Field = Field::new("layout_version", 164, 3);

// Detail records, all segments
pub const DETAIL_SEQUENCE: Field = Field::new("record_sequence", 9, 5);
pub const DETAIL_SEGMENT: Field = Field::new("segment", 14, 1);
pub const DETAIL_MOVEMENT: Field = Field::new("movement_code", 16, 2);

// Segment P (instrument terms); our-number through face value are shared with T
pub const P_AGENCY: Field = Field::new("agency", 18, 5);
pub const P_ACCOUNT: Field = Field::new("account", 24, 12);
pub const P_ACCOUNT_DIGIT: Field = Field::new("account_digit", 36, 1);
pub const OUR_NUMBER: Field = Field::new("our_number", 38, 20);
pub const P_WALLET: Field = Field::new("wallet", 58, 2);
pub const DOCUMENT_NUMBER: Field = Field::new("document_number", 63, 15);
pub const DUE_DATE: Field = Field::new("due_date", 78, 8);
pub const FACE_VALUE: Field = Field::new("face_value", 86, 15);
pub const P_SPECIES: Field = Field::new("species", 107, 2);
pub const P_ACCEPTANCE: Field = Field::new("acceptance", 109, 1);
pub const P_ISSUED_ON: Field = Field::new("issued_on", 110, 8);

// Segment Q (payer identity)
pub const Q_TAX_ID_KIND: Field = Field::new("payer_tax_id_kind", 18, 1);
pub const Q_TAX_ID: Field = Field::new("payer_tax_id", 19, 15);
pub const Q_NAME: Field = Field::new("payer_name", 34, 40);
pub const Q_ADDRESS: Field = Field::new("payer_address", 74, 40);
pub const Q_NEIGHBORHOOD: Field = Field::new("payer_neighborhood", 114, 15);
pub const Q_POSTAL_CODE: Field = Field::new("payer_postal_code", 129, 8);
pub const Q_CITY: Field = Field::new("payer_city", 137, 15);
pub const Q_STATE: Field = Field::new("payer_state", 152, 2);

// Segment T (return settlement facts)
pub const T_PAID_AMOUNT: Field = Field::new("paid_amount", 101, 15);
pub const T_PAID_ON: Field = Field::new("paid_on", 116, 8);
pub const T_OCCURRED_ON: Field = Field::new("occurred_on", 124, 8);

// File trailer
pub const TRAILER_LOT_COUNT: Field = Field::new("lot_count", 18, 6);
pub const TRAILER_RECORD_COUNT: Field = Field::new("record_count", 24, 6);

/// Bank movement codes understood by the decoder
pub const MOVEMENT_CODES: &[(&str, ReportedStatusCode)] = &[
    ("06", ReportedStatusCode::Paid),
    ("17", ReportedStatusCode::Paid),
    ("09", ReportedStatusCode::Cancelled),
    ("23", ReportedStatusCode::Overdue),
];

/// Mapped statuses in [`MOVEMENT_CODES`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportedStatusCode {
    Paid,
    Overdue,
    Cancelled,
}

/// Map a bank movement code to the reported status
pub fn status_for_movement(code: &str) -> ReportedStatus {
    match MOVEMENT_CODES.iter().find(|(known, _)| *known == code) {
        Some((_, ReportedStatusCode::Paid)) => ReportedStatus::Paid,
        Some((_, ReportedStatusCode::Overdue)) => ReportedStatus::Overdue,
        Some((_, ReportedStatusCode::Cancelled)) => ReportedStatus::Cancelled,
        None => ReportedStatus::Unknown(code.to_string()),
    }
}

/// Movement code the bank uses for a reported status
pub fn movement_for_status(status: &ReportedStatus) -> String {
    let wanted = match status {
        ReportedStatus::Paid => ReportedStatusCode::Paid,
        ReportedStatus::Overdue => ReportedStatusCode::Overdue,
        ReportedStatus::Cancelled => ReportedStatusCode::Cancelled,
        ReportedStatus::Unknown(code) => return code.clone(),
    };
    MOVEMENT_CODES
        .iter()
        .find(|(_, status)| *status == wanted)
        .map(|(code, _)| code.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const SEGMENT_P_FIELDS: &[Field] = &[
        BANK_CODE,
        LOT_NUMBER,
        RECORD_TYPE,
        DETAIL_SEQUENCE,
        DETAIL_SEGMENT,
        DETAIL_MOVEMENT,
        P_AGENCY,
        P_ACCOUNT,
        P_ACCOUNT_DIGIT,
        OUR_NUMBER,
        P_WALLET,
        DOCUMENT_NUMBER,
        DUE_DATE,
        FACE_VALUE,
        P_SPECIES,
        P_ACCEPTANCE,
        P_ISSUED_ON,
    ];

    const SEGMENT_Q_FIELDS: &[Field] = &[
        BANK_CODE,
        LOT_NUMBER,
        RECORD_TYPE,
        DETAIL_SEQUENCE,
        DETAIL_SEGMENT,
        DETAIL_MOVEMENT,
        Q_TAX_ID_KIND,
        Q_TAX_ID,
        Q_NAME,
        Q_ADDRESS,
        Q_NEIGHBORHOOD,
        Q_POSTAL_CODE,
        Q_CITY,
        Q_STATE,
    ];

    const SEGMENT_T_FIELDS: &[Field] = &[
        BANK_CODE,
        LOT_NUMBER,
        RECORD_TYPE,
        DETAIL_SEQUENCE,
        DETAIL_SEGMENT,
        DETAIL_MOVEMENT,
        OUR_NUMBER,
        DOCUMENT_NUMBER,
        DUE_DATE,
        FACE_VALUE,
        T_PAID_AMOUNT,
        T_PAID_ON,
        T_OCCURRED_ON,
    ];

    const HEADER_FIELDS: &[Field] = &[
        BANK_CODE,
        LOT_NUMBER,
        RECORD_TYPE,
        HEADER_TAX_ID_KIND,
        HEADER_TAX_ID,
        HEADER_WALLET,
        HEADER_AGENCY,
        HEADER_ACCOUNT,
        HEADER_ACCOUNT_DIGIT,
        HEADER_COMPANY_NAME,
        HEADER_BANK_NAME,
        HEADER_FILE_CODE,
        HEADER_GENERATED_ON,
        HEADER_GENERATED_AT,
        HEADER_SEQUENCE,
        HEADER_LAYOUT_VERSION,
    ];

    #[rstest]
    #[case::header(HEADER_FIELDS)]
    #[case::segment_p(SEGMENT_P_FIELDS)]
    #[case::segment_q(SEGMENT_Q_FIELDS)]
    #[case::segment_t(SEGMENT_T_FIELDS)]
    fn test_fields_fit_and_do_not_overlap(#[case] fields: &[Field]) {
        let mut taken = [false; LINE_WIDTH];
        for field in fields {
            assert!(field.range().end <= LINE_WIDTH, "{} overflows", field.name);
            for column in field.range() {
                assert!(!taken[column], "{} overlaps column {}", field.name, column + 1);
                taken[column] = true;
            }
        }
    }

    #[rstest]
    #[case("06", ReportedStatus::Paid)]
    #[case("17", ReportedStatus::Paid)]
    #[case("09", ReportedStatus::Cancelled)]
    #[case("23", ReportedStatus::Overdue)]
    #[case("02", ReportedStatus::Unknown("02".to_string()))]
    fn test_status_for_movement(#[case] code: &str, #[case] expected: ReportedStatus) {
        assert_eq!(status_for_movement(code), expected);
    }

    #[test]
    fn test_movement_for_status_uses_first_code() {
        assert_eq!(movement_for_status(&ReportedStatus::Paid), "06");
        assert_eq!(
            movement_for_status(&ReportedStatus::Unknown("44".to_string())),
            "44"
        );
    }
}
