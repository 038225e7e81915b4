//! I/O module
//!
//! Handles the boleto CSV export and raw interchange files.
//!
//! # Components
//!
//! - `csv_format` - Boleto export rows, conversion and the rejection report
//! - `files` - Reading return files and writing remittance batches

pub mod csv_format;
pub mod files;

pub use csv_format::{
    convert_csv_row, read_boletos, record_to_row, write_boletos_csv, write_rejections_csv,
    BoletoCsvRow,
};
pub use files::{read_return_file, read_return_file_async, write_batch_file};
