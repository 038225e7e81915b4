//! CNAB240 interchange
//!
//! # Components
//!
//! - `layout` - Column table for every record and segment, plus movement codes
//! - `codec` - Fixed-width field encoding and decoding
//! - `encoder` - Remittance batch (and bank-side return) file generation
//! - `decoder` - Return file parsing and structural validation

pub mod codec;
pub mod decoder;
pub mod encoder;
pub mod layout;

pub use decoder::{decode_return, decode_return_file, ReturnFile, ReturnHeader};
pub use encoder::{
    encode_remittance, encode_return, remittance_file_name, BatchMetadata, RemittanceBatch,
};
