//! The "General Contractor": validates input, splits it into chunks, hands each
//! chunk to the executor, and assembles or checks the record.

pub mod core;
mod dispatch;

pub use self::core::{decode_record, encode_text, validate_input, validate_record};
