// In: src/bridge/format.rs

//! Defines the on-disk constants and the public analysis struct for the sjzip
//! record format. The byte layout itself lives in `chunk_pipeline::artifact`;
//! this module owns the numbers both sides of the boundary agree on.

use serde::Serialize;

use crate::config::OptimizationLevel;
use crate::error::SjzipError;

//==================================================================================
// I. Record-Level Format
//==================================================================================

/// The magic number to identify the start of an sjzip record.
pub const RECORD_MAGIC: &[u8; 4] = b"SJZR";
/// The current version of the sjzip record format.
pub const RECORD_FORMAT_VERSION: u16 = 1;

//==================================================================================
// II. Hard Limits
//==================================================================================

/// Largest accepted input text, in UTF-8 bytes.
pub const MAX_TEXT_BYTES: usize = 100 * 1024 * 1024;
/// Largest chunk, in characters.
pub const MAX_CHUNK_SIZE: usize = 500;
/// Most chunks a single record may hold.
pub const MAX_CHUNK_COUNT: usize = 100_000;
/// Largest serialized chunk body, in bytes.
pub const MAX_PAYLOAD_BYTES: usize = 10 * 1024 * 1024;

//==================================================================================
// III. Analysis
//==================================================================================

/// How many chunks of a record are stored with one body representation.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct BodyTally {
    pub level: OptimizationLevel,
    pub chunks: usize,
    /// Body bytes, excluding the per-chunk framing.
    pub bytes: usize,
}

/// The public-facing struct for record analysis results, returned by `analyze_record`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CompressionStats {
    pub header_size: usize,
    pub data_size: usize,
    pub total_size: usize,
    pub level: OptimizationLevel,
    pub chunk_count: usize,
    pub original_length: u64,
    pub bodies: Vec<BodyTally>,
    /// UTF-8 size of the original text, when the caller knows it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_bytes: Option<usize>,
    /// `total_size / original_bytes`. Values above 1.0 are expected for short
    /// texts and low levels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratio: Option<f64>,
}

impl CompressionStats {
    pub fn to_json(&self) -> Result<String, SjzipError> {
        Ok(serde_json::to_string(self)?)
    }
}
