// In: src/bridge/stateless_api.rs

use crate::bridge::format::{BodyTally, CompressionStats};
use crate::chunk_pipeline;
use crate::chunk_pipeline::artifact::RecordInfo;
use crate::chunk_pipeline::models::Record;
use crate::config::{CodecConfig, OptimizationLevel};
use crate::error::SjzipError;

/// Encodes `text` at `level` with the default configuration.
pub fn encode(text: &str, level: OptimizationLevel) -> Result<Record, SjzipError> {
    // Since this is a stateless API, we don't have a user-provided config.
    let default_config = CodecConfig::default();
    chunk_pipeline::orchestrator::encode_text(text, level, &default_config, None)
}

/// Decodes a record. Level and geometry come from the record header.
pub fn decode(record: &Record) -> Result<String, SjzipError> {
    chunk_pipeline::orchestrator::decode_record(record, &CodecConfig::default(), None)
}

/// Encodes `text` straight into the record byte format.
pub fn encode_to_bytes(text: &str, level: OptimizationLevel) -> Result<Vec<u8>, SjzipError> {
    encode(text, level)?.to_bytes()
}

/// Parses and decodes a serialized record.
pub fn decode_from_bytes(bytes: &[u8]) -> Result<String, SjzipError> {
    decode(&Record::from_bytes(bytes)?)
}

/// Analyzes a serialized record without decoding any chunk body.
/// This function acts as a simple facade over the `peek_info` method.
///
/// `original_bytes` is the UTF-8 size of the source text; when given, the
/// compression ratio is reported against it.
pub fn analyze_record(
    bytes: &[u8],
    original_bytes: Option<usize>,
) -> Result<CompressionStats, SjzipError> {
    // 1. Delegate to the efficient "peek" function in the artifact module.
    let info = Record::peek_info(bytes)?;

    // 2. Translate the detailed RecordInfo into the public-facing CompressionStats struct.
    Ok(CompressionStats {
        header_size: info.header_size,
        data_size: info.data_size,
        total_size: bytes.len(),
        level: info.level,
        chunk_count: info.chunk_count(),
        original_length: info.original_length,
        bodies: tally_bodies(&info)?,
        original_bytes,
        ratio: original_bytes
            .filter(|&n| n > 0)
            .map(|n| bytes.len() as f64 / n as f64),
    })
}

fn tally_bodies(info: &RecordInfo) -> Result<Vec<BodyTally>, SjzipError> {
    let mut tally: Vec<BodyTally> = OptimizationLevel::ALL
        .iter()
        .map(|&level| BodyTally {
            level,
            chunks: 0,
            bytes: 0,
        })
        .collect();
    for chunk in &info.chunks {
        // Body tags share their numbering with the levels.
        let level = OptimizationLevel::try_from(chunk.tag)
            .map_err(|_| SjzipError::RecordFormat(format!("unknown chunk body tag {}", chunk.tag)))?;
        let entry = &mut tally[level.as_u8() as usize];
        entry.chunks += 1;
        entry.bytes += chunk.body_size;
    }
    tally.retain(|t| t.chunks > 0);
    Ok(tally)
}
