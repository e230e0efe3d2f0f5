// In: src/error.rs

//! This module defines the single, unified error type for the entire sjzip library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.
//!
//! Every variant belongs to one [`ErrorKind`], so callers can react to the class of
//! failure (bad input, corrupted record, broken numeric invariant) without matching
//! on every individual variant.

use thiserror::Error;

use crate::chunk_pipeline::models::Stage;
use crate::types::Axis;

/// The coarse classification of an [`SjzipError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input rejected at the boundary: oversized, unsupported character, limits.
    Validation,
    /// A point or index that does not belong to the mapping. Corrupted or foreign input.
    Mapping,
    /// An internal numeric contract was breached (scale overflow, quaternion norm).
    Numeric,
    /// The serialized record is malformed.
    Format,
    /// The caller abandoned the operation between chunks.
    Cancelled,
    /// A bug in this library.
    Internal,
}

#[derive(Error, Debug)]
pub enum SjzipError {
    // =========================================================================
    // === Validation Errors (always surfaced to the caller, never retried)
    // =========================================================================
    #[error("Input of {size} bytes exceeds the maximum of {max} bytes")]
    InputTooLarge { size: usize, max: usize },

    #[error("Unsupported character U+{:04X} at position {position}", code_point(.ch))]
    UnsupportedCharacter { ch: char, position: usize },

    #[error("Chunk of {len} characters exceeds the maximum of {max}")]
    ChunkTooLarge { len: usize, max: usize },

    #[error("Too many chunks: {count} exceeds the maximum of {max}")]
    TooManyChunks { count: usize, max: usize },

    #[error("Chunk payload of {size} bytes exceeds the maximum of {max} bytes")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("Coordinate {axis}={value} lies outside [0, 1]")]
    CoordinateOutOfRange { axis: Axis, value: f64 },

    #[error("Invalid codec configuration: {0}")]
    InvalidConfig(String),

    // =========================================================================
    // === Mapping Errors (corrupted or foreign input to decode)
    // =========================================================================
    #[error("Alphabet index {index} is out of range [0, {size})")]
    IndexOutOfRange { index: usize, size: usize },

    #[error("Point ({x}, {y}, {z}) does not correspond to any alphabet index")]
    UnmappablePoint { x: f64, y: f64, z: f64 },

    #[error("Corrupt DOT packet at position {position}: {reason}")]
    CorruptPacket { position: usize, reason: String },

    #[error("Chunk of {length} characters exceeds the single-DOT capacity of {capacity}")]
    AggregationOverflow { length: usize, capacity: usize },

    // =========================================================================
    // === Numeric Errors (internal invariant breaches)
    // =========================================================================
    #[error("Value {value} cannot be quantized within {bits} bits")]
    ScaleOverflow { value: f64, bits: u8 },

    #[error("Quaternion vector part has squared norm {norm_sq}, expected at most 1")]
    QuaternionNorm { norm_sq: f64 },

    // =========================================================================
    // === Format Errors
    // =========================================================================
    #[error("Record format error: {0}")]
    RecordFormat(String),

    #[error("LEB128 decoding error: {0}")]
    Leb128DecodeError(String),

    // =========================================================================
    // === Control Flow & Wrappers
    // =========================================================================
    #[error("Operation cancelled after {completed} of {total} chunks")]
    Cancelled { completed: usize, total: usize },

    #[error("Internal logic error (this is a bug): {0}")]
    InternalError(String),

    #[error("Pipeline execution failed at stage '{stage}' on chunk {chunk}: {source}")]
    StageError {
        stage: Stage,
        chunk: usize,
        #[source]
        source: Box<SjzipError>,
    },

    /// An error originating from the underlying I/O subsystem (e.g. the log file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library, typically while loading a config
    /// or rendering record diagnostics.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

fn code_point(ch: &char) -> u32 {
    *ch as u32
}

impl SjzipError {
    /// Wraps `self` with the stage and chunk index it failed in.
    pub fn in_stage(self, stage: Stage, chunk: usize) -> Self {
        SjzipError::StageError {
            stage,
            chunk,
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, looking through any `StageError` wrappers.
    pub fn root(&self) -> &SjzipError {
        match self {
            SjzipError::StageError { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        use SjzipError::*;
        match self {
            InputTooLarge { .. }
            | UnsupportedCharacter { .. }
            | ChunkTooLarge { .. }
            | TooManyChunks { .. }
            | PayloadTooLarge { .. }
            | CoordinateOutOfRange { .. }
            | InvalidConfig(_) => ErrorKind::Validation,

            IndexOutOfRange { .. }
            | UnmappablePoint { .. }
            | CorruptPacket { .. }
            | AggregationOverflow { .. } => ErrorKind::Mapping,

            ScaleOverflow { .. } | QuaternionNorm { .. } => ErrorKind::Numeric,

            RecordFormat(_) | Leb128DecodeError(_) | Io(_) | SerdeJson(_) => ErrorKind::Format,

            Cancelled { .. } => ErrorKind::Cancelled,
            InternalError(_) => ErrorKind::Internal,
            StageError { source, .. } => source.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_error_reports_root_and_kind() {
        let inner = SjzipError::UnmappablePoint {
            x: 0.1,
            y: 0.2,
            z: 0.3,
        };
        let err = inner.in_stage(Stage::Map, 4);
        assert_eq!(err.kind(), ErrorKind::Mapping);
        assert!(matches!(err.root(), SjzipError::UnmappablePoint { .. }));
        let msg = err.to_string();
        assert!(msg.contains("map"));
        assert!(msg.contains("chunk 4"));
    }

    #[test]
    fn test_unsupported_character_message_uses_code_point() {
        let err = SjzipError::UnsupportedCharacter {
            ch: '\u{1F600}',
            position: 7,
        };
        assert_eq!(
            err.to_string(),
            "Unsupported character U+1F600 at position 7"
        );
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
