//! This module serves as the public API for the chunk processing pipeline.
//!
//! It composes the kernels into per-level stage lists, runs them over every
//! chunk of a text, and defines the record those chunks are stored in.

//==================================================================================
// 1. Module Declarations
//==================================================================================

/// The on-disk record format: writer, reader and header peeking.
pub mod artifact;

/// The "General Contractor": validation, chunking and dispatch.
pub mod orchestrator;

/// The "Foreman": runs a stage list over one chunk.
pub(crate) mod executor;

pub mod context;
pub mod models;
pub mod traits;

#[cfg(test)]
mod orchestrator_tests;

//==================================================================================
// 2. Public API Re-exports
//==================================================================================

pub use self::artifact::RecordInfo;
pub use self::models::{ChunkBody, ChunkPayload, Record, RecordHeader, Stage};
pub use self::orchestrator::{decode_record, encode_text};
