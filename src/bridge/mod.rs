// In: src/bridge/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Bridge Layer
// ====================================================================================
//
// The `bridge` is the public-facing API of the sjzip library. It wraps the pure
// `chunk_pipeline` engine behind a small set of text-in / record-out calls and
// owns the constants of the on-disk record format.
//
// Data Flow (Encoding):
//
//   1. [Stateful Facade (Codec)]            -> Receives `&str` plus its shared config
//         |
//   2. [Pipeline Engine (chunk_pipeline::orchestrator)] -> Returns `Record`
//         |
//   3. [Artifact (Record::to_bytes)]        -> Returns `Vec<u8>`
//
// Data Flow (Decoding) is the mirror image: `Record::from_bytes` ->
// `orchestrator::decode_record` -> `String`. The level and geometry always come
// from the record header, never from the caller.
//
// ====================================================================================
pub mod codec;
pub mod format;
pub mod stateless_api;

// --- High-Level Stateful API ---
pub use codec::Codec;

// --- Low-Level Stateless API ---
pub use stateless_api::{analyze_record, decode, decode_from_bytes, encode, encode_to_bytes};

// --- Format Constants and Structs ---
pub use format::{BodyTally, CompressionStats};

#[cfg(test)]
mod tests;
