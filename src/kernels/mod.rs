//! This module collects the pure, stateless transform kernels that the chunk
//! pipeline composes into compression levels.
//!
//! Kernels know nothing about chunks, records or levels. Each one takes plain
//! values, returns plain values, and reports failures through `SjzipError`.

//==================================================================================
// 1. Module Declarations
//==================================================================================

/// Spatial reordering
pub mod curve;
pub mod permutation;

/// Precision reduction
pub mod quantize;
pub mod rotation;

/// Integer packing
pub mod leb128;
pub mod zigzag;

//==================================================================================
// 2. Public API Re-exports
//==================================================================================

pub use self::curve::HilbertCurve;
pub use self::quantize::Quantizer;
pub use self::rotation::{DeltaStep, QuantizedQuaternion, QuaternionCodec, RotationDeltaCodec};
