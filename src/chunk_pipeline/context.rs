// In: src/chunk_pipeline/context.rs

use crate::config::GeometryParams;
use crate::error::SjzipError;
use crate::kernels::rotation::{QuaternionCodec, RotationDeltaCodec};
use crate::kernels::{HilbertCurve, Quantizer};

/// The read-only tools every stage of every chunk works with.
///
/// It is built once per encode/decode call from the record's geometry, and is
/// `Copy + Sync`, so parallel chunk workers share it freely.
#[derive(Debug, Clone, Copy)]
pub struct StageContext {
    pub curve: HilbertCurve,
    pub quantizer: Quantizer,
    pub rotation: RotationDeltaCodec,
}

impl StageContext {
    pub fn new(geometry: &GeometryParams) -> Result<Self, SjzipError> {
        geometry.validate()?;
        let quantizer = Quantizer::new(geometry.quantizer_bits)?;
        Ok(Self {
            curve: HilbertCurve::new(geometry.curve_order)?,
            quantizer,
            rotation: RotationDeltaCodec::new(
                quantizer,
                QuaternionCodec::new(geometry.quaternion_bits)?,
            ),
        })
    }
}
