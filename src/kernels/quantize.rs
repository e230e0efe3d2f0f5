//! Fixed-scale coordinate quantization.
//!
//! A unit-cube coordinate `c` becomes the integer `round(c * SCALE)` with
//! `SCALE = 2^bits - 1`, so both cube faces are exactly representable. Values
//! are never clamped: anything outside `[0, 1]` is a `ScaleOverflow`.

use crate::error::SjzipError;
use crate::types::{Point, QuantizedPoint};

pub const MIN_BITS: u8 = 1;
pub const MAX_BITS: u8 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantizer {
    bits: u8,
    scale: u32,
}

impl Quantizer {
    pub fn new(bits: u8) -> Result<Self, SjzipError> {
        if !(MIN_BITS..=MAX_BITS).contains(&bits) {
            return Err(SjzipError::InvalidConfig(format!(
                "quantizer_bits must be in {}..={}, got {}",
                MIN_BITS, MAX_BITS, bits
            )));
        }
        Ok(Self {
            bits,
            scale: (1u32 << bits) - 1,
        })
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// The spacing between two adjacent quantized values.
    pub fn resolution(&self) -> f64 {
        1.0 / self.scale as f64
    }

    pub fn quantize_value(&self, value: f64) -> Result<u32, SjzipError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(SjzipError::ScaleOverflow {
                value,
                bits: self.bits,
            });
        }
        // Rounds half away from zero; the result is in [0, scale].
        Ok((value * self.scale as f64).round() as u32)
    }

    pub fn dequantize_value(&self, q: u32) -> Result<f64, SjzipError> {
        if q > self.scale {
            return Err(SjzipError::ScaleOverflow {
                value: q as f64,
                bits: self.bits,
            });
        }
        Ok(q as f64 / self.scale as f64)
    }

    pub fn quantize(&self, point: &Point) -> Result<QuantizedPoint, SjzipError> {
        Ok(QuantizedPoint::new(
            self.quantize_value(point.x())?,
            self.quantize_value(point.y())?,
            self.quantize_value(point.z())?,
        ))
    }

    pub fn dequantize(&self, q: &QuantizedPoint) -> Result<Point, SjzipError> {
        Point::new(
            self.dequantize_value(q.x)?,
            self.dequantize_value(q.y)?,
            self.dequantize_value(q.z)?,
        )
    }
}
