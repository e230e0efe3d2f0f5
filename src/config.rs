// In: src/config.rs

//! The single source of truth for all sjzip codec configuration.
//!
//! `CodecConfig` is created once at the application boundary (in code, or from a
//! JSON document) and then shared read-only through an `Arc<CodecConfig>`. The
//! geometry parameters it carries are also written into every record header, so
//! a record always decodes with the parameters it was encoded with.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::bridge::format::MAX_CHUNK_SIZE;
use crate::chunk_pipeline::models::Stage;
use crate::error::SjzipError;
use crate::kernels::curve::HilbertCurve;
use crate::kernels::quantize::Quantizer;
use crate::kernels::rotation::QuaternionCodec;
use crate::space::mapper::SpiralMapper;

//==================================================================================
// I. Optimization Levels
//==================================================================================

/// The compression level of a record. Each level is a fixed, ordered list of
/// stages; higher levels only ever append stages to the lower ones.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub enum OptimizationLevel {
    /// Plain mapped points, stored losslessly as `f64` triples.
    Mapping = 0,
    /// Points reordered along a Hilbert curve and stored as curve indices.
    CurveOrdered = 1,
    /// Curve-ordered points quantized to fixed-width integers.
    Quantized = 2,
    /// Quantized points, with each point stored as a rotation of its
    /// predecessor whenever that is both exact and shorter.
    #[default]
    RotationDelta = 3,
}

impl OptimizationLevel {
    pub const ALL: [OptimizationLevel; 4] = [
        OptimizationLevel::Mapping,
        OptimizationLevel::CurveOrdered,
        OptimizationLevel::Quantized,
        OptimizationLevel::RotationDelta,
    ];

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// The ordered encode-direction stage list for this level.
    pub fn stages(self) -> &'static [Stage] {
        const ALL_STAGES: [Stage; 4] = [
            Stage::Map,
            Stage::CurveReorder,
            Stage::Quantize,
            Stage::RotationDelta,
        ];
        &ALL_STAGES[..=self as usize]
    }
}

impl TryFrom<u8> for OptimizationLevel {
    type Error = SjzipError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(OptimizationLevel::Mapping),
            1 => Ok(OptimizationLevel::CurveOrdered),
            2 => Ok(OptimizationLevel::Quantized),
            3 => Ok(OptimizationLevel::RotationDelta),
            other => Err(SjzipError::InvalidConfig(format!(
                "optimization level must be 0..=3, got {}",
                other
            ))),
        }
    }
}

impl From<OptimizationLevel> for u8 {
    fn from(level: OptimizationLevel) -> Self {
        level.as_u8()
    }
}

impl fmt::Display for OptimizationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OptimizationLevel::Mapping => "mapping",
            OptimizationLevel::CurveOrdered => "curve_ordered",
            OptimizationLevel::Quantized => "quantized",
            OptimizationLevel::RotationDelta => "rotation_delta",
        };
        write!(f, "{} ({})", self.as_u8(), name)
    }
}

//==================================================================================
// II. Geometry Parameters
//==================================================================================

/// The numeric parameters that change how points are stored. These travel in
/// the record header and are re-validated on decode.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryParams {
    pub quantizer_bits: u8,
    pub curve_order: u8,
    pub quaternion_bits: u8,
}

impl Default for GeometryParams {
    fn default() -> Self {
        Self {
            quantizer_bits: default_quantizer_bits(),
            curve_order: default_curve_order(),
            quaternion_bits: default_quaternion_bits(),
        }
    }
}

impl GeometryParams {
    /// Rejects bit widths outside their supported ranges, and any lossy stage
    /// whose resolution could move a point onto a neighbouring character.
    pub fn validate(&self) -> Result<(), SjzipError> {
        let curve = HilbertCurve::new(self.curve_order)?;
        let quantizer = Quantizer::new(self.quantizer_bits)?;
        QuaternionCodec::new(self.quaternion_bits)?;

        let limit = SpiralMapper::global().min_separation() / 2.0;
        for (name, resolution) in [
            ("curve_order", curve.resolution()),
            ("quantizer_bits", quantizer.resolution()),
        ] {
            if resolution >= limit {
                return Err(SjzipError::InvalidConfig(format!(
                    "{} resolution {:.6} must be below half the minimum character separation ({:.6})",
                    name, resolution, limit
                )));
            }
        }
        Ok(())
    }
}

//==================================================================================
// III. The Unified CodecConfig
//==================================================================================

/// The single, unified configuration for the sjzip codec.
/// This struct is created once and shared throughout the system via an `Arc`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct CodecConfig {
    /// **The number of characters per chunk.** Every chunk but the last holds
    /// exactly this many characters. Must be in `1..=500`.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Bit width of quantized coordinates (`1..=24`). Smaller values shrink
    /// level 2/3 payloads but must stay fine enough to keep characters apart.
    #[serde(default = "default_quantizer_bits")]
    pub quantizer_bits: u8,

    /// Hilbert curve order per axis (`1..=21`). Level 1 stores positions at
    /// this resolution.
    #[serde(default = "default_curve_order")]
    pub curve_order: u8,

    /// Bit width of quantized quaternion components (`2..=24`). Coarser
    /// quaternions reproduce fewer points exactly and fall back to absolutes.
    #[serde(default = "default_quaternion_bits")]
    pub quaternion_bits: u8,

    /// The level used by `encode` calls that do not name one.
    #[serde(default)]
    pub default_level: OptimizationLevel,

    /// If true, chunks are processed on the rayon thread pool once there are
    /// at least `parallel_threshold` of them.
    #[serde(default = "default_true")]
    pub parallel: bool,

    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            quantizer_bits: default_quantizer_bits(),
            curve_order: default_curve_order(),
            quaternion_bits: default_quaternion_bits(),
            default_level: OptimizationLevel::default(),
            parallel: true,
            parallel_threshold: default_parallel_threshold(),
        }
    }
}

impl CodecConfig {
    /// Parses a JSON document. Missing fields take their defaults; the result
    /// is validated before it is returned.
    pub fn from_json_str(json: &str) -> Result<Self, SjzipError> {
        let config: CodecConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn geometry(&self) -> GeometryParams {
        GeometryParams {
            quantizer_bits: self.quantizer_bits,
            curve_order: self.curve_order,
            quaternion_bits: self.quaternion_bits,
        }
    }

    pub fn validate(&self) -> Result<(), SjzipError> {
        if self.chunk_size == 0 || self.chunk_size > MAX_CHUNK_SIZE {
            return Err(SjzipError::InvalidConfig(format!(
                "chunk_size must be in 1..={}, got {}",
                MAX_CHUNK_SIZE, self.chunk_size
            )));
        }
        self.geometry().validate()
    }
}

/// Helper for `serde` to default a boolean field to true.
fn default_true() -> bool {
    true
}

fn default_chunk_size() -> usize {
    MAX_CHUNK_SIZE
}

fn default_quantizer_bits() -> u8 {
    16
}

fn default_curve_order() -> u8 {
    10
}

fn default_quaternion_bits() -> u8 {
    16
}

fn default_parallel_threshold() -> usize {
    8
}
