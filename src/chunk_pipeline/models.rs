// In: src/chunk_pipeline/models.rs

//! The in-memory data model of the chunk pipeline: the stages a level is made
//! of, the per-chunk payloads they produce, and the record that carries them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{GeometryParams, OptimizationLevel};
use crate::kernels::rotation::DeltaStep;
use crate::types::{Point, QuantizedPoint};

/// One step of a level's stage list.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Characters to DOT packets.
    Map,
    /// DOT packets to curve-ordered points plus a permutation.
    CurveReorder,
    /// Unit-cube points to fixed-width integers.
    Quantize,
    /// Quantized points to absolute/rotation steps.
    RotationDelta,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Map => "map",
            Stage::CurveReorder => "curve_reorder",
            Stage::Quantize => "quantize",
            Stage::RotationDelta => "rotation_delta",
        };
        f.write_str(name)
    }
}

/// The stored form of one chunk. Exactly one variant is valid per level.
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkBody {
    /// Level 0: mapped points in position order.
    Absolute(Vec<Point>),
    /// Level 1: ascending curve indices and the original position of each.
    CurveOrdered {
        permutation: Vec<u16>,
        curve_indices: Vec<u64>,
    },
    /// Level 2: curve-ordered quantized points.
    Quantized {
        permutation: Vec<u16>,
        points: Vec<QuantizedPoint>,
    },
    /// Level 3: curve-ordered absolute/rotation steps.
    RotationDelta {
        permutation: Vec<u16>,
        steps: Vec<DeltaStep>,
    },
}

impl ChunkBody {
    pub const TAG_ABSOLUTE: u8 = 0;
    pub const TAG_CURVE_ORDERED: u8 = 1;
    pub const TAG_QUANTIZED: u8 = 2;
    pub const TAG_ROTATION_DELTA: u8 = 3;

    pub fn tag(&self) -> u8 {
        match self {
            ChunkBody::Absolute(_) => Self::TAG_ABSOLUTE,
            ChunkBody::CurveOrdered { .. } => Self::TAG_CURVE_ORDERED,
            ChunkBody::Quantized { .. } => Self::TAG_QUANTIZED,
            ChunkBody::RotationDelta { .. } => Self::TAG_ROTATION_DELTA,
        }
    }

    /// The level whose stage list produces this body.
    pub fn level(&self) -> OptimizationLevel {
        match self {
            ChunkBody::Absolute(_) => OptimizationLevel::Mapping,
            ChunkBody::CurveOrdered { .. } => OptimizationLevel::CurveOrdered,
            ChunkBody::Quantized { .. } => OptimizationLevel::Quantized,
            ChunkBody::RotationDelta { .. } => OptimizationLevel::RotationDelta,
        }
    }

    /// Number of entries (characters) the body describes.
    pub fn len(&self) -> usize {
        match self {
            ChunkBody::Absolute(points) => points.len(),
            ChunkBody::CurveOrdered { curve_indices, .. } => curve_indices.len(),
            ChunkBody::Quantized { points, .. } => points.len(),
            ChunkBody::RotationDelta { steps, .. } => steps.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One encoded chunk: its character count and stored body.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkPayload {
    pub length: u16,
    pub body: ChunkBody,
}

/// Everything needed to decode a record, independent of the decoder's config.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub version: u16,
    pub level: OptimizationLevel,
    pub geometry: GeometryParams,
    pub chunk_size: u16,
    /// Length of the original text in characters.
    pub original_length: u64,
}

/// A fully encoded text.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub header: RecordHeader,
    pub chunks: Vec<ChunkPayload>,
}

impl Record {
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn level(&self) -> OptimizationLevel {
        self.header.level
    }

    pub fn original_length(&self) -> u64 {
        self.header.original_length
    }
}
