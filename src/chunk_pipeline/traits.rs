// In: src/chunk_pipeline/traits.rs

//! Defines the behavioral contract of pipeline stages.
//!
//! Every stage declares the chunk representation it consumes and the one it
//! produces. A stage list is only executed after the whole chain has been
//! checked against these declarations, so a mis-ordered list is reported as a
//! configuration bug before any chunk is touched.

use crate::chunk_pipeline::models::{ChunkBody, Stage};
use crate::error::SjzipError;

/// The shape of a chunk between two stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReprKind {
    /// Plain characters.
    Text,
    /// Position-tagged exact points.
    Packets,
    /// Curve-ordered points with their permutation.
    Ordered,
    /// Curve-ordered quantized points with their permutation.
    Quantized,
    /// Curve-ordered absolute/rotation steps with their permutation.
    Deltas,
}

/// A trait implemented by every stage, declaring its input and output shape.
pub trait StageBehavior {
    fn consumes(&self) -> ReprKind;
    fn produces(&self) -> ReprKind;
}

impl StageBehavior for Stage {
    fn consumes(&self) -> ReprKind {
        match self {
            Stage::Map => ReprKind::Text,
            Stage::CurveReorder => ReprKind::Packets,
            Stage::Quantize => ReprKind::Ordered,
            Stage::RotationDelta => ReprKind::Quantized,
        }
    }

    fn produces(&self) -> ReprKind {
        match self {
            Stage::Map => ReprKind::Packets,
            Stage::CurveReorder => ReprKind::Ordered,
            Stage::Quantize => ReprKind::Quantized,
            Stage::RotationDelta => ReprKind::Deltas,
        }
    }
}

/// Checks that `stages` form a chain starting from text, and returns the
/// representation the chain ends in.
pub fn validate_chain(stages: &[Stage]) -> Result<ReprKind, SjzipError> {
    let mut current = ReprKind::Text;
    for stage in stages {
        if stage.consumes() != current {
            return Err(SjzipError::InternalError(format!(
                "stage '{}' consumes {:?} but the chain provides {:?}",
                stage,
                stage.consumes(),
                current
            )));
        }
        current = stage.produces();
    }
    if current == ReprKind::Text {
        return Err(SjzipError::InternalError(
            "stage chain must contain at least the map stage".to_string(),
        ));
    }
    Ok(current)
}

impl ChunkBody {
    /// The representation a body is stored from and decoded into.
    pub fn kind(&self) -> ReprKind {
        match self {
            ChunkBody::Absolute(_) => ReprKind::Packets,
            ChunkBody::CurveOrdered { .. } => ReprKind::Ordered,
            ChunkBody::Quantized { .. } => ReprKind::Quantized,
            ChunkBody::RotationDelta { .. } => ReprKind::Deltas,
        }
    }
}
