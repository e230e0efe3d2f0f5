// In: src/chunk_pipeline/executor.rs

//! This module contains the core execution logic for a single chunk.
//!
//! It is a non-strategic component: it faithfully runs an already validated,
//! linear list of stages forwards (encode) or backwards (decode) over one chunk,
//! and converts between the final in-memory representation and the stored
//! `ChunkBody`. Every failure is tagged with the stage and chunk it happened in.

use crate::bridge::format::MAX_CHUNK_SIZE;
use crate::chunk_pipeline::context::StageContext;
use crate::chunk_pipeline::models::{ChunkBody, ChunkPayload, Stage};
use crate::chunk_pipeline::traits::ReprKind;
use crate::dot::{self, DotPacket};
use crate::error::SjzipError;
use crate::kernels::permutation;
use crate::kernels::rotation::DeltaStep;
use crate::log_metric;
use crate::space::mapper::MAP_EPSILON;
use crate::types::{Point, QuantizedPoint};

/// A chunk between two stages. `tolerance` is the largest per-axis distance a
/// point may have moved from its exact mapped position.
#[derive(Debug, Clone)]
pub(crate) enum ChunkRepr {
    Text(String),
    Packets {
        packets: Vec<DotPacket>,
        tolerance: f64,
    },
    Ordered {
        permutation: Vec<u16>,
        points: Vec<Point>,
        tolerance: f64,
    },
    Quantized {
        permutation: Vec<u16>,
        points: Vec<QuantizedPoint>,
    },
    Deltas {
        permutation: Vec<u16>,
        steps: Vec<DeltaStep>,
    },
}

impl ChunkRepr {
    pub(crate) fn kind(&self) -> ReprKind {
        match self {
            ChunkRepr::Text(_) => ReprKind::Text,
            ChunkRepr::Packets { .. } => ReprKind::Packets,
            ChunkRepr::Ordered { .. } => ReprKind::Ordered,
            ChunkRepr::Quantized { .. } => ReprKind::Quantized,
            ChunkRepr::Deltas { .. } => ReprKind::Deltas,
        }
    }
}

fn mismatch(stage: Stage, repr: &ChunkRepr) -> SjzipError {
    SjzipError::InternalError(format!(
        "stage '{}' received a {:?} representation",
        stage,
        repr.kind()
    ))
}

//==================================================================================
// 1. Per-Stage Transforms
//==================================================================================

fn encode_stage(stage: Stage, repr: ChunkRepr, ctx: &StageContext) -> Result<ChunkRepr, SjzipError> {
    match (stage, repr) {
        (Stage::Map, ChunkRepr::Text(text)) => Ok(ChunkRepr::Packets {
            packets: dot::encode_chunk(&text)?,
            tolerance: MAP_EPSILON,
        }),

        (Stage::CurveReorder, ChunkRepr::Packets { packets, tolerance }) => {
            let points: Vec<Point> = packets.iter().map(|p| p.point).collect();
            let (_, permutation) = ctx.curve.encode_order(&points)?;
            let ordered = permutation.iter().map(|&p| points[p as usize]).collect();
            Ok(ChunkRepr::Ordered {
                permutation,
                points: ordered,
                tolerance,
            })
        }

        (Stage::Quantize, ChunkRepr::Ordered { permutation, points, .. }) => {
            let points = points
                .iter()
                .map(|p| ctx.quantizer.quantize(p))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ChunkRepr::Quantized { permutation, points })
        }

        (Stage::RotationDelta, ChunkRepr::Quantized { permutation, points }) => {
            Ok(ChunkRepr::Deltas {
                steps: ctx.rotation.encode(&points)?,
                permutation,
            })
        }

        (stage, other) => Err(mismatch(stage, &other)),
    }
}

fn decode_stage(stage: Stage, repr: ChunkRepr, ctx: &StageContext) -> Result<ChunkRepr, SjzipError> {
    match (stage, repr) {
        (Stage::Map, ChunkRepr::Packets { packets, tolerance }) => Ok(ChunkRepr::Text(
            dot::decode_chunk_within(&packets, tolerance)?,
        )),

        (Stage::CurveReorder, ChunkRepr::Ordered { permutation, points, tolerance }) => {
            let restored = permutation::restore(&points, &permutation)?;
            Ok(ChunkRepr::Packets {
                packets: into_packets(restored)?,
                tolerance,
            })
        }

        (Stage::Quantize, ChunkRepr::Quantized { permutation, points }) => {
            let points = points
                .iter()
                .map(|q| ctx.quantizer.dequantize(q))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ChunkRepr::Ordered {
                permutation,
                points,
                tolerance: ctx.quantizer.resolution(),
            })
        }

        (Stage::RotationDelta, ChunkRepr::Deltas { permutation, steps }) => {
            Ok(ChunkRepr::Quantized {
                points: ctx.rotation.decode(&steps)?,
                permutation,
            })
        }

        (stage, other) => Err(mismatch(stage, &other)),
    }
}

fn into_packets(points: Vec<Point>) -> Result<Vec<DotPacket>, SjzipError> {
    if points.len() > MAX_CHUNK_SIZE {
        return Err(SjzipError::ChunkTooLarge {
            len: points.len(),
            max: MAX_CHUNK_SIZE,
        });
    }
    Ok(points
        .into_iter()
        .enumerate()
        .map(|(i, point)| DotPacket {
            position: i as u16,
            point,
        })
        .collect())
}

//==================================================================================
// 2. Body Conversion
//==================================================================================

fn into_body(repr: ChunkRepr, ctx: &StageContext) -> Result<ChunkBody, SjzipError> {
    match repr {
        ChunkRepr::Packets { mut packets, .. } => {
            packets.sort_by_key(|p| p.position);
            Ok(ChunkBody::Absolute(packets.into_iter().map(|p| p.point).collect()))
        }
        ChunkRepr::Ordered { permutation, points, .. } => Ok(ChunkBody::CurveOrdered {
            curve_indices: points.iter().map(|p| ctx.curve.index_of(p)).collect(),
            permutation,
        }),
        ChunkRepr::Quantized { permutation, points } => {
            Ok(ChunkBody::Quantized { permutation, points })
        }
        ChunkRepr::Deltas { permutation, steps } => {
            Ok(ChunkBody::RotationDelta { permutation, steps })
        }
        ChunkRepr::Text(_) => Err(SjzipError::InternalError(
            "a chunk cannot be stored as plain text".to_string(),
        )),
    }
}

fn from_body(body: &ChunkBody, ctx: &StageContext) -> Result<ChunkRepr, SjzipError> {
    match body {
        ChunkBody::Absolute(points) => Ok(ChunkRepr::Packets {
            packets: into_packets(points.clone())?,
            tolerance: MAP_EPSILON,
        }),
        ChunkBody::CurveOrdered {
            permutation,
            curve_indices,
        } => Ok(ChunkRepr::Ordered {
            permutation: permutation.clone(),
            points: curve_indices
                .iter()
                .map(|&i| ctx.curve.point_of(i))
                .collect::<Result<Vec<_>, _>>()?,
            tolerance: ctx.curve.resolution(),
        }),
        ChunkBody::Quantized { permutation, points } => Ok(ChunkRepr::Quantized {
            permutation: permutation.clone(),
            points: points.clone(),
        }),
        ChunkBody::RotationDelta { permutation, steps } => Ok(ChunkRepr::Deltas {
            permutation: permutation.clone(),
            steps: steps.clone(),
        }),
    }
}

//==================================================================================
// 3. Public Entry Points
//==================================================================================

/// Runs `stages` forwards over one chunk of text.
pub(crate) fn encode_chunk(
    chunk: &str,
    stages: &[Stage],
    ctx: &StageContext,
    index: usize,
) -> Result<ChunkPayload, SjzipError> {
    let first = stages.first().copied().unwrap_or(Stage::Map);
    let last = stages.last().copied().unwrap_or(Stage::Map);

    let length = chunk.chars().count();
    if length > MAX_CHUNK_SIZE {
        return Err(SjzipError::ChunkTooLarge {
            len: length,
            max: MAX_CHUNK_SIZE,
        }
        .in_stage(first, index));
    }

    let mut repr = ChunkRepr::Text(chunk.to_string());
    for &stage in stages {
        repr = encode_stage(stage, repr, ctx).map_err(|e| e.in_stage(stage, index))?;
    }
    let body = into_body(repr, ctx).map_err(|e| e.in_stage(last, index))?;

    log::debug!(
        "chunk {}: encoded {} characters into a tag-{} body",
        index,
        length,
        body.tag()
    );
    if let ChunkBody::RotationDelta { steps, .. } = &body {
        let deltas = steps
            .iter()
            .filter(|s| matches!(s, DeltaStep::Delta(_)))
            .count();
        log_metric!("event" = "rotation_delta", "chunk" = index, "steps" = steps.len(), "deltas" = deltas);
    }

    Ok(ChunkPayload {
        length: length as u16,
        body,
    })
}

/// Runs `stages` backwards over one stored chunk.
pub(crate) fn decode_chunk(
    payload: &ChunkPayload,
    stages: &[Stage],
    ctx: &StageContext,
    index: usize,
) -> Result<String, SjzipError> {
    let first = stages.first().copied().unwrap_or(Stage::Map);
    let last = stages.last().copied().unwrap_or(Stage::Map);

    if payload.body.len() != payload.length as usize {
        return Err(SjzipError::RecordFormat(format!(
            "chunk declares {} characters but its body holds {} entries",
            payload.length,
            payload.body.len()
        ))
        .in_stage(last, index));
    }

    let mut repr = from_body(&payload.body, ctx).map_err(|e| e.in_stage(last, index))?;
    for &stage in stages.iter().rev() {
        repr = decode_stage(stage, repr, ctx).map_err(|e| e.in_stage(stage, index))?;
    }

    match repr {
        ChunkRepr::Text(text) => {
            log::debug!("chunk {}: decoded {} characters", index, payload.length);
            Ok(text)
        }
        other => Err(mismatch(first, &other).in_stage(first, index)),
    }
}
