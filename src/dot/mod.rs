//! The DOT representation: a chunk of text as an ordered sequence of points.
//!
//! Every character of a chunk becomes one [`DotPacket`] carrying its position
//! and its mapped point. Decoding accepts packets in any order as long as the
//! positions form a permutation of `0..len`.

pub mod single;

use serde::{Deserialize, Serialize};

use crate::bridge::format::MAX_CHUNK_SIZE;
use crate::error::SjzipError;
use crate::space::mapper::MAP_EPSILON;
use crate::space::{Alphabet, SpiralMapper};
use crate::types::Point;

pub use self::single::{from_single_dot, single_dot_capacity, to_single_dot, SingleDot};

/// One character of a chunk. Deserialized packets carry validated points;
/// positions are checked when the chunk is decoded.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct DotPacket {
    pub position: u16,
    pub point: Point,
}

/// Maps every character of `chunk` to a packet, in position order.
pub fn encode_chunk(chunk: &str) -> Result<Vec<DotPacket>, SjzipError> {
    let indices = Alphabet::global().indices_of(chunk)?;
    if indices.len() > MAX_CHUNK_SIZE {
        return Err(SjzipError::ChunkTooLarge {
            len: indices.len(),
            max: MAX_CHUNK_SIZE,
        });
    }

    let mapper = SpiralMapper::global();
    indices
        .iter()
        .enumerate()
        .map(|(position, &index)| {
            Ok(DotPacket {
                position: position as u16,
                point: mapper.map(index as usize)?,
            })
        })
        .collect()
}

/// Exact inverse of [`encode_chunk`].
pub fn decode_chunk(packets: &[DotPacket]) -> Result<String, SjzipError> {
    decode_chunk_within(packets, MAP_EPSILON)
}

/// Inverse of [`encode_chunk`] for points that may have moved by up to
/// `tolerance` per axis.
pub fn decode_chunk_within(packets: &[DotPacket], tolerance: f64) -> Result<String, SjzipError> {
    if packets.len() > MAX_CHUNK_SIZE {
        return Err(SjzipError::ChunkTooLarge {
            len: packets.len(),
            max: MAX_CHUNK_SIZE,
        });
    }

    let alphabet = Alphabet::global();
    let mapper = SpiralMapper::global();
    let mut slots: Vec<Option<char>> = vec![None; packets.len()];

    for packet in packets {
        let position = packet.position as usize;
        let slot = slots.get_mut(position).ok_or_else(|| SjzipError::CorruptPacket {
            position,
            reason: format!("position is outside a chunk of {} packets", packets.len()),
        })?;
        if slot.is_some() {
            return Err(SjzipError::CorruptPacket {
                position,
                reason: "position appears more than once".to_string(),
            });
        }

        let index = mapper
            .unmap_within(&packet.point, tolerance)
            .map_err(|e| SjzipError::CorruptPacket {
                position,
                reason: e.to_string(),
            })?;
        *slot = Some(alphabet.char_of(index)?);
    }

    // Every slot is filled: there are as many packets as slots and no position
    // was seen twice.
    slots
        .into_iter()
        .enumerate()
        .map(|(position, ch)| {
            ch.ok_or_else(|| SjzipError::CorruptPacket {
                position,
                reason: "missing packet".to_string(),
            })
        })
        .collect()
}

//==================================================================================
// JSON Interchange
//==================================================================================

pub fn packets_to_json(packets: &[DotPacket]) -> Result<String, SjzipError> {
    Ok(serde_json::to_string(packets)?)
}

/// Parses a packet list. Coordinates outside the unit cube are rejected here;
/// the list is bounded by the chunk limit before any packet is returned.
pub fn packets_from_json(json: &str) -> Result<Vec<DotPacket>, SjzipError> {
    let packets: Vec<DotPacket> = serde_json::from_str(json)?;
    if packets.len() > MAX_CHUNK_SIZE {
        return Err(SjzipError::ChunkTooLarge {
            len: packets.len(),
            max: MAX_CHUNK_SIZE,
        });
    }
    Ok(packets)
}

pub fn single_dot_to_json(dot: &SingleDot) -> Result<String, SjzipError> {
    Ok(serde_json::to_string(dot)?)
}

pub fn single_dot_from_json(json: &str) -> Result<SingleDot, SjzipError> {
    Ok(serde_json::from_str(json)?)
}
