//! Defines the self-describing byte format of a compressed record.
//! This module is the single source of truth for serialization, deserialization,
//! and efficient metadata peeking of a record.
//!
//! Layout (all integers little-endian):
//!
//! ```text
//! magic "SJZR" | version u16 | level u8 | quantizer_bits u8 | curve_order u8 |
//! quaternion_bits u8 | chunk_size u16 | original_length u64 | chunk_count u32
//! then per chunk: length u16 | body tag u8 | body_len u32 | body
//! ```

use serde::Serialize;
use std::io::{Cursor, Read};

use crate::bridge::format::{
    MAX_CHUNK_COUNT, MAX_PAYLOAD_BYTES, RECORD_FORMAT_VERSION, RECORD_MAGIC,
};
use crate::chunk_pipeline::models::{ChunkBody, ChunkPayload, Record, RecordHeader};
use crate::config::{GeometryParams, OptimizationLevel};
use crate::error::SjzipError;
use crate::kernels::rotation::{DeltaStep, QuantizedQuaternion};
use crate::kernels::{leb128, zigzag};
use crate::types::{Point, QuantizedPoint};

//==================================================================================
// Format Constants
//==================================================================================
/// The size of the fixed record header in bytes.
pub const HEADER_SIZE: usize = 24; // magic(4) + ver(2) + 4 x u8 + chunk_size(2) + len(8) + count(4)
/// The size of the framing in front of every chunk body.
pub const CHUNK_FRAME_SIZE: usize = 7; // length(2) + tag(1) + body_len(4)

//==================================================================================
// Public Structs
//==================================================================================

/// Framing metadata of one chunk, read without decoding its body.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkInfo {
    pub length: u16,
    pub tag: u8,
    pub body_size: usize,
}

/// The metadata extracted from a record's header and chunk framing.
/// This is the return type of the efficient `peek_info` function.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RecordInfo {
    pub format_version: u16,
    pub level: OptimizationLevel,
    pub geometry: GeometryParams,
    pub chunk_size: u16,
    pub original_length: u64,
    pub chunks: Vec<ChunkInfo>,
    /// Size of the fixed header in bytes.
    pub header_size: usize,
    /// Size of all chunk framing and bodies in bytes.
    pub data_size: usize,
}

impl RecordInfo {
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn total_size(&self) -> usize {
        self.header_size + self.data_size
    }
}

//==================================================================================
// Core Implementation
//==================================================================================

impl Record {
    /// Serializes the record into its canonical byte form. The output depends
    /// only on the record, so equal records always produce identical bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SjzipError> {
        if self.chunks.len() > MAX_CHUNK_COUNT {
            return Err(SjzipError::TooManyChunks {
                count: self.chunks.len(),
                max: MAX_CHUNK_COUNT,
            });
        }

        let header = &self.header;
        let mut buf = Vec::with_capacity(HEADER_SIZE + self.chunks.len() * 64);
        buf.extend_from_slice(RECORD_MAGIC);
        buf.extend_from_slice(&header.version.to_le_bytes());
        buf.push(header.level.as_u8());
        buf.push(header.geometry.quantizer_bits);
        buf.push(header.geometry.curve_order);
        buf.push(header.geometry.quaternion_bits);
        buf.extend_from_slice(&header.chunk_size.to_le_bytes());
        buf.extend_from_slice(&header.original_length.to_le_bytes());
        buf.extend_from_slice(&(self.chunks.len() as u32).to_le_bytes());

        let mut body = Vec::new();
        for chunk in &self.chunks {
            body.clear();
            write_body(&chunk.body, &mut body)?;
            if body.len() > MAX_PAYLOAD_BYTES {
                return Err(SjzipError::PayloadTooLarge {
                    size: body.len(),
                    max: MAX_PAYLOAD_BYTES,
                });
            }
            buf.extend_from_slice(&chunk.length.to_le_bytes());
            buf.push(chunk.body.tag());
            buf.extend_from_slice(&(body.len() as u32).to_le_bytes());
            buf.extend_from_slice(&body);
        }
        Ok(buf)
    }

    /// Deserializes a full byte slice into a `Record`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SjzipError> {
        // Reuse peek_info to parse and bounds-check all framing first.
        let info = Self::peek_info(bytes)?;

        let mut cursor = Cursor::new(bytes);
        cursor.set_position(info.header_size as u64);

        let mut chunks = Vec::with_capacity(info.chunks.len());
        for (i, chunk) in info.chunks.iter().enumerate() {
            let start = cursor.position() as usize + CHUNK_FRAME_SIZE;
            let end = start + chunk.body_size;
            // peek_info guarantees the range is inside `bytes`.
            let body_bytes = bytes.get(start..end).ok_or_else(|| {
                SjzipError::RecordFormat(format!("chunk {} body exceeds the record", i))
            })?;
            let body = read_body(chunk.tag, chunk.length as usize, body_bytes)
                .map_err(|e| match e {
                    SjzipError::Leb128DecodeError(msg) => {
                        SjzipError::RecordFormat(format!("chunk {}: {}", i, msg))
                    }
                    other => other,
                })?;
            chunks.push(ChunkPayload {
                length: chunk.length,
                body,
            });
            cursor.set_position(end as u64);
        }

        Ok(Self {
            header: RecordHeader {
                version: info.format_version,
                level: info.level,
                geometry: info.geometry,
                chunk_size: info.chunk_size,
                original_length: info.original_length,
            },
            chunks,
        })
    }

    /// Peeks into a serialized record's header and chunk framing without
    /// decoding any chunk body.
    pub fn peek_info(bytes: &[u8]) -> Result<RecordInfo, SjzipError> {
        if bytes.len() < HEADER_SIZE {
            return Err(SjzipError::RecordFormat(format!(
                "Record is too small to be valid. Minimum size: {}, got: {}",
                HEADER_SIZE,
                bytes.len()
            )));
        }

        let mut cursor = Cursor::new(bytes);
        let map_err = |e: std::io::Error| SjzipError::RecordFormat(e.to_string());

        let mut magic_buf = [0u8; 4];
        cursor.read_exact(&mut magic_buf).map_err(map_err)?;
        if magic_buf != *RECORD_MAGIC {
            return Err(SjzipError::RecordFormat(
                "Invalid record magic number".into(),
            ));
        }

        let mut u16_buf = [0u8; 2];
        cursor.read_exact(&mut u16_buf).map_err(map_err)?;
        let version = u16::from_le_bytes(u16_buf);
        if version != RECORD_FORMAT_VERSION {
            return Err(SjzipError::RecordFormat(format!(
                "Unsupported record version: expected {}, got {}",
                RECORD_FORMAT_VERSION, version
            )));
        }

        let mut u8x4 = [0u8; 4];
        cursor.read_exact(&mut u8x4).map_err(map_err)?;
        let level = OptimizationLevel::try_from(u8x4[0])
            .map_err(|e| SjzipError::RecordFormat(e.to_string()))?;
        let geometry = GeometryParams {
            quantizer_bits: u8x4[1],
            curve_order: u8x4[2],
            quaternion_bits: u8x4[3],
        };

        cursor.read_exact(&mut u16_buf).map_err(map_err)?;
        let chunk_size = u16::from_le_bytes(u16_buf);

        let mut u64_buf = [0u8; 8];
        cursor.read_exact(&mut u64_buf).map_err(map_err)?;
        let original_length = u64::from_le_bytes(u64_buf);

        let mut u32_buf = [0u8; 4];
        cursor.read_exact(&mut u32_buf).map_err(map_err)?;
        let chunk_count = u32::from_le_bytes(u32_buf) as usize;

        // SECURITY: Bound the count before allocating for it.
        if chunk_count > MAX_CHUNK_COUNT {
            return Err(SjzipError::TooManyChunks {
                count: chunk_count,
                max: MAX_CHUNK_COUNT,
            });
        }
        let remaining = bytes.len() - HEADER_SIZE;
        if chunk_count.saturating_mul(CHUNK_FRAME_SIZE) > remaining {
            return Err(SjzipError::RecordFormat(format!(
                "{} chunks cannot fit in {} bytes",
                chunk_count, remaining
            )));
        }

        let mut chunks = Vec::with_capacity(chunk_count);
        let mut data_size = 0usize;
        for i in 0..chunk_count {
            cursor.read_exact(&mut u16_buf).map_err(map_err)?;
            let length = u16::from_le_bytes(u16_buf);
            let mut tag = [0u8; 1];
            cursor.read_exact(&mut tag).map_err(map_err)?;
            cursor.read_exact(&mut u32_buf).map_err(map_err)?;
            let body_size = u32::from_le_bytes(u32_buf) as usize;

            if body_size > MAX_PAYLOAD_BYTES {
                return Err(SjzipError::PayloadTooLarge {
                    size: body_size,
                    max: MAX_PAYLOAD_BYTES,
                });
            }
            let body_end = cursor.position() as usize + body_size;
            if body_end > bytes.len() {
                return Err(SjzipError::RecordFormat(format!(
                    "chunk {} body of {} bytes exceeds the record",
                    i, body_size
                )));
            }
            cursor.set_position(body_end as u64);

            data_size += CHUNK_FRAME_SIZE + body_size;
            chunks.push(ChunkInfo {
                length,
                tag: tag[0],
                body_size,
            });
        }

        if HEADER_SIZE + data_size != bytes.len() {
            return Err(SjzipError::RecordFormat(format!(
                "{} trailing bytes after the last chunk",
                bytes.len() - HEADER_SIZE - data_size
            )));
        }

        Ok(RecordInfo {
            format_version: version,
            level,
            geometry,
            chunk_size,
            original_length,
            chunks,
            header_size: HEADER_SIZE,
            data_size,
        })
    }
}

//==================================================================================
// Private Helpers
//==================================================================================

fn write_permutation(perm: &[u16], buf: &mut Vec<u8>) -> Result<(), SjzipError> {
    for &p in perm {
        leb128::encode_one(p as u32, buf)?;
    }
    Ok(())
}

fn read_permutation(cursor: &mut Cursor<&[u8]>, n: usize) -> Result<Vec<u16>, SjzipError> {
    leb128::decode::<u32>(cursor, n)?
        .into_iter()
        .map(|p| {
            u16::try_from(p).map_err(|_| {
                SjzipError::RecordFormat(format!("permutation entry {} exceeds u16", p))
            })
        })
        .collect()
}

fn write_quantized(p: &QuantizedPoint, buf: &mut Vec<u8>) -> Result<(), SjzipError> {
    leb128::encode(&p.to_array(), buf)
}

fn read_quantized(cursor: &mut Cursor<&[u8]>) -> Result<QuantizedPoint, SjzipError> {
    Ok(QuantizedPoint::new(
        leb128::decode_one(cursor)?,
        leb128::decode_one(cursor)?,
        leb128::decode_one(cursor)?,
    ))
}

fn write_body(body: &ChunkBody, buf: &mut Vec<u8>) -> Result<(), SjzipError> {
    match body {
        ChunkBody::Absolute(points) => {
            for p in points {
                for c in p.to_array() {
                    buf.extend_from_slice(&c.to_le_bytes());
                }
            }
        }
        ChunkBody::CurveOrdered {
            permutation,
            curve_indices,
        } => {
            write_permutation(permutation, buf)?;
            // Indices are ascending, so store the gaps.
            let mut prev = 0u64;
            for &index in curve_indices {
                let gap = index.checked_sub(prev).ok_or_else(|| {
                    SjzipError::InternalError("curve indices must be ascending".to_string())
                })?;
                leb128::encode_one(gap, buf)?;
                prev = index;
            }
        }
        ChunkBody::Quantized {
            permutation,
            points,
        } => {
            write_permutation(permutation, buf)?;
            for p in points {
                write_quantized(p, buf)?;
            }
        }
        ChunkBody::RotationDelta { permutation, steps } => {
            write_permutation(permutation, buf)?;
            for step in steps {
                match step {
                    DeltaStep::Absolute(p) => {
                        buf.push(DeltaStep::TAG_ABSOLUTE);
                        write_quantized(p, buf)?;
                    }
                    DeltaStep::Delta(q) => {
                        buf.push(DeltaStep::TAG_DELTA);
                        for c in [q.x, q.y, q.z] {
                            zigzag::encode_leb128(c, buf)?;
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

fn read_body(tag: u8, n: usize, bytes: &[u8]) -> Result<ChunkBody, SjzipError> {
    let mut cursor = Cursor::new(bytes);
    let body = match tag {
        ChunkBody::TAG_ABSOLUTE => {
            if bytes.len() != n * 24 {
                return Err(SjzipError::RecordFormat(format!(
                    "absolute body of {} points must be {} bytes, got {}",
                    n,
                    n * 24,
                    bytes.len()
                )));
            }
            let points = bytes
                .chunks_exact(24)
                .enumerate()
                .map(|(position, triple)| {
                    let mut coords = [0.0f64; 3];
                    for (coord, raw) in coords.iter_mut().zip(triple.chunks_exact(8)) {
                        let mut b = [0u8; 8];
                        b.copy_from_slice(raw);
                        *coord = f64::from_le_bytes(b);
                    }
                    // A stored point outside the cube is corruption, not bad input.
                    Point::from_array(coords).map_err(|e| SjzipError::CorruptPacket {
                        position,
                        reason: e.to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            cursor.set_position(bytes.len() as u64);
            ChunkBody::Absolute(points)
        }
        ChunkBody::TAG_CURVE_ORDERED => {
            let permutation = read_permutation(&mut cursor, n)?;
            let mut curve_indices = Vec::with_capacity(n);
            let mut prev = 0u64;
            for _ in 0..n {
                let gap: u64 = leb128::decode_one(&mut cursor)?;
                prev = prev.checked_add(gap).ok_or_else(|| {
                    SjzipError::RecordFormat("curve index overflows u64".to_string())
                })?;
                curve_indices.push(prev);
            }
            ChunkBody::CurveOrdered {
                permutation,
                curve_indices,
            }
        }
        ChunkBody::TAG_QUANTIZED => {
            let permutation = read_permutation(&mut cursor, n)?;
            let points = (0..n)
                .map(|_| read_quantized(&mut cursor))
                .collect::<Result<Vec<_>, _>>()?;
            ChunkBody::Quantized {
                permutation,
                points,
            }
        }
        ChunkBody::TAG_ROTATION_DELTA => {
            let permutation = read_permutation(&mut cursor, n)?;
            let mut steps = Vec::with_capacity(n);
            for _ in 0..n {
                let mut step_tag = [0u8; 1];
                cursor
                    .read_exact(&mut step_tag)
                    .map_err(|e| SjzipError::RecordFormat(e.to_string()))?;
                let step = match step_tag[0] {
                    DeltaStep::TAG_ABSOLUTE => DeltaStep::Absolute(read_quantized(&mut cursor)?),
                    DeltaStep::TAG_DELTA => DeltaStep::Delta(QuantizedQuaternion {
                        x: zigzag::decode_leb128::<u32>(&mut cursor)?,
                        y: zigzag::decode_leb128::<u32>(&mut cursor)?,
                        z: zigzag::decode_leb128::<u32>(&mut cursor)?,
                    }),
                    other => {
                        return Err(SjzipError::RecordFormat(format!(
                            "unknown rotation step tag {}",
                            other
                        )))
                    }
                };
                steps.push(step);
            }
            ChunkBody::RotationDelta { permutation, steps }
        }
        other => {
            return Err(SjzipError::RecordFormat(format!(
                "unknown chunk body tag {}",
                other
            )))
        }
    };

    if cursor.position() as usize != bytes.len() {
        return Err(SjzipError::RecordFormat(
            "Did not consume entire chunk body. Trailing bytes detected.".to_string(),
        ));
    }
    Ok(body)
}

//==================================================================================
// Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk_pipeline::orchestrator::encode_text;
    use crate::config::CodecConfig;

    fn create_test_record(level: OptimizationLevel) -> Record {
        let config = CodecConfig {
            chunk_size: 16,
            ..CodecConfig::default()
        };
        encode_text("Hello, World! 안녕하세요 — sjzip record test\n", level, &config, None).unwrap()
    }

    #[test]
    fn test_artifact_roundtrip_is_successful_at_every_level() {
        for level in OptimizationLevel::ALL {
            let original = create_test_record(level);
            let bytes = original.to_bytes().unwrap();
            let reconstructed = Record::from_bytes(&bytes).unwrap();
            assert_eq!(original, reconstructed, "level {}", level);
        }
    }

    #[test]
    fn test_to_bytes_is_deterministic() {
        let a = create_test_record(OptimizationLevel::RotationDelta).to_bytes().unwrap();
        let b = create_test_record(OptimizationLevel::RotationDelta).to_bytes().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_peek_info_is_correct() {
        let record = create_test_record(OptimizationLevel::Quantized);
        let bytes = record.to_bytes().unwrap();
        let info = Record::peek_info(&bytes).unwrap();

        assert_eq!(info.format_version, RECORD_FORMAT_VERSION);
        assert_eq!(info.level, OptimizationLevel::Quantized);
        assert_eq!(info.chunk_size, 16);
        assert_eq!(info.original_length, record.header.original_length);
        assert_eq!(info.chunk_count(), record.chunk_count());
        assert_eq!(info.total_size(), bytes.len());
        assert!(info
            .chunks
            .iter()
            .all(|c| c.tag == ChunkBody::TAG_QUANTIZED));
    }

    #[test]
    fn test_parsing_errors_are_handled_gracefully() {
        // Too short
        assert!(matches!(
            Record::peek_info(b"short"),
            Err(SjzipError::RecordFormat(_))
        ));

        // Bad magic number
        assert!(matches!(
            Record::peek_info(b"BAD_MAGIC_and_the_rest_is_long_enough"),
            Err(SjzipError::RecordFormat(_))
        ));

        // Bad version
        let mut bytes = create_test_record(OptimizationLevel::Mapping).to_bytes().unwrap();
        bytes[4] = 0xFF;
        bytes[5] = 0xFF;
        assert!(matches!(
            Record::peek_info(&bytes),
            Err(SjzipError::RecordFormat(_))
        ));

        // Truncated
        let bytes = create_test_record(OptimizationLevel::Mapping).to_bytes().unwrap();
        assert!(Record::from_bytes(&bytes[..bytes.len() - 1]).is_err());

        // Trailing bytes
        let mut bytes = create_test_record(OptimizationLevel::Mapping).to_bytes().unwrap();
        bytes.push(0);
        assert!(matches!(
            Record::peek_info(&bytes),
            Err(SjzipError::RecordFormat(_))
        ));
    }

    #[test]
    fn test_malformed_framing_is_rejected() {
        let bytes = create_test_record(OptimizationLevel::CurveOrdered).to_bytes().unwrap();

        // Unknown level
        let mut bad_level = bytes.clone();
        bad_level[6] = 9;
        assert!(matches!(
            Record::peek_info(&bad_level),
            Err(SjzipError::RecordFormat(_))
        ));

        // Oversized body length on the first chunk.
        let mut huge = bytes.clone();
        let at = HEADER_SIZE + 3;
        huge[at..at + 4].copy_from_slice(&(MAX_PAYLOAD_BYTES as u32 + 1).to_le_bytes());
        assert!(matches!(
            Record::peek_info(&huge),
            Err(SjzipError::PayloadTooLarge { .. })
        ));

        // Unknown body tag
        let mut bad_tag = bytes.clone();
        bad_tag[HEADER_SIZE + 2] = 42;
        assert!(matches!(
            Record::from_bytes(&bad_tag),
            Err(SjzipError::RecordFormat(_))
        ));

        // Absurd chunk count
        let mut count = bytes;
        count[20..24].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            Record::peek_info(&count),
            Err(SjzipError::TooManyChunks { .. })
        ));
    }

    #[test]
    fn test_stored_point_outside_cube_is_corrupt_packet() {
        let record = create_test_record(OptimizationLevel::Mapping);
        let mut bytes = record.to_bytes().unwrap();
        // Second point of the first chunk, y axis.
        let at = HEADER_SIZE + CHUNK_FRAME_SIZE + 24 + 8;
        bytes[at..at + 8].copy_from_slice(&1.5f64.to_le_bytes());

        let err = Record::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, SjzipError::CorruptPacket { position: 1, .. }));
        assert_eq!(err.kind(), crate::error::ErrorKind::Mapping);
    }

    #[test]
    fn test_empty_record_is_header_only() {
        let record = encode_text("", OptimizationLevel::RotationDelta, &CodecConfig::default(), None)
            .unwrap();
        let bytes = record.to_bytes().unwrap();
        assert_eq!(bytes.len(), HEADER_SIZE);
        assert_eq!(Record::from_bytes(&bytes).unwrap(), record);
    }
}
