//! This module contains the pure, stateless kernels for LEB128 (Little-Endian
//! Base 128) variable-length integer encoding and decoding.
//!
//! Every integer field of a chunk body (permutations, curve-index gaps,
//! quantized coordinates, zig-zagged quaternion components) is written with
//! these kernels, so small values cost a single byte. It is fully panic-free.

use num_traits::{PrimInt, Unsigned};
use std::io::Cursor;

use crate::error::SjzipError;

//==================================================================================
// 1. Public API for Single-Value Operations
//==================================================================================

/// Encodes a single unsigned integer into a LEB128 byte sequence, writing to a buffer.
pub fn encode_one<T>(value: T, buffer: &mut Vec<u8>) -> Result<(), SjzipError>
where
    T: PrimInt + Unsigned,
{
    let zero = T::zero();
    let seven_bit_mask = T::from(0x7F).ok_or_else(|| {
        SjzipError::Leb128DecodeError("Failed to create 7-bit mask for type".to_string())
    })?;

    let mut current_value = value;
    loop {
        let payload = (current_value & seven_bit_mask).to_u8().ok_or_else(|| {
            SjzipError::Leb128DecodeError("Failed to convert generic integer to u8".to_string())
        })?;
        current_value = current_value >> 7;

        if current_value == zero {
            buffer.push(payload);
            return Ok(());
        }
        buffer.push(payload | 0x80);
    }
}

/// Decodes a single unsigned integer from a LEB128 byte stream cursor.
pub fn decode_one<T>(cursor: &mut Cursor<&[u8]>) -> Result<T, SjzipError>
where
    T: PrimInt + Unsigned,
{
    let mut result = T::zero();
    let mut shift = 0;
    let total_bits = std::mem::size_of::<T>() * 8;

    loop {
        let pos = cursor.position() as usize;
        let byte = *cursor.get_ref().get(pos).ok_or_else(|| {
            SjzipError::Leb128DecodeError("Unexpected end of buffer".to_string())
        })?;
        cursor.set_position((pos + 1) as u64);

        // Check if adding these 7 bits would overflow the type's capacity.
        if shift >= total_bits {
            return Err(SjzipError::Leb128DecodeError(
                "Integer overflow during decoding".to_string(),
            ));
        }

        let seven_bit_payload = T::from(byte & 0x7F).ok_or_else(|| {
            SjzipError::Leb128DecodeError("Failed to create 7-bit payload from byte".to_string())
        })?;
        result = result | (seven_bit_payload << shift);

        if byte & 0x80 == 0 {
            // The last byte must not carry bits beyond the type's width.
            if shift + 7 > total_bits && (byte >> (total_bits - shift)) > 0 {
                return Err(SjzipError::Leb128DecodeError(
                    "Integer overflow during decoding".to_string(),
                ));
            }
            return Ok(result);
        }

        shift += 7;
    }
}

/// The number of bytes `encode_one` writes for `value`.
pub fn encoded_len<T>(value: T) -> usize
where
    T: PrimInt + Unsigned,
{
    let bits = std::mem::size_of::<T>() * 8 - value.leading_zeros() as usize;
    bits.div_ceil(7).max(1)
}

//==================================================================================
// 2. Public API for Slice Operations
//==================================================================================

/// Appends every value of `input_slice` to `output_buf`.
pub fn encode<T>(input_slice: &[T], output_buf: &mut Vec<u8>) -> Result<(), SjzipError>
where
    T: PrimInt + Unsigned,
{
    for &val in input_slice {
        encode_one(val, output_buf)?;
    }
    Ok(())
}

/// Reads exactly `num_values` values from `cursor`.
pub fn decode<T>(cursor: &mut Cursor<&[u8]>, num_values: usize) -> Result<Vec<T>, SjzipError>
where
    T: PrimInt + Unsigned,
{
    // A value takes at least one byte, so never reserve beyond what remains.
    let remaining = cursor.get_ref().len().saturating_sub(cursor.position() as usize);
    let mut values = Vec::with_capacity(num_values.min(remaining));
    for _ in 0..num_values {
        values.push(decode_one::<T>(cursor)?);
    }
    Ok(values)
}

//==================================================================================
// 3. Unit Tests
//==================================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leb128_roundtrip_u32() {
        let original: Vec<u32> = vec![0, 127, 128, 1000, u32::MAX];
        let mut encoded_bytes = Vec::new();
        encode(&original, &mut encoded_bytes).unwrap();

        let mut cursor = Cursor::new(encoded_bytes.as_slice());
        let decoded = decode::<u32>(&mut cursor, original.len()).unwrap();
        assert_eq!(decoded, original);
        assert_eq!(cursor.position() as usize, encoded_bytes.len());
    }

    #[test]
    fn test_known_encoding() {
        let mut buf = Vec::new();
        encode_one(624485u64, &mut buf).unwrap();
        assert_eq!(buf, vec![0xE5, 0x8E, 0x26]);
    }

    #[test]
    fn test_encoded_len_matches_encoder() {
        for value in [0u64, 1, 127, 128, 16_383, 16_384, u32::MAX as u64, u64::MAX] {
            let mut buf = Vec::new();
            encode_one(value, &mut buf).unwrap();
            assert_eq!(encoded_len(value), buf.len(), "value {}", value);
        }
    }

    #[test]
    fn test_decode_truncated_buffer() {
        let bytes = [0xE5u8, 0x8E];
        let mut cursor = Cursor::new(&bytes[..]);
        let err = decode_one::<u64>(&mut cursor).unwrap_err();
        assert!(err.to_string().contains("Unexpected end of buffer"));
    }

    #[test]
    fn test_decode_overflow_error() {
        // This represents a value larger than u64::MAX
        let bytes = [0xFFu8, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F];
        let mut cursor = Cursor::new(&bytes[..]);
        let result = decode_one::<u64>(&mut cursor);
        if let Err(SjzipError::Leb128DecodeError(msg)) = result {
            assert!(msg.contains("overflow"));
        } else {
            panic!("Expected Leb128DecodeError");
        }
    }
}
