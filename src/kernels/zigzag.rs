//! This module contains the pure, stateless kernels for Zig-zag encoding and
//! decoding.
//!
//! Zig-zag is a lossless, bitwise mapping of signed integers to unsigned
//! integers that keeps small magnitudes small (`0, -1, 1, -2, ...` become
//! `0, 1, 2, 3, ...`), so signed quaternion components stay cheap under LEB128.

use num_traits::{PrimInt, Signed, Unsigned};
use std::io::Cursor;
use std::ops::Neg;

use crate::error::SjzipError;
use crate::kernels::leb128;
use crate::traits::{HasSigned, HasUnsigned};

//==================================================================================
// 1. Generic Core Logic
//==================================================================================

/// Encodes a single signed integer using the Zig-zag algorithm.
pub fn encode_val<T>(n: T) -> T::Unsigned
where
    T: PrimInt + Signed + HasUnsigned,
{
    let bits = std::mem::size_of::<T>() * 8;
    // `>>` on a signed `PrimInt` is arithmetic, which the formula relies on.
    ((n << 1) ^ (n >> (bits - 1))).to_unsigned_bits()
}

/// Decodes a single unsigned integer back to its signed representation.
pub fn decode_val<U>(n: U) -> U::Signed
where
    U: PrimInt + Unsigned + HasSigned,
    U::Signed: PrimInt + Neg<Output = U::Signed>,
{
    // The formula is (n >> 1) ^ -(n & 1)
    let shifted = (n >> 1).to_signed_bits();
    let lsb = (n & U::one()).to_signed_bits();
    shifted ^ (-lsb)
}

//==================================================================================
// 2. Zig-zag + LEB128
//==================================================================================

/// Writes a signed integer as a zig-zagged LEB128 varint.
pub fn encode_leb128<T>(value: T, buffer: &mut Vec<u8>) -> Result<(), SjzipError>
where
    T: PrimInt + Signed + HasUnsigned,
    T::Unsigned: PrimInt + Unsigned,
{
    leb128::encode_one(encode_val(value), buffer)
}

/// Reads a signed integer written by [`encode_leb128`].
pub fn decode_leb128<U>(cursor: &mut Cursor<&[u8]>) -> Result<U::Signed, SjzipError>
where
    U: PrimInt + Unsigned + HasSigned,
    U::Signed: PrimInt + Neg<Output = U::Signed>,
{
    leb128::decode_one::<U>(cursor).map(decode_val)
}

/// The number of bytes [`encode_leb128`] writes for `value`.
pub fn encoded_len<T>(value: T) -> usize
where
    T: PrimInt + Signed + HasUnsigned,
    T::Unsigned: PrimInt + Unsigned,
{
    leb128::encoded_len(encode_val(value))
}

//==================================================================================
// 3. Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zigzag_core_logic_i32() {
        assert_eq!(encode_val(0i32), 0u32);
        assert_eq!(encode_val(-1i32), 1u32);
        assert_eq!(encode_val(1i32), 2u32);
        assert_eq!(encode_val(i32::MIN), u32::MAX);

        assert_eq!(decode_val(0u32), 0i32);
        assert_eq!(decode_val(1u32), -1i32);
        assert_eq!(decode_val(2u32), 1i32);
        assert_eq!(decode_val(u32::MAX), i32::MIN);
    }

    #[test]
    fn test_zigzag_leb128_roundtrip_i32() {
        let original: Vec<i32> = vec![-5, 4, -3, 2, -1, 0, 32_767, -32_767, i32::MAX, i32::MIN];
        let mut bytes = Vec::new();
        for &v in &original {
            encode_leb128(v, &mut bytes).unwrap();
        }

        let mut cursor = Cursor::new(bytes.as_slice());
        let decoded: Vec<i32> = (0..original.len())
            .map(|_| decode_leb128::<u32>(&mut cursor).unwrap())
            .collect();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_small_magnitudes_take_one_byte() {
        assert_eq!(encoded_len(-64i32), 1);
        assert_eq!(encoded_len(63i32), 1);
        assert_eq!(encoded_len(64i32), 2);
    }
}
