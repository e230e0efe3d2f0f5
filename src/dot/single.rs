//! Single-DOT aggregation: a short chunk packed into one point.
//!
//! The chunk's alphabet indices are read as base-N digits. Each axis holds `k`
//! consecutive digits as an integer `v < N^k <= 2^53`, stored as `v / 2^53`,
//! which is exact in an `f64`. The length is not recoverable from the point
//! (trailing NUL characters are indistinguishable from padding), so the inverse
//! takes it as a parameter.

use serde::{Deserialize, Serialize};

use crate::error::SjzipError;
use crate::space::Alphabet;
use crate::types::{Axis, Point};

/// `2^53`, the largest power of two below which every integer is an exact `f64`.
const MANTISSA_SPAN: u64 = 1 << 53;

/// The number of base-`radix` digits that fit exactly in one axis.
fn digits_per_axis(radix: u64) -> Result<usize, SjzipError> {
    if radix < 2 {
        return Err(SjzipError::InternalError(format!(
            "single-DOT packing needs a radix of at least 2, got {}",
            radix
        )));
    }
    let mut k = 0;
    let mut span: u64 = 1;
    while let Some(next) = span.checked_mul(radix) {
        if next > MANTISSA_SPAN {
            break;
        }
        span = next;
        k += 1;
    }
    Ok(k)
}

/// The longest chunk a single DOT can hold.
pub fn single_dot_capacity() -> Result<usize, SjzipError> {
    Ok(3 * digits_per_axis(Alphabet::global().len() as u64)?)
}

pub fn to_single_dot(chunk: &str) -> Result<Point, SjzipError> {
    let alphabet = Alphabet::global();
    let radix = alphabet.len() as u64;
    let k = digits_per_axis(radix)?;

    let indices = alphabet.indices_of(chunk)?;
    if indices.len() > 3 * k {
        return Err(SjzipError::AggregationOverflow {
            length: indices.len(),
            capacity: 3 * k,
        });
    }

    let mut coords = [0.0f64; 3];
    for (axis, coord) in coords.iter_mut().enumerate() {
        let mut v: u64 = 0;
        for j in 0..k {
            let digit = indices.get(axis * k + j).copied().unwrap_or(0) as u64;
            v = v * radix + digit;
        }
        *coord = v as f64 / MANTISSA_SPAN as f64;
    }
    Point::from_array(coords)
}

pub fn from_single_dot(point: &Point, length: usize) -> Result<String, SjzipError> {
    let alphabet = Alphabet::global();
    let radix = alphabet.len() as u64;
    let k = digits_per_axis(radix)?;
    if length > 3 * k {
        return Err(SjzipError::AggregationOverflow {
            length,
            capacity: 3 * k,
        });
    }
    let limit = radix.pow(k as u32);

    let mut indices = Vec::with_capacity(3 * k);
    for (axis, value) in Axis::ALL.into_iter().zip(point.to_array()) {
        let scaled = value * MANTISSA_SPAN as f64;
        if scaled.fract() != 0.0 || scaled >= limit as f64 {
            return Err(SjzipError::CorruptPacket {
                position: axis as usize * k,
                reason: format!("{} axis value {} is not a packed digit group", axis, value),
            });
        }

        let mut v = scaled as u64;
        let mut digits = vec![0usize; k];
        for slot in digits.iter_mut().rev() {
            *slot = (v % radix) as usize;
            v /= radix;
        }
        indices.extend(digits);
    }

    // Digits past the declared length must be padding.
    if let Some(extra) = indices[length..].iter().position(|&d| d != 0) {
        return Err(SjzipError::CorruptPacket {
            position: length + extra,
            reason: "non-zero digit beyond the declared length".to_string(),
        });
    }

    indices[..length]
        .iter()
        .map(|&i| alphabet.char_of(i))
        .collect()
}

/// A packed chunk together with the length its inverse needs.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct SingleDot {
    pub length: u16,
    pub point: Point,
}

impl SingleDot {
    pub fn pack(chunk: &str) -> Result<Self, SjzipError> {
        let point = to_single_dot(chunk)?;
        Ok(Self {
            // to_single_dot bounds the length by the capacity.
            length: chunk.chars().count() as u16,
            point,
        })
    }

    pub fn unpack(&self) -> Result<String, SjzipError> {
        from_single_dot(&self.point, self.length as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_for_builtin_alphabet() {
        assert_eq!(digits_per_axis(250).unwrap(), 6);
        assert_eq!(digits_per_axis(2).unwrap(), 53);
        assert_eq!(single_dot_capacity().unwrap(), 18);
    }

    #[test]
    fn test_degenerate_radix_is_an_error() {
        assert!(matches!(digits_per_axis(1), Err(SjzipError::InternalError(_))));
        assert!(matches!(digits_per_axis(0), Err(SjzipError::InternalError(_))));
    }

    #[test]
    fn test_single_dot_pack_and_unpack() {
        let dot = SingleDot::pack("ab\0").unwrap();
        assert_eq!(dot.length, 3);
        assert_eq!(dot.unpack().unwrap(), "ab\0");
    }

    #[test]
    fn test_round_trip_up_to_capacity() {
        for text in ["", "a", "Hello, World!", "안녕하세요 ‘hi’ ™", "exactly18chars!!!!"] {
            let n = text.chars().count();
            let point = to_single_dot(text).unwrap();
            assert_eq!(from_single_dot(&point, n).unwrap(), text);
        }
    }

    #[test]
    fn test_trailing_nul_needs_explicit_length() {
        let point = to_single_dot("ab\0").unwrap();
        assert_eq!(point, to_single_dot("ab").unwrap());
        assert_eq!(from_single_dot(&point, 3).unwrap(), "ab\0");
        assert_eq!(from_single_dot(&point, 2).unwrap(), "ab");
    }

    #[test]
    fn test_overflow_is_rejected() {
        let text = "x".repeat(19);
        assert!(matches!(
            to_single_dot(&text),
            Err(SjzipError::AggregationOverflow { length: 19, capacity: 18 })
        ));
        let point = to_single_dot("x").unwrap();
        assert!(from_single_dot(&point, 19).is_err());
    }

    #[test]
    fn test_non_integral_axis_is_corrupt() {
        let point = Point::new(0.3, 0.0, 0.0).unwrap();
        assert!(matches!(
            from_single_dot(&point, 1),
            Err(SjzipError::CorruptPacket { position: 0, .. })
        ));
    }

    #[test]
    fn test_padding_must_be_zero() {
        let point = to_single_dot("abc").unwrap();
        assert!(matches!(
            from_single_dot(&point, 2),
            Err(SjzipError::CorruptPacket { position: 2, .. })
        ));
    }
}
