//! This module defines the canonical, validated coordinate types that flow
//! through every stage of the sjzip pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SjzipError;

/// One axis of the unit cube. Used to give coordinate errors a precise location.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
            Axis::Z => write!(f, "z"),
        }
    }
}

/// A point inside the closed unit cube `[0, 1]^3`.
///
/// The fields are private: the only way to obtain a `Point` is through
/// [`Point::new`], which rejects NaN and out-of-range coordinates instead of
/// clamping them. Deserialization goes through the same check, so every
/// `Point` in the system is known to be valid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPoint")]
pub struct Point {
    x: f64,
    y: f64,
    z: f64,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64) -> Result<Self, SjzipError> {
        for (axis, value) in Axis::ALL.into_iter().zip([x, y, z]) {
            // `contains` is false for NaN, so NaN is rejected here too.
            if !(0.0..=1.0).contains(&value) {
                return Err(SjzipError::CoordinateOutOfRange { axis, value });
            }
        }
        Ok(Self { x, y, z })
    }

    pub fn from_array(coords: [f64; 3]) -> Result<Self, SjzipError> {
        Self::new(coords[0], coords[1], coords[2])
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn z(&self) -> f64 {
        self.z
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// The largest per-axis absolute difference between two points.
    pub fn chebyshev_distance(&self, other: &Point) -> f64 {
        (self.x - other.x)
            .abs()
            .max((self.y - other.y).abs())
            .max((self.z - other.z).abs())
    }

    /// Bit-exact equality, used where two computations must agree exactly.
    pub fn bits_eq(&self, other: &Point) -> bool {
        self.x.to_bits() == other.x.to_bits()
            && self.y.to_bits() == other.y.to_bits()
            && self.z.to_bits() == other.z.to_bits()
    }
}

/// The unchecked wire shape of a `Point`.
#[derive(Deserialize)]
struct RawPoint {
    x: f64,
    y: f64,
    z: f64,
}

impl TryFrom<RawPoint> for Point {
    type Error = SjzipError;

    fn try_from(raw: RawPoint) -> Result<Self, Self::Error> {
        Point::new(raw.x, raw.y, raw.z)
    }
}

/// A point after integer quantization. Components are bounded by the
/// quantizer's declared bit width, which is enforced by the quantizer.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct QuantizedPoint {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl QuantizedPoint {
    pub fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    pub fn to_array(&self) -> [u32; 3] {
        [self.x, self.y, self.z]
    }

    pub fn from_array(coords: [u32; 3]) -> Self {
        Self::new(coords[0], coords[1], coords[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_accepts_closed_unit_interval() {
        let p = Point::new(0.0, 1.0, 0.5).unwrap();
        assert_eq!(p.to_array(), [0.0, 1.0, 0.5]);
    }

    #[test]
    fn test_point_rejects_out_of_range_without_clamping() {
        let err = Point::new(0.5, 1.0000001, 0.5).unwrap_err();
        assert!(matches!(
            err,
            SjzipError::CoordinateOutOfRange { axis: Axis::Y, .. }
        ));

        let err = Point::new(-0.0001, 0.5, 0.5).unwrap_err();
        assert!(matches!(
            err,
            SjzipError::CoordinateOutOfRange { axis: Axis::X, .. }
        ));
    }

    #[test]
    fn test_point_rejects_nan() {
        assert!(Point::new(0.5, 0.5, f64::NAN).is_err());
    }

    #[test]
    fn test_chebyshev_distance() {
        let a = Point::new(0.1, 0.2, 0.3).unwrap();
        let b = Point::new(0.1, 0.25, 0.28).unwrap();
        assert!((a.chebyshev_distance(&b) - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_point_json_round_trip() {
        let p = Point::new(0.125, 1.0, 0.333_333_333_333_333_3).unwrap();
        let json = serde_json::to_string(&p).unwrap();
        let back: Point = serde_json::from_str(&json).unwrap();
        assert!(back.bits_eq(&p));
    }

    #[test]
    fn test_point_deserialization_is_validated() {
        let err = serde_json::from_str::<Point>(r#"{"x":0.5,"y":1.5,"z":0.5}"#).unwrap_err();
        assert!(err.to_string().contains("outside [0, 1]"));
        assert!(serde_json::from_str::<Point>(r#"{"x":-0.1,"y":0.5,"z":0.5}"#).is_err());
        assert!(serde_json::from_str::<Point>(r#"{"x":0.5,"y":0.5}"#).is_err());
    }
}
