//! Rotation-delta encoding of quantized point sequences.
//!
//! Every point is an offset from the cube centre. When the offset of a point
//! has (nearly) the same length as its predecessor's, the point can be stored
//! as the unit quaternion that rotates the predecessor onto it. The encoder only
//! chooses that form when replaying the exact decode arithmetic reproduces the
//! quantized point bit for bit and the encoded quaternion is strictly shorter
//! than the absolute coordinates. Otherwise the point is stored as-is.

use crate::error::SjzipError;
use crate::kernels::quantize::Quantizer;
use crate::kernels::{leb128, zigzag};
use crate::types::QuantizedPoint;

const CENTRE: f64 = 0.5;
/// Offsets shorter than this have no usable direction.
const MIN_OFFSET: f64 = 1e-12;

pub const MIN_QUATERNION_BITS: u8 = 2;
pub const MAX_QUATERNION_BITS: u8 = 24;

//==================================================================================
// 1. Quaternions
//==================================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Quaternion {
    pub const IDENTITY: Quaternion = Quaternion {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    fn norm(&self) -> f64 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    fn normalized(&self) -> Option<Quaternion> {
        let n = self.norm();
        if n < MIN_OFFSET || !n.is_finite() {
            return None;
        }
        Some(Quaternion {
            w: self.w / n,
            x: self.x / n,
            y: self.y / n,
            z: self.z / n,
        })
    }

    /// The shortest-arc rotation taking the direction of `from` onto the
    /// direction of `to`.
    pub fn between(from: [f64; 3], to: [f64; 3]) -> Option<Quaternion> {
        let a = unit(from)?;
        let b = unit(to)?;
        let d = dot(a, b);

        if d < -1.0 + 1e-12 {
            // Opposite directions: rotate half a turn about any perpendicular axis.
            let helper = if a[0].abs() < 0.9 {
                [1.0, 0.0, 0.0]
            } else {
                [0.0, 1.0, 0.0]
            };
            let axis = unit(cross(a, helper))?;
            return Some(Quaternion {
                w: 0.0,
                x: axis[0],
                y: axis[1],
                z: axis[2],
            });
        }

        let c = cross(a, b);
        Quaternion {
            w: 1.0 + d,
            x: c[0],
            y: c[1],
            z: c[2],
        }
        .normalized()
    }

    /// Rotates `v` by this (unit) quaternion.
    pub fn rotate(&self, v: [f64; 3]) -> [f64; 3] {
        // v' = v + 2w(u x v) + 2 u x (u x v)
        let u = [self.x, self.y, self.z];
        let uv = cross(u, v);
        let uuv = cross(u, uv);
        [
            v[0] + 2.0 * (self.w * uv[0] + uuv[0]),
            v[1] + 2.0 * (self.w * uv[1] + uuv[1]),
            v[2] + 2.0 * (self.w * uv[2] + uuv[2]),
        ]
    }
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn length(v: [f64; 3]) -> f64 {
    dot(v, v).sqrt()
}

fn unit(v: [f64; 3]) -> Option<[f64; 3]> {
    let n = length(v);
    (n >= MIN_OFFSET).then(|| v.map(|c| c / n))
}

//==================================================================================
// 2. Quantized Quaternions
//==================================================================================

/// The vector part of a unit quaternion with `w >= 0`, as signed integers.
/// `w` is reconstructed as `sqrt(1 - |v|^2)` on decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct QuantizedQuaternion {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl QuantizedQuaternion {
    pub const IDENTITY: QuantizedQuaternion = QuantizedQuaternion { x: 0, y: 0, z: 0 };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuaternionCodec {
    bits: u8,
    scale: i32,
}

impl QuaternionCodec {
    pub fn new(bits: u8) -> Result<Self, SjzipError> {
        if !(MIN_QUATERNION_BITS..=MAX_QUATERNION_BITS).contains(&bits) {
            return Err(SjzipError::InvalidConfig(format!(
                "quaternion_bits must be in {}..={}, got {}",
                MIN_QUATERNION_BITS, MAX_QUATERNION_BITS, bits
            )));
        }
        Ok(Self {
            bits,
            scale: (1i32 << (bits - 1)) - 1,
        })
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }

    /// Largest amount by which a well-formed vector part may exceed unit norm
    /// after rounding each component by up to half a step.
    fn norm_tolerance(&self) -> f64 {
        4.0 / self.scale as f64
    }

    pub fn quantize(&self, q: &Quaternion) -> QuantizedQuaternion {
        // q and -q are the same rotation; keep the one with w >= 0.
        let sign = if q.w < 0.0 { -1.0 } else { 1.0 };
        let s = self.scale as f64;
        let component = |c: f64| ((sign * c).clamp(-1.0, 1.0) * s).round() as i32;
        QuantizedQuaternion {
            x: component(q.x),
            y: component(q.y),
            z: component(q.z),
        }
    }

    pub fn dequantize(&self, q: &QuantizedQuaternion) -> Result<Quaternion, SjzipError> {
        let s = self.scale as f64;
        let (x, y, z) = (q.x as f64 / s, q.y as f64 / s, q.z as f64 / s);
        let norm_sq = x * x + y * y + z * z;
        if norm_sq > 1.0 + self.norm_tolerance() {
            return Err(SjzipError::QuaternionNorm { norm_sq });
        }
        let w = (1.0 - norm_sq).max(0.0).sqrt();
        Quaternion { w, x, y, z }
            .normalized()
            .ok_or(SjzipError::QuaternionNorm { norm_sq })
    }
}

//==================================================================================
// 3. Delta Steps
//==================================================================================

/// One entry of a rotation-delta sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaStep {
    Absolute(QuantizedPoint),
    /// Rotation of the previous point about the cube centre.
    Delta(QuantizedQuaternion),
}

impl DeltaStep {
    pub const TAG_ABSOLUTE: u8 = 0;
    pub const TAG_DELTA: u8 = 1;

    /// Encoded size in bytes: one tag byte plus the varint components.
    pub fn encoded_len(&self) -> usize {
        match self {
            DeltaStep::Absolute(p) => {
                1 + p.to_array().iter().map(|&c| leb128::encoded_len(c)).sum::<usize>()
            }
            DeltaStep::Delta(q) => {
                1 + [q.x, q.y, q.z]
                    .iter()
                    .map(|&c| zigzag::encoded_len(c))
                    .sum::<usize>()
            }
        }
    }
}

//==================================================================================
// 4. The Codec
//==================================================================================

#[derive(Debug, Clone, Copy)]
pub struct RotationDeltaCodec {
    quantizer: Quantizer,
    quaternions: QuaternionCodec,
}

impl RotationDeltaCodec {
    pub fn new(quantizer: Quantizer, quaternions: QuaternionCodec) -> Self {
        Self {
            quantizer,
            quaternions,
        }
    }

    fn offset(&self, p: &QuantizedPoint) -> Result<[f64; 3], SjzipError> {
        Ok(self.quantizer.dequantize(p)?.to_array().map(|c| c - CENTRE))
    }

    /// Rotates `prev` by `q` about the cube centre and re-quantizes the result.
    /// This is the only arithmetic used to rebuild a `Delta` step.
    pub fn apply(
        &self,
        prev: &QuantizedPoint,
        q: &QuantizedQuaternion,
    ) -> Result<QuantizedPoint, SjzipError> {
        let rotation = self.quaternions.dequantize(q)?;
        let rotated = rotation.rotate(self.offset(prev)?);
        let mut out = [0u32; 3];
        for (slot, v) in out.iter_mut().zip(rotated) {
            *slot = self.quantizer.quantize_value(v + CENTRE)?;
        }
        Ok(QuantizedPoint::from_array(out))
    }

    /// The quantized rotation from `prev` to `cur`, if one plausibly exists.
    fn derive(
        &self,
        prev: &QuantizedPoint,
        cur: &QuantizedPoint,
    ) -> Result<Option<QuantizedQuaternion>, SjzipError> {
        if prev == cur {
            return Ok(Some(QuantizedQuaternion::IDENTITY));
        }
        let a = self.offset(prev)?;
        let b = self.offset(cur)?;
        if (length(a) - length(b)).abs() > self.quantizer.resolution() {
            return Ok(None);
        }
        Ok(Quaternion::between(a, b).map(|q| self.quaternions.quantize(&q)))
    }

    fn choose(&self, prev: &QuantizedPoint, cur: &QuantizedPoint) -> Result<DeltaStep, SjzipError> {
        let absolute = DeltaStep::Absolute(*cur);
        let Some(q) = self.derive(prev, cur)? else {
            return Ok(absolute);
        };
        let delta = DeltaStep::Delta(q);
        if delta.encoded_len() >= absolute.encoded_len() {
            return Ok(absolute);
        }
        // Any failure to replay simply means the rotation is not usable.
        match self.apply(prev, &q) {
            Ok(replayed) if replayed == *cur => Ok(delta),
            _ => Ok(absolute),
        }
    }

    pub fn encode(&self, points: &[QuantizedPoint]) -> Result<Vec<DeltaStep>, SjzipError> {
        let mut steps = Vec::with_capacity(points.len());
        let mut prev: Option<&QuantizedPoint> = None;
        for cur in points {
            let step = match prev {
                None => DeltaStep::Absolute(*cur),
                Some(p) => self.choose(p, cur)?,
            };
            steps.push(step);
            prev = Some(cur);
        }
        Ok(steps)
    }

    pub fn decode(&self, steps: &[DeltaStep]) -> Result<Vec<QuantizedPoint>, SjzipError> {
        let mut points: Vec<QuantizedPoint> = Vec::with_capacity(steps.len());
        for (i, step) in steps.iter().enumerate() {
            let point = match (step, points.last()) {
                (DeltaStep::Absolute(p), _) => {
                    // Validates the range against the declared bit width.
                    self.quantizer.dequantize(p)?;
                    *p
                }
                (DeltaStep::Delta(q), Some(prev)) => self.apply(prev, q)?,
                (DeltaStep::Delta(_), None) => {
                    return Err(SjzipError::CorruptPacket {
                        position: i,
                        reason: "rotation delta sequence must start with an absolute point"
                            .to_string(),
                    })
                }
            };
            points.push(point);
        }
        Ok(points)
    }
}
