//! Three-dimensional Hilbert curve ordering.
//!
//! Points are snapped to a `2^order` grid per axis and mapped to their distance
//! along a Hilbert curve using Skilling's transpose algorithm ("Programming the
//! Hilbert curve", AIP Conf. Proc. 707, 2004). Sorting by that distance keeps
//! spatially close points, and therefore identical characters, next to each
//! other, which is what the later stages exploit.

use crate::error::SjzipError;
use crate::kernels::permutation;
use crate::types::Point;

const DIMS: usize = 3;
pub const MIN_ORDER: u8 = 1;
/// `3 * 21 = 63` bits, the most a `u64` curve index can hold.
pub const MAX_ORDER: u8 = 21;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HilbertCurve {
    order: u8,
    max_cell: u32,
}

impl HilbertCurve {
    pub fn new(order: u8) -> Result<Self, SjzipError> {
        if !(MIN_ORDER..=MAX_ORDER).contains(&order) {
            return Err(SjzipError::InvalidConfig(format!(
                "curve_order must be in {}..={}, got {}",
                MIN_ORDER, MAX_ORDER, order
            )));
        }
        Ok(Self {
            order,
            max_cell: (1u32 << order) - 1,
        })
    }

    pub fn order(&self) -> u8 {
        self.order
    }

    /// The distance between neighbouring grid cells along one axis.
    pub fn resolution(&self) -> f64 {
        1.0 / self.max_cell as f64
    }

    /// One past the largest valid curve index.
    pub fn index_count(&self) -> u64 {
        1u64 << (DIMS as u32 * self.order as u32)
    }

    fn cell_of(&self, c: f64) -> u32 {
        // `Point` guarantees `c` in [0, 1], so the product is in [0, max_cell].
        (c * self.max_cell as f64).round() as u32
    }

    pub fn index_of(&self, point: &Point) -> u64 {
        let mut axes = point.to_array().map(|c| self.cell_of(c));
        axes_to_transpose(&mut axes, self.order);
        interleave(&axes, self.order)
    }

    /// The centre of the grid cell at `index`.
    pub fn point_of(&self, index: u64) -> Result<Point, SjzipError> {
        if index >= self.index_count() {
            return Err(SjzipError::RecordFormat(format!(
                "curve index {} exceeds the range of an order-{} curve",
                index, self.order
            )));
        }
        let mut axes = deinterleave(index, self.order);
        transpose_to_axes(&mut axes, self.order);
        let scale = self.max_cell as f64;
        Point::from_array(axes.map(|cell| cell as f64 / scale))
    }

    /// Sorts `points` by curve index, breaking ties by original position.
    /// Returns the sorted curve indices and the permutation whose i-th entry is
    /// the original position of the i-th sorted point.
    pub fn encode_order(&self, points: &[Point]) -> Result<(Vec<u64>, Vec<u16>), SjzipError> {
        if points.len() > u16::MAX as usize + 1 {
            return Err(SjzipError::ChunkTooLarge {
                len: points.len(),
                max: u16::MAX as usize + 1,
            });
        }
        let mut keyed: Vec<(u64, u16)> = points
            .iter()
            .enumerate()
            .map(|(pos, p)| (self.index_of(p), pos as u16))
            .collect();
        keyed.sort_unstable();
        Ok(keyed.into_iter().unzip())
    }

    /// Rebuilds cell-centre points from sorted curve indices and restores their
    /// original order.
    pub fn decode_order(&self, indices: &[u64], perm: &[u16]) -> Result<Vec<Point>, SjzipError> {
        let sorted = indices
            .iter()
            .map(|&i| self.point_of(i))
            .collect::<Result<Vec<_>, _>>()?;
        permutation::restore(&sorted, perm)
    }
}

//==================================================================================
// Skilling's transform
//==================================================================================

fn axes_to_transpose(x: &mut [u32; DIMS], order: u8) {
    let m = 1u32 << (order - 1);

    // Inverse undo
    let mut q = m;
    while q > 1 {
        let p = q - 1;
        for i in 0..DIMS {
            if x[i] & q != 0 {
                x[0] ^= p;
            } else {
                let t = (x[0] ^ x[i]) & p;
                x[0] ^= t;
                x[i] ^= t;
            }
        }
        q >>= 1;
    }

    // Gray encode
    for i in 1..DIMS {
        x[i] ^= x[i - 1];
    }
    let mut t = 0;
    let mut q = m;
    while q > 1 {
        if x[DIMS - 1] & q != 0 {
            t ^= q - 1;
        }
        q >>= 1;
    }
    for v in x.iter_mut() {
        *v ^= t;
    }
}

fn transpose_to_axes(x: &mut [u32; DIMS], order: u8) {
    let n = 2u32 << (order - 1);

    // Gray decode
    let t = x[DIMS - 1] >> 1;
    for i in (1..DIMS).rev() {
        x[i] ^= x[i - 1];
    }
    x[0] ^= t;

    // Undo excess work
    let mut q = 2;
    while q != n {
        let p = q - 1;
        for i in (0..DIMS).rev() {
            if x[i] & q != 0 {
                x[0] ^= p;
            } else {
                let t = (x[0] ^ x[i]) & p;
                x[0] ^= t;
                x[i] ^= t;
            }
        }
        q <<= 1;
    }
}

/// Packs the transposed form into one integer, most significant bit first.
fn interleave(x: &[u32; DIMS], order: u8) -> u64 {
    let mut h = 0u64;
    for bit in (0..order).rev() {
        for &v in x {
            h = (h << 1) | ((v >> bit) & 1) as u64;
        }
    }
    h
}

fn deinterleave(h: u64, order: u8) -> [u32; DIMS] {
    let mut x = [0u32; DIMS];
    let total = DIMS as u32 * order as u32;
    for k in 0..total {
        let bit = (h >> (total - 1 - k)) & 1;
        let axis = k as usize % DIMS;
        x[axis] = (x[axis] << 1) | bit as u32;
    }
    x
}
