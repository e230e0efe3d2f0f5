//! Spatial fronts: disjoint z-slabs of the unit cube, one per character class.
//!
//! Each front owns a contiguous run of alphabet indices and a slab
//! `[z_lo, z_hi]`. Slabs are laid out bottom to top in index order, separated
//! by `FRONT_GAP`, and all share one uniform z-step so that every character in
//! the alphabet is the same distance from its neighbours along z.

use serde::Serialize;
use std::f64::consts::TAU;
use std::fmt;

use crate::error::SjzipError;
use crate::space::alphabet::{Alphabet, FrontRange};

/// Empty space kept below the first and above the last slab.
pub const Z_MARGIN: f64 = 0.02;
/// Empty space between two neighbouring slabs.
pub const FRONT_GAP: f64 = 0.02;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Front {
    /// NUL and printable ASCII.
    Base,
    Hangul,
    /// Whitespace controls and the remaining Latin, Greek, Hebrew and
    /// typographic symbols.
    Symbol,
}

impl fmt::Display for Front {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Front::Base => write!(f, "base"),
            Front::Hangul => write!(f, "hangul"),
            Front::Symbol => write!(f, "symbol"),
        }
    }
}

/// The region of the cube owned by one front.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrontSlab {
    pub front: Front,
    /// First alphabet index of the front.
    pub start: usize,
    /// Number of characters in the front.
    pub len: usize,
    pub z_lo: f64,
    pub z_hi: f64,
    /// Angular offset of the front's spiral, so neighbouring fronts do not
    /// start at the same bearing.
    pub phase: f64,
}

impl FrontSlab {
    pub fn contains_index(&self, index: usize) -> bool {
        index >= self.start && index < self.start + self.len
    }

    pub fn contains_z(&self, z: f64, tolerance: f64) -> bool {
        z >= self.z_lo - tolerance && z <= self.z_hi + tolerance
    }
}

#[derive(Debug, Clone)]
pub struct FrontAllocator {
    slabs: Vec<FrontSlab>,
    dz: f64,
}

impl FrontAllocator {
    pub fn new(alphabet: &Alphabet) -> Result<Self, SjzipError> {
        Self::from_ranges(alphabet.front_ranges())
    }

    pub fn from_ranges(ranges: &[FrontRange]) -> Result<Self, SjzipError> {
        let total: usize = ranges.iter().map(|r| r.len).sum();
        if ranges.is_empty() || total == 0 || ranges.iter().any(|r| r.len == 0) {
            return Err(SjzipError::InternalError(
                "front allocation requires non-empty fronts".to_string(),
            ));
        }

        let usable = 1.0 - 2.0 * Z_MARGIN - (ranges.len() - 1) as f64 * FRONT_GAP;
        if usable <= 0.0 {
            return Err(SjzipError::InternalError(format!(
                "{} fronts do not fit in the unit cube",
                ranges.len()
            )));
        }
        let dz = usable / total as f64;

        let mut slabs = Vec::with_capacity(ranges.len());
        let mut z = Z_MARGIN;
        for (k, range) in ranges.iter().enumerate() {
            let z_lo = z;
            let z_hi = z_lo + range.len as f64 * dz;
            slabs.push(FrontSlab {
                front: range.front,
                start: range.start,
                len: range.len,
                z_lo,
                z_hi,
                phase: k as f64 * TAU / ranges.len() as f64,
            });
            z = z_hi + FRONT_GAP;
        }

        Ok(Self { slabs, dz })
    }

    /// An allocator with no fronts. Every lookup fails and `dz` is zero.
    pub(crate) fn empty() -> Self {
        Self {
            slabs: Vec::new(),
            dz: 0.0,
        }
    }

    pub fn slabs(&self) -> &[FrontSlab] {
        &self.slabs
    }

    /// The uniform z-step between consecutive characters of a front.
    pub fn dz(&self) -> f64 {
        self.dz
    }

    /// Returns the slab owning `index` and the index's rank inside it.
    pub fn locate(&self, index: usize) -> Result<(&FrontSlab, usize), SjzipError> {
        self.slabs
            .iter()
            .find(|slab| slab.contains_index(index))
            .map(|slab| (slab, index - slab.start))
            .ok_or(SjzipError::IndexOutOfRange {
                index,
                size: self.len(),
            })
    }

    /// Returns the slab whose z-range, widened by `tolerance`, contains `z`.
    pub fn slab_for_z(&self, z: f64, tolerance: f64) -> Option<&FrontSlab> {
        self.slabs.iter().find(|slab| slab.contains_z(z, tolerance))
    }

    /// Total number of indices covered by all fronts.
    pub fn len(&self) -> usize {
        self.slabs.iter().map(|s| s.len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.slabs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slabs_are_ordered_disjoint_and_inside_margins() {
        let allocator = FrontAllocator::new(Alphabet::global()).unwrap();
        let slabs = allocator.slabs();
        assert_eq!(slabs.len(), 3);
        assert!((slabs[0].z_lo - Z_MARGIN).abs() < 1e-12);
        assert!((slabs[2].z_hi - (1.0 - Z_MARGIN)).abs() < 1e-9);
        for pair in slabs.windows(2) {
            assert!((pair[1].z_lo - pair[0].z_hi - FRONT_GAP).abs() < 1e-12);
        }
    }

    #[test]
    fn test_dz_is_uniform_step() {
        let allocator = FrontAllocator::new(Alphabet::global()).unwrap();
        let expected = (1.0 - 2.0 * Z_MARGIN - 2.0 * FRONT_GAP) / 250.0;
        assert!((allocator.dz() - expected).abs() < 1e-15);
    }

    #[test]
    fn test_locate_and_out_of_range() {
        let allocator = FrontAllocator::new(Alphabet::global()).unwrap();
        let (slab, rank) = allocator.locate(100).unwrap();
        assert_eq!(slab.front, Front::Hangul);
        assert_eq!(rank, 4);
        assert!(matches!(
            allocator.locate(250),
            Err(SjzipError::IndexOutOfRange { index: 250, .. })
        ));
    }

    #[test]
    fn test_gap_between_slabs_belongs_to_no_front() {
        let allocator = FrontAllocator::new(Alphabet::global()).unwrap();
        let first = allocator.slabs()[0];
        assert!(allocator
            .slab_for_z(first.z_hi + FRONT_GAP / 2.0, 1e-6)
            .is_none());
    }
}
