//! The mapping rule: a deterministic bijection between alphabet indices and
//! points of the unit cube.
//!
//! Inside its front's slab, a character's z-coordinate grows linearly with its
//! rank, while (x, y) follow an outward spiral around the cube's vertical axis.
//! Distinct characters therefore always differ by at least one z-step, which
//! is what makes the inverse a simple rounding followed by a verification.

use std::f64::consts::TAU;
use std::sync::OnceLock;

use crate::error::SjzipError;
use crate::space::alphabet::Alphabet;
use crate::space::front::{Front, FrontAllocator, FrontSlab};
use crate::types::Point;

/// Spiral radius at the first rank of a front.
pub const R_MIN: f64 = 0.05;
/// Spiral radius at the last rank of a front. Keeps x and y inside `[0.05, 0.95]`.
pub const R_MAX: f64 = 0.45;
/// Full turns of the spiral across one front.
pub const TURNS: f64 = 5.0;
/// Tolerance used by the exact inverse, to absorb round-off only.
pub const MAP_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone)]
pub struct SpiralMapper {
    allocator: FrontAllocator,
    points: Vec<Point>,
}

static MAPPER: OnceLock<SpiralMapper> = OnceLock::new();

impl SpiralMapper {
    /// The process-wide mapper over [`Alphabet::global`].
    ///
    /// The built-in alphabet always yields a valid layout, so construction
    /// failure here is a bug; it is surfaced as an empty mapper that rejects
    /// every index instead of a panic.
    pub fn global() -> &'static SpiralMapper {
        MAPPER.get_or_init(|| {
            SpiralMapper::new(Alphabet::global()).unwrap_or_else(|e| {
                log::error!("failed to build the global mapper: {}", e);
                SpiralMapper {
                    allocator: FrontAllocator::empty(),
                    points: Vec::new(),
                }
            })
        })
    }

    pub fn new(alphabet: &Alphabet) -> Result<Self, SjzipError> {
        let allocator = FrontAllocator::new(alphabet)?;
        let mut points = Vec::with_capacity(alphabet.len());
        for slab in allocator.slabs() {
            for rank in 0..slab.len {
                points.push(spiral_point(slab, rank, allocator.dz())?);
            }
        }
        Ok(Self { allocator, points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn allocator(&self) -> &FrontAllocator {
        &self.allocator
    }

    /// The smallest per-axis distance between any two mapped characters.
    pub fn min_separation(&self) -> f64 {
        self.allocator.dz()
    }

    pub fn front_of(&self, index: usize) -> Result<Front, SjzipError> {
        self.allocator.locate(index).map(|(slab, _)| slab.front)
    }

    pub fn map(&self, index: usize) -> Result<Point, SjzipError> {
        self.points
            .get(index)
            .copied()
            .ok_or(SjzipError::IndexOutOfRange {
                index,
                size: self.points.len(),
            })
    }

    /// Exact inverse of [`SpiralMapper::map`].
    pub fn unmap(&self, point: &Point) -> Result<usize, SjzipError> {
        self.unmap_within(point, MAP_EPSILON)
    }

    /// Inverse of [`SpiralMapper::map`] for a point that may have been moved by
    /// up to `tolerance` on every axis. `tolerance` must stay below half of
    /// [`SpiralMapper::min_separation`] for the answer to be unique.
    pub fn unmap_within(&self, point: &Point, tolerance: f64) -> Result<usize, SjzipError> {
        let unmappable = || SjzipError::UnmappablePoint {
            x: point.x(),
            y: point.y(),
            z: point.z(),
        };

        let slab = self
            .allocator
            .slab_for_z(point.z(), tolerance)
            .ok_or_else(unmappable)?;

        let rank = ((point.z() - slab.z_lo) / self.allocator.dz() - 0.5).round();
        if !(0.0..slab.len as f64).contains(&rank) {
            return Err(unmappable());
        }
        let index = slab.start + rank as usize;

        let expected = self.map(index)?;
        if expected.chebyshev_distance(point) <= tolerance {
            Ok(index)
        } else {
            Err(unmappable())
        }
    }
}

fn spiral_point(slab: &FrontSlab, rank: usize, dz: f64) -> Result<Point, SjzipError> {
    let t = (rank as f64 + 0.5) / slab.len as f64;
    let z = slab.z_lo + (rank as f64 + 0.5) * dz;
    let theta = slab.phase + t * TURNS * TAU;
    let rho = R_MIN + t * (R_MAX - R_MIN);
    Point::new(0.5 + rho * theta.cos(), 0.5 + rho * theta.sin(), z)
}
