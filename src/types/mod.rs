//! This module defines the core, strongly-typed data representations used
//! throughout the sjzip pipeline.
//!
//! It currently holds the coordinate types (`Point`, `QuantizedPoint`) shared by
//! the mapping rule, the DOT codec and every optimization kernel.

pub mod point;

// Re-export the main type(s) for easier access.
pub use point::{Axis, Point, QuantizedPoint};
