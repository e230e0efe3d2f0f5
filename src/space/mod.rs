//! The geometric character space: the alphabet, its partition into fronts, and
//! the mapping rule that places every character at a unique point of the unit
//! cube.

pub mod alphabet;
pub mod front;
pub mod mapper;

pub use alphabet::Alphabet;
pub use front::{Front, FrontAllocator, FrontSlab};
pub use mapper::SpiralMapper;
