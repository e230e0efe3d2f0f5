//! This file is the root of the `sjzip` Rust crate.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring all the top-level modules of our library (`bridge`, `kernels`, etc.)
//!     so the Rust compiler knows they exist.
//! 2.  Re-exporting the small public surface most callers need: the `Codec`
//!     facade, the stateless `encode`/`decode` calls, the config and the error type.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
pub mod observability; // Make macros available throughout the crate

pub mod bridge;
pub mod chunk_pipeline;
pub mod config;
pub mod dot;
pub mod error;
pub mod kernels;
pub mod space;
pub mod types;

mod traits;

// Used by `log_metric!` so callers do not need `log` in scope.
#[doc(hidden)]
pub use log as __log;

//==================================================================================
// 2. Public API Re-exports
//==================================================================================
pub use bridge::{
    analyze_record, decode, decode_from_bytes, encode, encode_to_bytes, Codec, CompressionStats,
};
pub use chunk_pipeline::{Record, RecordInfo};
pub use config::{CodecConfig, OptimizationLevel};
pub use error::{ErrorKind, SjzipError};
pub use observability::enable_verbose_logging;
pub use types::Point;
