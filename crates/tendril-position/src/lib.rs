//! Position registry: creation/destruction bookkeeping and per-pool
//! holding-period tracking on top of `tendril_core::Position`.

pub mod error;
pub mod registry;

pub use error::{PositionError, Result};
pub use registry::PositionRegistry;
