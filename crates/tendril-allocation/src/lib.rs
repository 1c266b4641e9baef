//! Range geometry, water-fill allocation, and PRA/RS/HOLD decision gating
//! (§4.1 steps 5-7).
//!
//! Tick alignment and range-divergence math live in `tendril_core::range`
//! since both this crate and `tendril-optimizer`'s fitness simulation need
//! the exact same geometry; this crate owns water-fill and the decision
//! gates built on top of it.

pub mod error;
pub mod gating;
pub mod waterfill;

pub use error::{AllocationError, Result};
pub use gating::{decide, PraCandidate, RsCandidate, MIN_ABSOLUTE_APR_GAIN, PRA_GAIN_COST_MULTIPLE, RS_GAIN_COST_MULTIPLE};
pub use waterfill::{water_fill, PoolCandidate, WaterFillResult};
