//! Error types for tendril-allocation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AllocationError {
    #[error("no eligible pools to allocate across")]
    NoEligiblePools,

    #[error("water-fill did not converge within {max_iters} iterations")]
    DidNotConverge { max_iters: u32 },

    #[error("allocation sum {sum} outside tolerance after renormalization")]
    InvalidSum { sum: f64 },
}

pub type Result<T> = std::result::Result<T, AllocationError>;
