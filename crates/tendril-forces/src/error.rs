//! Error types for tendril-forces.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForcesError {
    #[error("insufficient candles: need at least {need}, got {got}")]
    InsufficientCandles { need: usize, got: usize },

    #[error("candle series is not chronologically ordered")]
    UnorderedCandles,
}

pub type Result<T> = std::result::Result<T, ForcesError>;
