//! Error types for tendril-optimizer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OptimizerError {
    #[error("insufficient simulation window: need at least {need} candles, got {got}")]
    InsufficientWindow { need: usize, got: usize },

    #[error("optimizer vector component out of declared bounds: {component} = {value}")]
    OutOfBounds { component: &'static str, value: f64 },

    #[error("force computation failed during fitness simulation: {0}")]
    ForceComputation(#[from] tendril_forces::ForcesError),
}

pub type Result<T> = std::result::Result<T, OptimizerError>;
