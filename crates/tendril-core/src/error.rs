//! Error types for tendril-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid allocation: {0}")]
    InvalidAllocation(String),

    #[error("invalid range: {0}")]
    InvalidRange(String),

    #[error("invalid position: {0}")]
    InvalidPosition(String),

    #[error("decimal parse error: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
