//! Error types for tendril-position.

use tendril_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PositionError {
    #[error("a position already exists for pool {0}")]
    AlreadyExists(String),

    #[error("no position exists for pool {0}")]
    NotFound(String),

    #[error("invalid position: {0}")]
    Invalid(#[from] CoreError),
}

pub type Result<T> = std::result::Result<T, PositionError>;
