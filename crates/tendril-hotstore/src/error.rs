//! Error types for tendril-hotstore.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HotStoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("lock not owned by this instance")]
    NotOwner,

    #[error("lock not acquired: {0}")]
    NotAcquired(String),
}

pub type Result<T> = std::result::Result<T, HotStoreError>;
