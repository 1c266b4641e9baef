//! Error types for the orchestrator.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("hot store error: {0}")]
    HotStore(#[from] tendril_hotstore::HotStoreError),

    #[error("failed to spawn worker process: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("lost singleton lock, another orchestrator owns it")]
    LockLost,
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
