//! Error types for tendril-adapters.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("market data request failed: {0}")]
    MarketData(String),

    #[error("swap executor request failed: {0}")]
    SwapExecutor(String),

    #[error("position adapter request failed: {0}")]
    PositionAdapter(String),

    #[error("no adapter registered for dex family {0}")]
    UnknownDexFamily(String),

    #[error("on-chain call reverted: {0}")]
    Reverted(String),

    #[error("timed out waiting for {0}")]
    Timeout(String),
}

pub type Result<T> = std::result::Result<T, AdapterError>;
