//! Error types for tendril-dashboard.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("hot store error: {0}")]
    HotStore(#[from] tendril_hotstore::HotStoreError),

    #[error("cold log query failed: {0}")]
    ColdLog(#[from] reqwest::Error),

    #[error("cold log transport not configured")]
    ColdLogUnconfigured,
}

pub type Result<T> = std::result::Result<T, DashboardError>;
