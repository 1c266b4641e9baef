//! Shared `axum` handler state, grounded on
//! `hip3-dashboard::server::AppState`'s bundle-of-clonable-handles shape.

use crate::coldlog::ColdLogQueryClient;
use crate::config::DashboardConfig;
use tendril_hotstore::HotStoreClient;

#[derive(Clone)]
pub struct AppState {
    pub hotstore: HotStoreClient,
    pub cold_log: Option<ColdLogQueryClient>,
    pub config: DashboardConfig,
}

impl AppState {
    pub fn new(hotstore: HotStoreClient, cold_log: Option<ColdLogQueryClient>, config: DashboardConfig) -> Self {
        Self {
            hotstore,
            cold_log,
            config,
        }
    }
}
