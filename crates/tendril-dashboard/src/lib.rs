//! Read-only status API plus a bearer-gated restart control endpoint (§6.4),
//! grounded on `hip3-dashboard::server::create_router`'s `AppState`+`Router`
//! split between unauthenticated reads and an auth-checked write.

pub mod coldlog;
pub mod config;
pub mod error;
pub mod server;
pub mod state;

pub use coldlog::ColdLogQueryClient;
pub use config::DashboardConfig;
pub use error::{DashboardError, Result};
pub use server::create_router;
pub use state::AppState;

use std::net::SocketAddr;
use tendril_hotstore::HotStoreClient;
use tracing::info;

/// Connects to the hot store, wires up the router, and serves until the
/// listener is closed — the binary's entry point calls this from a spawned
/// task alongside the orchestrator/worker processes.
pub async fn run_server(config: DashboardConfig) -> std::io::Result<()> {
    let hotstore = HotStoreClient::connect(&config.hot_store_url)
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

    let cold_log = match coldlog::from_config(&config) {
        Some(Ok(client)) => Some(client),
        Some(Err(e)) => {
            tracing::warn!(error = %e, "failed to build cold log client, read endpoints for candles/snapshots/tx-log will return 503");
            None
        }
        None => None,
    };

    let port = config.port;
    let state = AppState::new(hotstore, cold_log, config);
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(port, "starting dashboard server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}
