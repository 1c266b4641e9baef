//! Orchestrator role: singleton lock, worker supervision, and the dashboard
//! server running alongside it.

use crate::config::{BotConfig, EnvPairSetProvider};
use anyhow::Context;
use tendril_orchestrator::{Orchestrator, SpawnSpec};
use tracing::info;

/// Env var used to pass the pair id to a respawned worker process, read back
/// by `crate::worker`. The same executable is reused per §4.3's spawn
/// contract.
pub const WORKER_PAIR_ENV: &str = "TENDRIL_WORKER_PAIR";

pub async fn run(config: BotConfig) -> anyhow::Result<()> {
    let executable = std::env::current_exe().context("resolving current executable path")?;
    let spawn_spec = SpawnSpec {
        executable,
        extra_args: Vec::new(),
        pair_env_var: WORKER_PAIR_ENV.to_string(),
    };

    let hotstore = tendril_hotstore::HotStoreClient::connect(&config.hot_store_url)
        .await
        .context("connecting to hot store")?;

    let dashboard_config = tendril_dashboard::DashboardConfig::from_env();
    tokio::spawn(async move {
        if let Err(e) = tendril_dashboard::run_server(dashboard_config).await {
            tracing::error!(error = %e, "dashboard server exited");
        }
    });

    info!(pairs = ?config.pairs, "starting orchestrator");
    let orchestrator = Orchestrator::new(hotstore, spawn_spec, config.pairs.clone());
    orchestrator.run(EnvPairSetProvider).await?;
    Ok(())
}
