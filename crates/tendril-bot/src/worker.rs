//! Single-pair worker role.
//!
//! `MarketData`, `SwapExecutor`, and `PositionAdapter` are deliberately
//! interfaces-only in this workspace (their concrete HTTP/RPC
//! implementations are out of scope, per `tendril_adapters`'s own module
//! docs). [`run`] is the library entry point a deployment wires its own
//! collaborator implementations into; the binary itself has none to offer,
//! so its worker role reports that plainly instead of guessing.

use crate::config::BotConfig;
use anyhow::Context;
use tendril_core::PairId;
use tendril_scheduler::{PairConfig, Worker, WorkerDeps};
use tracing::info;

/// Runs a worker for `pair_id` against injected collaborator implementations.
/// This is the function a real deployment's own binary (built against real
/// `MarketData`/`SwapExecutor`/`PositionAdapter` implementations) should call
/// instead of going through `main.rs`.
pub async fn run(pair_id: PairId, bot_config: &BotConfig, deps: WorkerDeps) -> anyhow::Result<()> {
    let pair_config = PairConfig::load(&pair_id, &bot_config.pair_config_path(&pair_id));
    let hotstore = tendril_hotstore::HotStoreClient::connect(&bot_config.hot_store_url)
        .await
        .context("connecting to hot store")?;

    info!(pair_id = %pair_id, read_only = pair_config.is_read_only(), "starting worker");
    let worker = Worker::new(pair_id, pair_config, hotstore, deps).await;
    worker.run().await?;
    Ok(())
}

/// What `main.rs` calls when invoked in worker role: since this binary has
/// no concrete on-chain/market-data/aggregator adapters compiled in, it
/// cannot actually run a cycle. Exits with a clear diagnostic rather than
/// silently no-opping or panicking on a stub.
pub fn report_missing_adapters(pair_id: &PairId) -> anyhow::Error {
    anyhow::anyhow!(
        "worker role for pair {pair_id} requires MarketData/SwapExecutor/PositionAdapter \
         implementations, which this workspace deliberately leaves as interfaces only (§6.1); \
         call tendril_bot::worker::run from a binary that supplies real ones"
    )
}
