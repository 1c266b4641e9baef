//! Entry point, following `hip3-bot::main`'s shape: parse args, init
//! logging, load config, dispatch into the library.

use clap::Parser;
use tendril_core::PairId;
use tracing::info;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory of per-pair TOML config files, named `{pairId}.toml`.
    #[arg(long, default_value = "config")]
    config_dir: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tendril_telemetry::init_logging()?;

    info!("starting tendril-bot v{}", env!("CARGO_PKG_VERSION"));

    let bot_config = tendril_bot::BotConfig::from_env(args.config_dir);

    match std::env::var(tendril_bot::orchestrator::WORKER_PAIR_ENV).ok() {
        Some(pair) => {
            let pair_id = PairId::new(pair);
            Err(tendril_bot::worker::report_missing_adapters(&pair_id))
        }
        None => tendril_bot::orchestrator::run(bot_config).await,
    }
}
