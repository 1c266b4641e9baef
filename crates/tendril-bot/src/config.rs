//! Process-wide configuration (§6.3), read from the environment the way
//! `hip3-bot::main`'s CLI-arg-then-env-then-default resolution does, minus
//! the CLI layer (this level of config is all env-driven per the schema
//! table).

use serde::Deserialize;
use std::path::Path;
use tendril_core::PairId;
use tendril_orchestrator::PairSetProvider;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub pairs: Vec<PairId>,
    pub config_dir: String,
    pub hot_store_url: String,
    pub cold_log_url: Option<String>,
    pub cold_log_org: Option<String>,
    pub cold_log_token: Option<String>,
    pub data_retention_days: u32,
}

/// Optional base values loadable from a TOML file, merged under env-var
/// overrides. Mirrors `hip3-bot::config::AppConfig::load`'s file-then-env
/// resolution order, just with the file layer optional for every field
/// instead of mandatory for the whole document.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    pairs: Option<Vec<String>>,
    config_dir: Option<String>,
    hot_store_url: Option<String>,
    cold_log_url: Option<String>,
    cold_log_org: Option<String>,
    cold_log_token: Option<String>,
    data_retention_days: Option<u32>,
}

impl BotConfig {
    /// Resolution order per §6.3: (1) built-in defaults, (2) an optional
    /// TOML file (`TENDRIL_CONFIG` or `config/default.toml`), (3) individual
    /// env-var overrides applied last.
    pub fn from_env(config_dir: String) -> Self {
        let file = load_file_config();

        let pairs = read_pairs().unwrap_or_else(|| {
            file.pairs
                .map(|v| v.into_iter().map(PairId::new).collect())
                .unwrap_or_default()
        });

        Self {
            pairs,
            config_dir: std::env::var("CONFIG_DIR").ok().or(file.config_dir).unwrap_or(config_dir),
            hot_store_url: std::env::var("HOT_STORE_URL")
                .ok()
                .or(file.hot_store_url)
                .unwrap_or_else(|| "redis://127.0.0.1:6379".to_string()),
            cold_log_url: std::env::var("COLD_LOG_URL").ok().filter(|s| !s.is_empty()).or(file.cold_log_url),
            cold_log_org: std::env::var("COLD_LOG_ORG").ok().or(file.cold_log_org),
            cold_log_token: std::env::var("COLD_LOG_TOKEN").ok().or(file.cold_log_token),
            data_retention_days: std::env::var("DATA_RETENTION_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .or(file.data_retention_days)
                .unwrap_or(90),
        }
    }

    pub fn pair_config_path(&self, pair_id: &PairId) -> String {
        format!("{}/{}.toml", self.config_dir.trim_end_matches('/'), pair_id.as_str())
    }
}

fn load_file_config() -> FileConfig {
    let path = std::env::var("TENDRIL_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());
    if !Path::new(&path).exists() {
        return FileConfig::default();
    }
    match std::fs::read_to_string(&path).and_then(|s| toml::from_str(&s).map_err(std::io::Error::other)) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(path = %path, error = %e, "failed to read/parse config file, using defaults");
            FileConfig::default()
        }
    }
}

fn read_pairs() -> Option<Vec<PairId>> {
    std::env::var("PAIRS")
        .ok()
        .map(|v| v.split(',').map(str::trim).filter(|s| !s.is_empty()).map(PairId::new).collect())
}

/// Rereads `PAIRS` on every call, for the orchestrator's SIGHUP hot-reload.
pub struct EnvPairSetProvider;

impl PairSetProvider for EnvPairSetProvider {
    fn load(&self) -> std::io::Result<Vec<PairId>> {
        Ok(read_pairs().unwrap_or_default())
    }
}
