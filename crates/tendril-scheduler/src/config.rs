//! Per-pair configuration (§6.3), loaded the way `hip3-bot::config::
//! AppConfig` loads: defaults, then an optional TOML file, then individual
//! env-var overrides applied last.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tendril_core::PairId;

fn default_interval_sec() -> u64 {
    900
}

fn default_max_positions() -> usize {
    3
}

fn default_pra_threshold() -> f64 {
    0.05
}

fn default_rs_threshold() -> f64 {
    0.25
}

fn default_retention_days() -> u32 {
    90
}

/// One pool a pair is allowed to allocate into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolConfig {
    pub chain_id: u64,
    pub address: String,
    pub dex_family: tendril_core::DexFamily,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairConfig {
    pub pair_id: PairId,
    pub pools: Vec<PoolConfig>,
    #[serde(default = "default_interval_sec")]
    pub interval_sec: u64,
    #[serde(default = "default_max_positions")]
    pub max_positions: usize,
    #[serde(default = "default_pra_threshold")]
    pub pra_threshold: f64,
    #[serde(default = "default_rs_threshold")]
    pub rs_threshold: f64,
    #[serde(default = "default_retention_days")]
    pub data_retention_days: u32,
    /// Signing key env var name for this pair; `None` means read-only
    /// (`PK_<PAIR>` absent, §6.3).
    #[serde(default)]
    pub signing_key_env: Option<String>,
}

impl Default for PairConfig {
    fn default() -> Self {
        Self {
            pair_id: PairId::new("USDC-USDT"),
            pools: Vec::new(),
            interval_sec: default_interval_sec(),
            max_positions: default_max_positions(),
            pra_threshold: default_pra_threshold(),
            rs_threshold: default_rs_threshold(),
            data_retention_days: default_retention_days(),
            signing_key_env: None,
        }
    }
}

impl PairConfig {
    /// Loads a single pair's config: file (if `path` exists) then env-var
    /// overrides, falling back to defaults with a `pair_id` override when no
    /// file is present.
    pub fn load(pair_id: &PairId, path: &str) -> Self {
        let mut config = if Path::new(path).exists() {
            match Self::from_file(path) {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(path, error = %e, "failed to parse pair config, using defaults");
                    Self {
                        pair_id: pair_id.clone(),
                        ..Self::default()
                    }
                }
            }
        } else {
            tracing::warn!(path, "pair config file not found, using defaults");
            Self {
                pair_id: pair_id.clone(),
                ..Self::default()
            }
        };
        config.apply_env_overrides();
        config
    }

    pub fn from_file(path: &str) -> Result<Self, String> {
        let content = std::fs::read_to_string(path).map_err(|e| format!("read {path}: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("parse {path}: {e}"))
    }

    /// Env-var overrides, applied last per §6.3's precedence.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("INTERVAL_SEC") {
            if let Ok(parsed) = v.parse() {
                self.interval_sec = parsed;
            }
        }
        if let Ok(v) = std::env::var("MAX_POSITIONS") {
            if let Ok(parsed) = v.parse() {
                self.max_positions = parsed;
            }
        }
        if let Ok(v) = std::env::var("PRA_THRESHOLD") {
            if let Ok(parsed) = v.parse() {
                self.pra_threshold = parsed;
            }
        }
        if let Ok(v) = std::env::var("RS_THRESHOLD") {
            if let Ok(parsed) = v.parse() {
                self.rs_threshold = parsed;
            }
        }
    }

    pub fn signing_key(&self) -> Option<String> {
        self.signing_key_env
            .as_ref()
            .and_then(|var| std::env::var(var).ok())
    }

    pub fn is_read_only(&self) -> bool {
        self.signing_key().is_none()
    }
}
