//! Published hot state for a worker, its warm-start optimizer checkpoint,
//! and the append-only per-epoch cold-log summary.

use crate::decimal::Usd;
use crate::forces::Forces;
use crate::ids::PairId;
use crate::range::RangeParams;
use serde::{Deserialize, Serialize};

/// Worker lifecycle status, as published in `WorkerState.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerStatus {
    Starting,
    Running,
    Idle,
    Error,
}

/// Coarse regime classification gating optimizer execution (§4.1 step 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegimeKind {
    Normal,
    Suppressed,
}

/// Regime state as published in `WorkerState.regime`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeState {
    pub kind: RegimeKind,
    /// Epochs remaining before a `suppressed` regime lifts.
    pub suppressed_epochs_remaining: u32,
    /// Multiplier applied to RS/PRA thresholds on a volume anomaly, capped
    /// at 0.9 (`widenFactor`, §4.1 step 2); 1.0 when no anomaly is active.
    pub widen_factor: f64,
}

impl RegimeState {
    pub fn normal() -> Self {
        Self {
            kind: RegimeKind::Normal,
            suppressed_epochs_remaining: 0,
            widen_factor: 1.0,
        }
    }

    pub fn is_suppressed(&self) -> bool {
        matches!(self.kind, RegimeKind::Suppressed)
    }
}

/// A single named kill-switch's sticky state, as published in
/// `WorkerState.killSwitch`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KillSwitchState {
    pub active: bool,
    pub reason: Option<String>,
    /// Unix millis at which this kill-switch's cooldown clears, if any.
    pub clears_at_ms: Option<i64>,
}

impl KillSwitchState {
    pub fn inactive() -> Self {
        Self {
            active: false,
            reason: None,
            clears_at_ms: None,
        }
    }
}

/// Hot-published per-worker state, TTL'd in the hot store (§3, §6.2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerState {
    pub pair_id: PairId,
    pub epoch: u64,
    pub status: WorkerStatus,
    pub last_decision_kind: String,
    pub updated_at_ms: i64,
    pub current_apr: f64,
    pub optimal_apr: f64,
    pub forces: Forces,
    pub optimizer_params: RangeParams,
    pub optimizer_fitness: f64,
    pub regime: RegimeState,
    pub kill_switch: KillSwitchState,
    pub error_reason: Option<String>,
}

impl WorkerState {
    /// `TTL(heartbeat) = 3h`; `h <= TTL(WorkerState) <= 4h` (§8 property 6),
    /// given the heartbeat interval `h` in seconds.
    pub fn state_ttl_secs(heartbeat_interval_secs: u64) -> u64 {
        heartbeat_interval_secs * 4
    }

    pub fn heartbeat_ttl_secs(heartbeat_interval_secs: u64) -> u64 {
        heartbeat_interval_secs * 3
    }
}

/// Best parameter vector and fitness from a previous epoch, warm-starting the
/// next optimization run. Persisted with no TTL.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizerWarmStart {
    pub params: RangeParams,
    pub fitness: f64,
}

impl OptimizerWarmStart {
    pub fn defaults(defaults: RangeParams, defaults_fitness: f64) -> Self {
        Self {
            params: defaults,
            fitness: defaults_fitness,
        }
    }
}

/// Per-cycle summary appended to the cold log (§3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochSnapshot {
    pub pair_id: PairId,
    pub epoch: u64,
    pub timestamp_ms: i64,
    pub portfolio_usd: Usd,
    pub fees_usd: Usd,
    pub gas_usd: Usd,
    pub impermanent_loss_usd: Usd,
    pub net_pnl_usd: Usd,
    pub range_efficiency: f64,
    pub current_apr: f64,
    pub optimal_apr: f64,
    pub position_count: u32,
    pub decision_kind: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_relationship() {
        let h = 15;
        assert_eq!(WorkerState::heartbeat_ttl_secs(h), 45);
        assert_eq!(WorkerState::state_ttl_secs(h), 60);
        assert!(WorkerState::state_ttl_secs(h) <= 4 * h);
        assert!(WorkerState::state_ttl_secs(h) >= h);
    }

    #[test]
    fn test_regime_normal_not_suppressed() {
        assert!(!RegimeState::normal().is_suppressed());
    }
}
