//! Post-optimization kill-switches (§4.2). Two are sticky latches that,
//! once triggered, stay active until their cooldown elapses or an operator
//! manually clears them — the same "trigger once via `compare_exchange`,
//! reset only explicitly" idiom as a hard-stop latch. The other two are
//! live per-call checks with no persisted state: a rejected vertex or a
//! rolling gas-budget gate don't need stickiness, they're recomputed fresh
//! every epoch.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use parking_lot::RwLock;
use tendril_core::{KillSwitchState, RangeParams};
use tracing::{error, warn};

const NEGATIVE_YIELD_LOOKBACK_EPOCHS: usize = 24;
const NEGATIVE_YIELD_COOLDOWN_MS: i64 = 24 * 3_600_000;
const EXCESSIVE_RS_TRAILING_COUNT: u32 = 8;
const PATHOLOGICAL_RANGE_MIN_SPREAD: f64 = 0.001;
const GAS_BUDGET_FRACTION: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillSwitchName {
    NegativeTrailingYield,
    ExcessiveRs,
    PathologicalRange,
    GasBudgetExceeded,
}

impl KillSwitchName {
    pub const fn as_str(self) -> &'static str {
        match self {
            KillSwitchName::NegativeTrailingYield => "negative_trailing_yield",
            KillSwitchName::ExcessiveRs => "excessive_rs",
            KillSwitchName::PathologicalRange => "pathological_range",
            KillSwitchName::GasBudgetExceeded => "gas_budget_exceeded",
        }
    }
}

/// A sticky kill-switch latch: triggers once, clears on cooldown expiry or
/// manual reset.
pub struct KillSwitchLatch {
    name: KillSwitchName,
    triggered: AtomicBool,
    triggered_at_ms: AtomicI64,
    clears_at_ms: AtomicI64,
    reason: RwLock<Option<String>>,
}

impl KillSwitchLatch {
    pub fn new(name: KillSwitchName) -> Self {
        Self {
            name,
            triggered: AtomicBool::new(false),
            triggered_at_ms: AtomicI64::new(0),
            clears_at_ms: AtomicI64::new(i64::MAX),
            reason: RwLock::new(None),
        }
    }

    /// Trigger once via `compare_exchange`; a second trigger while already
    /// active is a no-op that keeps the original reason.
    pub fn trigger(&self, reason: impl Into<String>, now_ms: i64, cooldown_ms: Option<i64>) {
        if self
            .triggered
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            self.triggered_at_ms.store(now_ms, Ordering::SeqCst);
            self.clears_at_ms.store(
                cooldown_ms.map(|c| now_ms + c).unwrap_or(i64::MAX),
                Ordering::SeqCst,
            );
            *self.reason.write() = Some(reason.into());
            error!(kill_switch = self.name.as_str(), "kill-switch triggered");
        } else {
            warn!(kill_switch = self.name.as_str(), "kill-switch already active, ignoring retrigger");
        }
    }

    /// Check activity, auto-clearing if the cooldown has elapsed.
    pub fn is_active(&self, now_ms: i64) -> bool {
        if self.triggered.load(Ordering::SeqCst) && now_ms >= self.clears_at_ms.load(Ordering::SeqCst) {
            self.reset();
            return false;
        }
        self.triggered.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.triggered.store(false, Ordering::SeqCst);
        self.triggered_at_ms.store(0, Ordering::SeqCst);
        self.clears_at_ms.store(i64::MAX, Ordering::SeqCst);
        *self.reason.write() = None;
    }

    pub fn state(&self, now_ms: i64) -> KillSwitchState {
        let active = self.is_active(now_ms);
        if !active {
            return KillSwitchState::inactive();
        }
        let clears_at = self.clears_at_ms.load(Ordering::SeqCst);
        KillSwitchState {
            active: true,
            reason: self.reason.read().clone(),
            clears_at_ms: if clears_at == i64::MAX { None } else { Some(clears_at) },
        }
    }
}

/// Registry of the two sticky kill-switches. `pathological_range` and
/// `gas_budget_exceeded` are stateless checks (see free functions below),
/// so they aren't latches here.
pub struct KillSwitchRegistry {
    pub negative_trailing_yield: KillSwitchLatch,
    pub excessive_rs: KillSwitchLatch,
}

impl Default for KillSwitchRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl KillSwitchRegistry {
    pub fn new() -> Self {
        Self {
            negative_trailing_yield: KillSwitchLatch::new(KillSwitchName::NegativeTrailingYield),
            excessive_rs: KillSwitchLatch::new(KillSwitchName::ExcessiveRs),
        }
    }

    /// `mean(trailing 6h netYield; 24 epochs) < 0` reverts to defaults for 24h.
    pub fn check_negative_trailing_yield(&self, trailing_net_yields: &[f64], now_ms: i64) -> bool {
        let window = if trailing_net_yields.len() > NEGATIVE_YIELD_LOOKBACK_EPOCHS {
            &trailing_net_yields[trailing_net_yields.len() - NEGATIVE_YIELD_LOOKBACK_EPOCHS..]
        } else {
            trailing_net_yields
        };
        if !window.is_empty() {
            let mean = window.iter().sum::<f64>() / window.len() as f64;
            if mean < 0.0 {
                self.negative_trailing_yield.trigger(
                    format!("mean trailing net yield {mean:.6} < 0"),
                    now_ms,
                    Some(NEGATIVE_YIELD_COOLDOWN_MS),
                );
            }
        }
        self.negative_trailing_yield.is_active(now_ms)
    }

    /// `RS count in trailing 4h > 8` reverts to defaults, sticky until
    /// manually cleared.
    pub fn check_excessive_rs(&self, rs_count_trailing_4h: u32, now_ms: i64) -> bool {
        if rs_count_trailing_4h > EXCESSIVE_RS_TRAILING_COUNT {
            self.excessive_rs.trigger(
                format!("{rs_count_trailing_4h} RS events in trailing 4h"),
                now_ms,
                None,
            );
        }
        self.excessive_rs.is_active(now_ms)
    }
}

/// `baseMax - baseMin < 0.001`: reject this vertex, use defaults.
pub fn pathological_range(params: &RangeParams) -> bool {
    (params.base_max - params.base_min) < PATHOLOGICAL_RANGE_MIN_SPREAD
}

/// `trailing 24h gas USD > 5% of portfolio value`: halt rebalancing.
pub fn gas_budget_exceeded(trailing_24h_gas_usd: f64, portfolio_value_usd: f64) -> bool {
    portfolio_value_usd > 0.0 && trailing_24h_gas_usd > GAS_BUDGET_FRACTION * portfolio_value_usd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_trailing_yield_triggers_and_cools_down() {
        let registry = KillSwitchRegistry::new();
        let yields = vec![-0.1; 24];
        assert!(registry.check_negative_trailing_yield(&yields, 1_000));
        assert!(registry.negative_trailing_yield.is_active(1_000 + NEGATIVE_YIELD_COOLDOWN_MS - 1));
        assert!(!registry.negative_trailing_yield.is_active(1_000 + NEGATIVE_YIELD_COOLDOWN_MS));
    }

    #[test]
    fn test_positive_yield_does_not_trigger() {
        let registry = KillSwitchRegistry::new();
        let yields = vec![0.05; 24];
        assert!(!registry.check_negative_trailing_yield(&yields, 1_000));
    }

    #[test]
    fn test_excessive_rs_is_sticky_until_manual_reset() {
        let registry = KillSwitchRegistry::new();
        assert!(registry.check_excessive_rs(9, 1_000));
        assert!(registry.excessive_rs.is_active(1_000_000_000));
        registry.excessive_rs.reset();
        assert!(!registry.excessive_rs.is_active(1_000_000_001));
    }

    #[test]
    fn test_second_trigger_keeps_first_reason() {
        let registry = KillSwitchRegistry::new();
        registry.check_excessive_rs(9, 1_000);
        registry.check_excessive_rs(20, 2_000);
        let state = registry.excessive_rs.state(2_000);
        assert!(state.reason.unwrap().contains('9'));
    }

    #[test]
    fn test_pathological_range() {
        let mut p = crate::bounds::default_params();
        p.base_max = p.base_min + 0.0005;
        assert!(pathological_range(&p));
        p.base_max = p.base_min + 0.01;
        assert!(!pathological_range(&p));
    }

    #[test]
    fn test_gas_budget_exceeded() {
        assert!(gas_budget_exceeded(600.0, 10_000.0));
        assert!(!gas_budget_exceeded(400.0, 10_000.0));
    }
}
