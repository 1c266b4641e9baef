//! Pool state as fetched per cycle from `MarketData`.

use crate::ids::PoolRef;
use serde::{Deserialize, Serialize};

/// A point-in-time snapshot of a single pool, fetched once per cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub pool_ref: PoolRef,
    pub timestamp_ms: i64,
    pub volume_24h: f64,
    pub tvl: f64,
    pub fee_fraction: f64,
    pub price: f64,
    pub price_change_1h: f64,
    pub price_change_24h: f64,
}

impl PoolSnapshot {
    /// The fallback per-cycle volume estimate used when a direct interval
    /// figure is unavailable: a flat 1/96th of the trailing 24h volume
    /// (96 cycles/day at the default 900s interval).
    ///
    /// Applied whenever the snapshot itself carries no interval-level
    /// volume figure — not only when the 24h window rolls negative.
    pub fn interval_volume_fallback(&self) -> f64 {
        self.volume_24h / 96.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_volume_fallback() {
        let snap = PoolSnapshot {
            pool_ref: PoolRef::new(1, "0xabc"),
            timestamp_ms: 0,
            volume_24h: 960_000.0,
            tvl: 5_000_000.0,
            fee_fraction: 0.0005,
            price: 1.0,
            price_change_1h: 0.0,
            price_change_24h: 0.0,
        };
        assert!((snap.interval_volume_fallback() - 10_000.0).abs() < 1e-6);
    }
}
