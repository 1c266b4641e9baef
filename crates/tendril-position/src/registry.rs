//! In-memory view of a pair's open positions, keyed by pool.
//!
//! Mirrors the `positions:{pid}` hash in hot state (§6.2): one position per
//! pool, created by mint, destroyed by burn, never mutated in place. The
//! registry also tracks the epoch of the last RS/PRA action per pool so the
//! minimum holding period (§3, `MIN_HOLDING_PERIOD_EPOCHS`) can be enforced
//! without re-deriving it from position history each cycle.

use crate::error::{PositionError, Result};
use std::collections::HashMap;
use tendril_core::{PoolRef, Position, Usd, MIN_HOLDING_PERIOD_EPOCHS};

#[derive(Debug, Default)]
pub struct PositionRegistry {
    positions: HashMap<PoolRef, Position>,
    last_action_epoch: HashMap<PoolRef, u64>,
}

impl PositionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a newly minted position. Fails the invariant check (tick
    /// ordering, non-negative entry value) up front rather than persisting
    /// a position that would later fail validation on read.
    pub fn insert(&mut self, position: Position, epoch: u64) -> Result<()> {
        position.validate()?;
        if self.positions.contains_key(&position.pool_ref) {
            return Err(PositionError::AlreadyExists(position.pool_ref.to_string()));
        }
        self.last_action_epoch.insert(position.pool_ref.clone(), epoch);
        self.positions.insert(position.pool_ref.clone(), position);
        Ok(())
    }

    /// Remove a position on burn. Does not clear `last_action_epoch` — the
    /// holding-period clock for that pool continues through the RS/PRA that
    /// immediately re-mints it.
    pub fn remove(&mut self, pool_ref: &PoolRef) -> Result<Position> {
        self.positions
            .remove(pool_ref)
            .ok_or_else(|| PositionError::NotFound(pool_ref.to_string()))
    }

    pub fn get(&self, pool_ref: &PoolRef) -> Option<&Position> {
        self.positions.get(pool_ref)
    }

    pub fn contains(&self, pool_ref: &PoolRef) -> bool {
        self.positions.contains_key(pool_ref)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.positions.values()
    }

    pub fn pool_refs(&self) -> impl Iterator<Item = &PoolRef> {
        self.positions.keys()
    }

    /// Mark `pool_ref` as having had an RS/PRA action at `epoch`, independent
    /// of whether a position currently exists there (a PRA burns before it
    /// re-mints).
    pub fn record_action(&mut self, pool_ref: &PoolRef, epoch: u64) {
        self.last_action_epoch.insert(pool_ref.clone(), epoch);
    }

    /// Whether the minimum holding period has elapsed for `pool_ref` as of
    /// `current_epoch`. A pool with no recorded action is always eligible.
    pub fn holding_period_elapsed(&self, pool_ref: &PoolRef, current_epoch: u64) -> bool {
        match self.last_action_epoch.get(pool_ref) {
            Some(last) => current_epoch.saturating_sub(*last) >= MIN_HOLDING_PERIOD_EPOCHS as u64,
            None => true,
        }
    }

    pub fn total_value_usd(&self) -> Usd {
        self.positions
            .values()
            .fold(Usd::ZERO, |acc, p| acc + p.entry_value_usd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use tendril_core::{DexFamily, TickRange};

    fn sample_position(pool_ref: PoolRef) -> Position {
        Position {
            position_id: "pos-1".to_string(),
            pool_ref,
            dex_family: DexFamily::V3,
            onchain_handle: "1".to_string(),
            tick_range: TickRange {
                tick_lower: -60,
                tick_upper: 60,
            },
            liquidity: 1_000_000,
            amount0: Usd::new(dec!(500)),
            amount1: Usd::new(dec!(500)),
            entry_price: 1.0,
            entry_time: Utc::now(),
            entry_apr: 0.1,
            entry_value_usd: Usd::new(dec!(1000)),
        }
    }

    #[test]
    fn test_insert_and_get() {
        let mut registry = PositionRegistry::new();
        let pool_ref = PoolRef::new(1, "0xabc");
        registry.insert(sample_position(pool_ref.clone()), 10).unwrap();
        assert!(registry.contains(&pool_ref));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut registry = PositionRegistry::new();
        let pool_ref = PoolRef::new(1, "0xabc");
        registry.insert(sample_position(pool_ref.clone()), 10).unwrap();
        let err = registry.insert(sample_position(pool_ref), 11).unwrap_err();
        assert!(matches!(err, PositionError::AlreadyExists(_)));
    }

    #[test]
    fn test_remove_missing_errors() {
        let mut registry = PositionRegistry::new();
        let err = registry.remove(&PoolRef::new(1, "0xabc")).unwrap_err();
        assert!(matches!(err, PositionError::NotFound(_)));
    }

    #[test]
    fn test_holding_period_with_no_history() {
        let registry = PositionRegistry::new();
        assert!(registry.holding_period_elapsed(&PoolRef::new(1, "0xabc"), 0));
    }

    #[test]
    fn test_holding_period_gate() {
        let mut registry = PositionRegistry::new();
        let pool_ref = PoolRef::new(1, "0xabc");
        registry.record_action(&pool_ref, 10);
        assert!(!registry.holding_period_elapsed(&pool_ref, 12));
        assert!(registry.holding_period_elapsed(&pool_ref, 14));
    }

    #[test]
    fn test_total_value_sums_positions() {
        let mut registry = PositionRegistry::new();
        registry.insert(sample_position(PoolRef::new(1, "0xa")), 1).unwrap();
        registry.insert(sample_position(PoolRef::new(2, "0xb")), 1).unwrap();
        assert_eq!(registry.total_value_usd(), Usd::new(dec!(2000)));
    }
}
