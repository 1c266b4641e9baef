//! Position entity: a flat record referencing its pool by value (§9,
//! "Cyclic references"). Created by mint, destroyed by burn, never mutated
//! in place.

use crate::decimal::Usd;
use crate::error::{CoreError, Result};
use crate::ids::{DexFamily, PoolRef};
use crate::range::TickRange;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single on-chain concentrated-liquidity position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub position_id: String,
    pub pool_ref: PoolRef,
    pub dex_family: DexFamily,
    /// Adapter-specific on-chain handle (token id, bin id, etc).
    pub onchain_handle: String,
    pub tick_range: TickRange,
    pub liquidity: u128,
    pub amount0: Usd,
    pub amount1: Usd,
    pub entry_price: f64,
    pub entry_time: DateTime<Utc>,
    pub entry_apr: f64,
    pub entry_value_usd: Usd,
}

impl Position {
    /// Validates the invariants from §3: `tickLower < tickUpper`,
    /// `liquidity >= 0` (trivially true for `u128`), `entryValueUsd >= 0`.
    pub fn validate(&self) -> Result<()> {
        if !self.tick_range.is_valid() {
            return Err(CoreError::InvalidPosition(format!(
                "tick_lower {} must be < tick_upper {}",
                self.tick_range.tick_lower, self.tick_range.tick_upper
            )));
        }
        if self.entry_value_usd.inner().is_sign_negative() {
            return Err(CoreError::InvalidPosition(
                "entry_value_usd must be >= 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether the minimum holding period (4 epochs) has elapsed since entry,
    /// given the current epoch duration and elapsed epoch count.
    pub fn holding_period_elapsed(&self, epochs_since_entry: u32) -> bool {
        epochs_since_entry >= MIN_HOLDING_PERIOD_EPOCHS
    }
}

/// Minimum holding period between RS/PRA actions on a given pool, in epochs
/// (§4.1 step 7, resolved as "per-pool, since the last RS/PRA on that pool" —
/// see DESIGN.md Open Question #2).
pub const MIN_HOLDING_PERIOD_EPOCHS: u32 = 4;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_position() -> Position {
        Position {
            position_id: "pos-1".to_string(),
            pool_ref: PoolRef::new(1, "0xabc"),
            dex_family: DexFamily::V3,
            onchain_handle: "12345".to_string(),
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
    fn test_valid_position() {
        assert!(sample_position().validate().is_ok());
    }

    #[test]
    fn test_invalid_tick_range() {
        let mut p = sample_position();
        p.tick_range = TickRange {
            tick_lower: 60,
            tick_upper: -60,
        };
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_invalid_negative_entry_value() {
        let mut p = sample_position();
        p.entry_value_usd = Usd::new(dec!(-1));
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_holding_period() {
        let p = sample_position();
        assert!(!p.holding_period_elapsed(3));
        assert!(p.holding_period_elapsed(4));
        assert!(p.holding_period_elapsed(5));
    }
}
