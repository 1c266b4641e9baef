//! Decision gating: PRA vs RS vs HOLD, with cost gates (§4.1 step 7).
//!
//! PRA and RS are independent triggers evaluated in this order; RS is only
//! considered when PRA did not fire. Both carry a cost gate on top of the
//! threshold gate so a marginal improvement that costs more gas than it's
//! worth still resolves to HOLD.

use tendril_core::{AllocationEntry, Decision, PoolRef, Range, RangeShift, Usd};

/// Fixed floor on absolute APR improvement required before PRA is even
/// considered, independent of the relative `praThreshold` gate.
pub const MIN_ABSOLUTE_APR_GAIN: f64 = 0.02;

/// "projected 7-day gain > 1.5x estimated rebalance gas cost" (§4.1 step 7).
pub const PRA_GAIN_COST_MULTIPLE: f64 = 1.5;

/// "projected fee-loss avoided > 2x per-position gas cost" (§4.1 step 7).
pub const RS_GAIN_COST_MULTIPLE: f64 = 2.0;

/// Inputs for the PRA trigger.
#[derive(Debug, Clone)]
pub struct PraCandidate {
    pub portfolio_apr: f64,
    pub current_apr: f64,
    /// RS/PRA relative-improvement gate, already widened by regime (§4.1 step 2).
    pub pra_threshold: f64,
    pub target_allocations: Vec<AllocationEntry>,
    pub projected_7day_gain_usd: Usd,
    pub rebalance_gas_cost_usd: Usd,
}

impl PraCandidate {
    fn absolute_gain(&self) -> f64 {
        self.portfolio_apr - self.current_apr
    }

    fn relative_gain(&self) -> f64 {
        if self.current_apr.abs() > f64::EPSILON {
            self.absolute_gain() / self.current_apr.abs()
        } else {
            f64::INFINITY
        }
    }

    fn cost_gate_passes(&self) -> bool {
        self.projected_7day_gain_usd.inner()
            > self.rebalance_gas_cost_usd.inner() * rust_decimal::Decimal::try_from(PRA_GAIN_COST_MULTIPLE).unwrap()
    }

    /// Whether this candidate clears every PRA gate: absolute floor,
    /// relative threshold, and the projected-gain-vs-gas cost gate.
    pub fn triggers(&self) -> bool {
        self.absolute_gain() >= MIN_ABSOLUTE_APR_GAIN
            && self.relative_gain() >= self.pra_threshold
            && self.cost_gate_passes()
    }
}

/// Inputs for one pool's RS trigger.
#[derive(Debug, Clone)]
pub struct RsCandidate {
    pub pool_ref: PoolRef,
    pub old_range: Range,
    pub new_range: Range,
    pub divergence: f64,
    /// RS divergence gate, already widened by regime.
    pub rs_threshold: f64,
    pub projected_fee_loss_avoided_usd: Usd,
    pub gas_cost_usd: Usd,
    /// Whether at least `MIN_HOLDING_PERIOD_EPOCHS` have elapsed since the
    /// last RS/PRA on this pool.
    pub holding_period_elapsed: bool,
}

impl RsCandidate {
    fn cost_gate_passes(&self) -> bool {
        self.projected_fee_loss_avoided_usd.inner()
            > self.gas_cost_usd.inner() * rust_decimal::Decimal::try_from(RS_GAIN_COST_MULTIPLE).unwrap()
    }

    /// Whether this pool clears every RS gate.
    pub fn triggers(&self) -> bool {
        self.holding_period_elapsed && self.divergence >= self.rs_threshold && self.cost_gate_passes()
    }
}

/// Evaluate the two independent triggers in order and fold into a `Decision`
/// (§4.1 step 7): PRA first, then RS only if PRA did not fire, otherwise
/// HOLD.
pub fn decide(pra: Option<&PraCandidate>, rs_candidates: &[RsCandidate]) -> Decision {
    if let Some(pra) = pra {
        if pra.triggers() {
            return Decision::Pra {
                target_allocations: pra.target_allocations.clone(),
            };
        }
    }

    let shifts: Vec<RangeShift> = rs_candidates
        .iter()
        .filter(|c| c.triggers())
        .map(|c| RangeShift {
            pool_ref: c.pool_ref.clone(),
            old_range: c.old_range,
            new_range: c.new_range,
        })
        .collect();

    if !shifts.is_empty() {
        return Decision::Rs { range_shifts: shifts };
    }

    Decision::hold_unreasoned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_range(price_min: f64, price_max: f64) -> Range {
        Range {
            price_min,
            price_max,
            base_price: (price_min + price_max) / 2.0,
            breadth: 0.1,
            confidence: 0.5,
            trend_bias: 0.0,
            kind: tendril_core::RangeKind::Neutral,
        }
    }

    fn pool() -> PoolRef {
        PoolRef::new(1, "0xabc")
    }

    #[test]
    fn test_pra_triggers_on_first_mint() {
        // S2: no existing positions -> current_apr 0, any positive APR clears
        // the relative gate, but the cost gate still needs to pass.
        let pra = PraCandidate {
            portfolio_apr: 0.12,
            current_apr: 0.0,
            pra_threshold: 0.05,
            target_allocations: vec![AllocationEntry {
                pool_ref: pool(),
                fraction: 1.0,
                expected_apr: 0.12,
            }],
            projected_7day_gain_usd: Usd::new(dec!(10)),
            rebalance_gas_cost_usd: Usd::new(dec!(2)),
        };
        assert!(pra.triggers());
        let decision = decide(Some(&pra), &[]);
        assert_eq!(decision.kind(), "pra");
    }

    #[test]
    fn test_pra_blocked_by_cost_gate() {
        let pra = PraCandidate {
            portfolio_apr: 0.12,
            current_apr: 0.0,
            pra_threshold: 0.05,
            target_allocations: vec![],
            projected_7day_gain_usd: Usd::new(dec!(1)),
            rebalance_gas_cost_usd: Usd::new(dec!(2)),
        };
        assert!(!pra.triggers());
        assert!(decide(Some(&pra), &[]).is_hold());
    }

    #[test]
    fn test_rs_triggers_after_divergence() {
        // S3: rangeDivergence = 0.30 > rsThreshold = 0.25.
        let rs = RsCandidate {
            pool_ref: pool(),
            old_range: sample_range(0.9, 1.1),
            new_range: sample_range(0.95, 1.15),
            divergence: 0.30,
            rs_threshold: 0.25,
            projected_fee_loss_avoided_usd: Usd::new(dec!(10)),
            gas_cost_usd: Usd::new(dec!(2)),
            holding_period_elapsed: true,
        };
        assert!(rs.triggers());
        let decision = decide(None, &[rs]);
        match decision {
            Decision::Rs { range_shifts } => assert_eq!(range_shifts.len(), 1),
            other => panic!("expected RS, got {other:?}"),
        }
    }

    #[test]
    fn test_rs_blocked_by_holding_period() {
        let rs = RsCandidate {
            pool_ref: pool(),
            old_range: sample_range(0.9, 1.1),
            new_range: sample_range(0.95, 1.15),
            divergence: 0.30,
            rs_threshold: 0.25,
            projected_fee_loss_avoided_usd: Usd::new(dec!(10)),
            gas_cost_usd: Usd::new(dec!(2)),
            holding_period_elapsed: false,
        };
        assert!(!rs.triggers());
        assert!(decide(None, &[rs]).is_hold());
    }

    #[test]
    fn test_pra_takes_precedence_over_rs() {
        let pra = PraCandidate {
            portfolio_apr: 0.20,
            current_apr: 0.0,
            pra_threshold: 0.05,
            target_allocations: vec![AllocationEntry {
                pool_ref: pool(),
                fraction: 1.0,
                expected_apr: 0.20,
            }],
            projected_7day_gain_usd: Usd::new(dec!(50)),
            rebalance_gas_cost_usd: Usd::new(dec!(2)),
        };
        let rs = RsCandidate {
            pool_ref: pool(),
            old_range: sample_range(0.9, 1.1),
            new_range: sample_range(0.95, 1.15),
            divergence: 0.30,
            rs_threshold: 0.25,
            projected_fee_loss_avoided_usd: Usd::new(dec!(10)),
            gas_cost_usd: Usd::new(dec!(2)),
            holding_period_elapsed: true,
        };
        assert_eq!(decide(Some(&pra), &[rs]).kind(), "pra");
    }

    #[test]
    fn test_no_triggers_holds() {
        assert!(decide(None, &[]).is_hold());
    }
}
