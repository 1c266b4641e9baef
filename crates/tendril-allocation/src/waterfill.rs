//! Water-fill allocation across a pair's candidate pools (§4.1 step 6).
//!
//! Given diluted APRs `A_i` and TVLs for the top-K pools, finds the
//! multiplier `lambda` by bisection such that the resulting fractions sum to
//! 1, then drops sub-`ALLOC_MIN` entries and renormalizes the remainder.

use crate::error::{AllocationError, Result};
use rust_decimal::prelude::ToPrimitive;
use tendril_core::{AllocationEntry, PoolRef, Usd, ALLOC_MIN};

const LAMBDA_MIN: f64 = 1e-4;
const TOLERANCE: f64 = 1e-10;
const MAX_ITERATIONS: u32 = 64;

/// One pool eligible for allocation: its diluted APR at full weight and its
/// current TVL.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolCandidate {
    pub pool_ref: PoolRef,
    pub diluted_apr: f64,
    pub tvl: Usd,
}

/// Result of a water-fill pass: the renormalized allocation entries and the
/// resulting blended portfolio APR.
#[derive(Debug, Clone, PartialEq)]
pub struct WaterFillResult {
    pub entries: Vec<AllocationEntry>,
    pub portfolio_apr: f64,
    pub lambda: f64,
}

fn x_at(lambda: f64, diluted_apr: f64, tvl: f64, k_total: f64) -> f64 {
    if tvl <= 0.0 {
        return 0.0;
    }
    let denom = k_total / tvl;
    if denom <= 0.0 {
        return 0.0;
    }
    ((diluted_apr / lambda - 1.0) / denom).max(0.0)
}

fn sum_x(lambda: f64, candidates: &[(PoolCandidate, f64)], k_total: f64) -> f64 {
    candidates
        .iter()
        .map(|(c, tvl_f64)| x_at(lambda, c.diluted_apr, *tvl_f64, k_total))
        .sum()
}

/// Solve for the water-fill equilibrium and produce renormalized allocation
/// entries. `k_total` is the aggregate capital being allocated across the
/// candidate set.
pub fn water_fill(candidates: &[PoolCandidate], k_total: Usd) -> Result<WaterFillResult> {
    if candidates.is_empty() {
        return Err(AllocationError::NoEligiblePools);
    }

    let k_total_f64 = k_total.inner().to_f64().unwrap_or(0.0);
    let with_tvl: Vec<(PoolCandidate, f64)> = candidates
        .iter()
        .map(|c| (c.clone(), c.tvl.inner().to_f64().unwrap_or(0.0)))
        .collect();

    let a_max = candidates
        .iter()
        .map(|c| c.diluted_apr)
        .fold(f64::MIN, f64::max);

    let mut lo = LAMBDA_MIN;
    let mut hi = a_max.max(lo * 2.0);
    let mut lambda = (lo + hi) / 2.0;

    for _ in 0..MAX_ITERATIONS {
        lambda = (lo + hi) / 2.0;
        let sum = sum_x(lambda, &with_tvl, k_total_f64);
        if (sum - 1.0).abs() <= TOLERANCE {
            break;
        }
        // x_i(lambda) is monotonically decreasing in lambda.
        if sum > 1.0 {
            lo = lambda;
        } else {
            hi = lambda;
        }
    }

    let mut raw: Vec<(PoolCandidate, f64, f64)> = with_tvl
        .into_iter()
        .map(|(c, tvl_f64)| {
            let x = x_at(lambda, c.diluted_apr, tvl_f64, k_total_f64);
            (c, tvl_f64, x)
        })
        .collect();

    // Drop sub-ALLOC_MIN entries, then renormalize the remainder to sum 1.
    raw.retain(|(_, _, x)| *x >= ALLOC_MIN);
    if raw.is_empty() {
        return Err(AllocationError::InvalidSum { sum: 0.0 });
    }
    let kept_sum: f64 = raw.iter().map(|(_, _, x)| *x).sum();
    if kept_sum <= 0.0 {
        return Err(AllocationError::InvalidSum { sum: kept_sum });
    }

    let mut entries = Vec::with_capacity(raw.len());
    let mut portfolio_apr = 0.0;
    for (candidate, tvl_f64, x) in raw {
        let fraction = x / kept_sum;
        let expected_apr = if tvl_f64 + fraction * k_total_f64 > 0.0 {
            candidate.diluted_apr * tvl_f64 / (tvl_f64 + fraction * k_total_f64)
        } else {
            0.0
        };
        portfolio_apr += fraction * expected_apr;
        entries.push(AllocationEntry {
            pool_ref: candidate.pool_ref,
            fraction,
            expected_apr,
        });
    }

    Ok(WaterFillResult {
        entries,
        portfolio_apr,
        lambda,
    })
}
