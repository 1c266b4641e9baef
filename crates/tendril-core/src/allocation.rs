//! Allocation entries produced by water-fill across a pair's pools.

use crate::ids::PoolRef;
use serde::{Deserialize, Serialize};

/// Minimum allocation fraction; entries below this are dropped and the
/// remainder renormalized (§3 invariants, §8 property 1).
pub const ALLOC_MIN: f64 = 0.001;

/// One pool's share of a pair's capital, plus its expected diluted APR at
/// that share.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationEntry {
    pub pool_ref: PoolRef,
    pub fraction: f64,
    pub expected_apr: f64,
}

/// Whether a set of allocation fractions sums to 1 within tolerance and each
/// entry is at least `ALLOC_MIN`.
pub fn is_valid_allocation(entries: &[AllocationEntry]) -> bool {
    const TOL: f64 = 1e-6;
    if entries.iter().any(|e| e.fraction < ALLOC_MIN) {
        return false;
    }
    let sum: f64 = entries.iter().map(|e| e.fraction).sum();
    (sum - 1.0).abs() <= TOL
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(fraction: f64) -> AllocationEntry {
        AllocationEntry {
            pool_ref: PoolRef::new(1, "0xabc"),
            fraction,
            expected_apr: 0.1,
        }
    }

    #[test]
    fn test_valid_allocation_sums_to_one() {
        assert!(is_valid_allocation(&[entry(0.6), entry(0.4)]));
    }

    #[test]
    fn test_invalid_allocation_below_min() {
        assert!(!is_valid_allocation(&[entry(0.9999), entry(0.0001)]));
    }

    #[test]
    fn test_invalid_allocation_wrong_sum() {
        assert!(!is_valid_allocation(&[entry(0.5), entry(0.3)]));
    }
}
