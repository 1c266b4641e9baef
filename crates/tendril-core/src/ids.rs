//! Identity types: pairs, pools, DEX families.
//!
//! Positions reference pools by value (`PoolRef`), never by pointer into a
//! registry, so that `Pair <-> Position <-> Pool` never forms a reference
//! cycle (see SPEC_FULL §9, "Cyclic references").

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a configured stable-pair (e.g. "USDC-USDT").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairId(pub String);

impl PairId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PairId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PairId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PairId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Flat, by-value reference to a pool on a specific chain.
///
/// Pools themselves are resolved through a registry at read time; this type
/// never holds a handle into that registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolRef {
    pub chain_id: u64,
    pub address: String,
}

impl PoolRef {
    pub fn new(chain_id: u64, address: impl Into<String>) -> Self {
        Self {
            chain_id,
            address: address.into(),
        }
    }
}

impl fmt::Display for PoolRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chain_id, self.address)
    }
}

/// DEX family, used to dispatch to the right `PositionAdapter` implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DexFamily {
    /// Uniswap-V3-style concentrated liquidity (slot0, discrete ticks).
    V3,
    /// Algebra-style (globalState instead of slot0, dynamic fee).
    Algebra,
    /// Aerodrome/Solidly-style concentrated gauges.
    Aerodrome,
    /// Uniswap-V4-style singleton with action-encoded multicalls.
    V4,
    /// Trader Joe Liquidity Book (discrete bins, not ticks).
    Lb,
}

impl fmt::Display for DexFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::V3 => "v3",
            Self::Algebra => "algebra",
            Self::Aerodrome => "aerodrome",
            Self::V4 => "v4",
            Self::Lb => "lb",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_id_display() {
        let id = PairId::new("USDC-USDT");
        assert_eq!(id.to_string(), "USDC-USDT");
    }

    #[test]
    fn test_pool_ref_equality() {
        let a = PoolRef::new(1, "0xabc");
        let b = PoolRef::new(1, "0xabc");
        let c = PoolRef::new(2, "0xabc");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_dex_family_display() {
        assert_eq!(DexFamily::V3.to_string(), "v3");
        assert_eq!(DexFamily::Lb.to_string(), "lb");
    }
}
