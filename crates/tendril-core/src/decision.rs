//! The per-cycle `Decision` and its constituent range-shift/allocation data.

use crate::allocation::AllocationEntry;
use crate::ids::PoolRef;
use crate::range::Range;
use serde::{Deserialize, Serialize};

/// One pool whose range is moving without a full pool re-allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeShift {
    pub pool_ref: PoolRef,
    pub old_range: Range,
    pub new_range: Range,
}

/// The outcome of a single cycle's decision step (§3, §4.1 step 7).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Decision {
    Hold {
        reason: Option<String>,
    },
    Rs {
        range_shifts: Vec<RangeShift>,
    },
    Pra {
        target_allocations: Vec<AllocationEntry>,
    },
}

impl Decision {
    pub fn hold(reason: impl Into<String>) -> Self {
        Self::Hold {
            reason: Some(reason.into()),
        }
    }

    pub fn hold_unreasoned() -> Self {
        Self::Hold { reason: None }
    }

    pub fn is_hold(&self) -> bool {
        matches!(self, Self::Hold { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Hold { .. } => "hold",
            Self::Rs { .. } => "rs",
            Self::Pra { .. } => "pra",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hold_constructors() {
        assert!(Decision::hold("stale_data").is_hold());
        assert!(Decision::hold_unreasoned().is_hold());
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(Decision::hold_unreasoned().kind(), "hold");
        assert_eq!(
            Decision::Rs {
                range_shifts: vec![]
            }
            .kind(),
            "rs"
        );
        assert_eq!(
            Decision::Pra {
                target_allocations: vec![]
            }
            .kind(),
            "pra"
        );
    }
}
