//! Append-only execution record emitted by every PRA/RS on-chain operation.

use serde::{Deserialize, Serialize};

/// Which top-level decision triggered this transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxDecisionType {
    Pra,
    Rs,
}

/// What kind of on-chain operation this entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxOpType {
    Burn,
    Mint,
    Swap,
}

/// Outcome of a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Success,
    Reverted,
}

/// One entry in the append-only transaction log (§4.1 "PRA execution
/// contract").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxLog {
    pub decision_type: TxDecisionType,
    pub op_type: TxOpType,
    pub status: TxStatus,
    pub gas_used: u64,
    pub gas_price: u64,
    pub target_allocation_pct: f64,
    pub actual_allocation_pct: f64,
    pub allocation_error_pct: f64,
}

impl TxLog {
    pub fn gas_cost_wei(&self) -> u128 {
        self.gas_used as u128 * self.gas_price as u128
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gas_cost() {
        let log = TxLog {
            decision_type: TxDecisionType::Pra,
            op_type: TxOpType::Mint,
            status: TxStatus::Success,
            gas_used: 200_000,
            gas_price: 30,
            target_allocation_pct: 0.5,
            actual_allocation_pct: 0.49,
            allocation_error_pct: 0.01,
        };
        assert_eq!(log.gas_cost_wei(), 6_000_000);
    }
}
