//! `PositionAdapter` contract (§6.1, §9 "Dynamic dispatch over DEX
//! families"): one implementation per DEX family (V3-style, Algebra,
//! Aerodrome, V4-singleton, LB). Family-specific quirks (slot0 vs
//! globalState, action-encoded V4 multicalls, LB bin distributions) stay
//! behind this interface — never leaked to the core.

use crate::error::Result;
use std::future::Future;
use std::pin::Pin;
use tendril_core::{Position, PoolRef, Range, Usd};

#[cfg(test)]
use mockall::automock;

#[derive(Debug, Clone, PartialEq)]
pub struct MintResult {
    /// `None` when the mint reverted; the caller does not persist a
    /// `Position` for a reverted mint (§4.1 "Failure semantics").
    pub position: Option<Position>,
    pub tx_hash: String,
    pub gas_used: u64,
    pub gas_price: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BurnResult {
    pub success: bool,
    pub amount0: Usd,
    pub amount1: Usd,
    pub tx_hash: String,
    pub gas_used: u64,
    pub gas_price: u64,
}

#[cfg_attr(test, automock)]
pub trait PositionAdapter: Send + Sync {
    fn mint(
        &self,
        pool_ref: &PoolRef,
        range: &Range,
        amount0: Usd,
        amount1: Usd,
        payer: &str,
    ) -> Pin<Box<dyn Future<Output = Result<MintResult>> + Send + '_>>;

    fn burn(
        &self,
        position: &Position,
        payer: &str,
    ) -> Pin<Box<dyn Future<Output = Result<BurnResult>> + Send + '_>>;

    fn read_tick_spacing(&self, pool_ref: &PoolRef) -> Pin<Box<dyn Future<Output = Result<i32>> + Send + '_>>;

    fn read_fee(&self, pool_ref: &PoolRef) -> Pin<Box<dyn Future<Output = Result<f64>> + Send + '_>>;
}
