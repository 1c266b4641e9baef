//! `SwapExecutor` contract (§6.1): swap/bridge aggregator HTTP clients.
//!
//! Out of scope per §1 — interface only. `Quote`/`VerifyCalldata` let the
//! scheduler pre-validate calldata before it ever reaches a signer;
//! `WaitArrival` polls for bridged-balance confirmation within the 10-minute
//! bridge timeout (§4.1, `BridgeTimeout`).

use crate::error::Result;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;

/// A request to quote a swap, possibly cross-chain.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteRequest {
    pub from_chain: u64,
    pub to_chain: u64,
    pub from_token: String,
    pub to_token: String,
    pub amount: u128,
    pub payer: String,
    pub receiver: String,
    pub slippage_bps: u32,
}

/// Aggregator-returned calldata ready for pre-execution verification.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub to: String,
    pub data: Vec<u8>,
    pub value: u128,
    pub to_amount: u128,
    pub to_amount_min: u128,
    pub approval_address: String,
    pub kind: String,
}

#[cfg_attr(test, automock)]
pub trait SwapExecutor: Send + Sync {
    /// Returns `None` when no route is available.
    fn quote(
        &self,
        request: QuoteRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Quote>>> + Send + '_>>;

    /// Pre-execution safety check on calldata before it is handed to a
    /// signer.
    fn verify_calldata(
        &self,
        chain: u64,
        data: &[u8],
        expected_receiver: &str,
        expected_dst_chain: Option<u64>,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + '_>>;

    /// Polls until `account`'s balance of `token` on `chain` exceeds
    /// `balance_before`, or `timeout` elapses (`BridgeTimeout`, §7).
    fn wait_arrival(
        &self,
        chain: u64,
        token: &str,
        account: &str,
        balance_before: u128,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<u128>> + Send + '_>>;
}
