//! `MarketData` contract (§6.1): CEX OHLC ingestion and pool-snapshot reads.
//!
//! Out of scope per §1 ("CEX OHLC ingestion and the GeckoTerminal
//! pool-snapshot client") — this module is the interface only, object-safe
//! so the scheduler can hold it as `Arc<dyn MarketData>` and mock it in
//! tests without pulling in an HTTP client.

use crate::error::Result;
use std::future::Future;
use std::pin::Pin;
use tendril_core::{Candle, PoolRef, PoolSnapshot};

#[cfg(test)]
use mockall::automock;

/// Source of candles and pool snapshots for a cycle's "acquire data" step
/// (§4.1 step 1).
#[cfg_attr(test, automock)]
pub trait MarketData: Send + Sync {
    /// Ordered, chronologically strictly-increasing, minute-aligned candles.
    fn fetch_candles(
        &self,
        source: &str,
        symbol: &str,
        since_ms: i64,
        limit: u32,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Candle>>> + Send + '_>>;

    /// 24h volume, TVL, fee fraction, prices, 1h/24h price change for one pool.
    fn fetch_pool(
        &self,
        pool_ref: &PoolRef,
    ) -> Pin<Box<dyn Future<Output = Result<PoolSnapshot>> + Send + '_>>;
}
