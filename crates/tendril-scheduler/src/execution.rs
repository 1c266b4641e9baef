//! PRA/RS execution contracts (§4.1 "PRA execution contract" / "RS
//! execution contract"): the effectful step between a `Decision` and the
//! TxLog/position-registry mutations it produces.
//!
//! PRA: burn all positions -> capture balances -> bridge surpluses (only
//! when > 1% of portfolio value needs to move) -> per pool rebalance +
//! mint. RS: burn -> swap -> mint, per affected pool only. Burns retry with
//! exponential backoff up to 3 attempts; mints do not retry by default
//! (§7 `TxReverted`).

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tendril_adapters::{PositionAdapter, PositionAdapterRegistry, Quote, QuoteRequest, SwapExecutor};
use tendril_core::{
    AllocationEntry, Decision, PairId, Position, PoolRef, Range, RangeShift, TxDecisionType, TxLog, TxOpType, TxStatus, Usd,
};
use tendril_hotstore::{keys, HotStoreClient};
use tendril_position::PositionRegistry;
use tracing::{error, info, warn};

use crate::error::CycleFailure;

const BURN_MAX_ATTEMPTS: u32 = 3;
const BURN_BACKOFF_BASE_MS: u64 = 500;

/// Bridge a surplus only once it exceeds this fraction of total portfolio
/// value (§4.1 PRA execution contract).
const BRIDGE_THRESHOLD_FRACTION: f64 = 0.01;

/// §7 `BridgeTimeout`: "> 10 min without destination arrival".
const BRIDGE_WAIT_TIMEOUT: Duration = Duration::from_secs(600);

/// Swap on-chain only when a pool's token-ratio imbalance exceeds this
/// fraction of its target allocation.
const SWAP_IMBALANCE_THRESHOLD: f64 = 0.05;

/// Pool identity plus the DEX family needed to resolve its adapter, since
/// `AllocationEntry`/`Position` only carry `PoolRef`.
#[derive(Debug, Clone)]
pub struct PoolTarget {
    pub pool_ref: PoolRef,
    pub dex_family: tendril_core::DexFamily,
    pub chain_id: u64,
    pub token0: String,
    pub token1: String,
}

pub struct ExecutionContext<'a> {
    pub pair_id: &'a PairId,
    pub epoch: u64,
    pub payer: &'a str,
    pub adapters: &'a PositionAdapterRegistry,
    pub swap_executor: &'a dyn SwapExecutor,
    pub portfolio_value_usd: Usd,
    /// `None` only in tests that exercise the registry in isolation; a real
    /// worker always supplies its hot-store handle so mints/burns land in
    /// `positions:{pid}` (§6.2, §3 "created by mint, destroyed by burn").
    pub hotstore: Option<&'a HotStoreClient>,
}

async fn persist_removal(ctx: &ExecutionContext<'_>, position_id: &str) {
    let Some(hotstore) = ctx.hotstore else { return };
    if let Err(e) = hotstore.hdel(&keys::positions(ctx.pair_id), position_id).await {
        warn!(pair_id = %ctx.pair_id, position_id, error = %e, "failed to persist position removal");
    }
}

async fn persist_insert(ctx: &ExecutionContext<'_>, position: &Position) {
    let Some(hotstore) = ctx.hotstore else { return };
    if let Err(e) = hotstore.hset_json(&keys::positions(ctx.pair_id), &position.position_id, position).await {
        warn!(pair_id = %ctx.pair_id, position_id = %position.position_id, error = %e, "failed to persist minted position");
    }
}

/// Outcome of an execution pass: the TxLog entries it produced, and mint
/// count / burn count / positions-deleted, per §8 S3's assertion shape.
#[derive(Debug, Default)]
pub struct ExecutionOutcome {
    pub tx_logs: Vec<TxLog>,
    pub mint_count: u32,
    pub burn_count: u32,
    pub deleted_positions_count: u32,
}

impl ExecutionOutcome {
    fn push(&mut self, log: TxLog) {
        match log.op_type {
            TxOpType::Mint if log.status == TxStatus::Success => self.mint_count += 1,
            TxOpType::Burn if log.status == TxStatus::Success => self.burn_count += 1,
            _ => {}
        }
        self.tx_logs.push(log);
    }
}

fn backoff_delay(attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(10);
    Duration::from_millis(BURN_BACKOFF_BASE_MS.saturating_mul(1u64 << exponent))
}

/// Burn one position with retry-on-revert (§7 `TxReverted`, "retried for
/// burns (<= 3) not for mints by default").
async fn burn_with_retry(
    adapter: &dyn PositionAdapter,
    position: &Position,
    payer: &str,
) -> tendril_adapters::Result<tendril_adapters::BurnResult> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        let result = adapter.burn(position, payer).await?;
        if result.success {
            return Ok(result);
        }
        if attempt >= BURN_MAX_ATTEMPTS {
            return Ok(result);
        }
        tokio::time::sleep(backoff_delay(attempt)).await;
    }
}

fn burn_log(decision_type: TxDecisionType, result: &tendril_adapters::BurnResult, target_pct: f64, actual_pct: f64) -> TxLog {
    TxLog {
        decision_type,
        op_type: TxOpType::Burn,
        status: if result.success { TxStatus::Success } else { TxStatus::Reverted },
        gas_used: result.gas_used,
        gas_price: result.gas_price,
        target_allocation_pct: target_pct,
        actual_allocation_pct: actual_pct,
        allocation_error_pct: (target_pct - actual_pct).abs(),
    }
}

fn mint_log(decision_type: TxDecisionType, result: &tendril_adapters::MintResult, target_pct: f64) -> TxLog {
    let actual_pct = if result.position.is_some() { target_pct } else { 0.0 };
    TxLog {
        decision_type,
        op_type: TxOpType::Mint,
        status: if result.position.is_some() { TxStatus::Success } else { TxStatus::Reverted },
        gas_used: result.gas_used,
        gas_price: result.gas_price,
        target_allocation_pct: target_pct,
        actual_allocation_pct: actual_pct,
        allocation_error_pct: (target_pct - actual_pct).abs(),
    }
}

/// Token-ratio imbalance as a fraction of the pair's total value:
/// `|amount0 - amount1| / (amount0 + amount1)`. A perfectly balanced
/// 50/50 position is 0; fully one-sided is 1.
fn token_imbalance(amount0: Usd, amount1: Usd) -> f64 {
    let total = (amount0 + amount1).inner().to_f64().unwrap_or(0.0);
    if total <= 0.0 {
        return 0.0;
    }
    ((amount0.inner() - amount1.inner()).to_f64().unwrap_or(0.0) / total).abs()
}

/// Quote + verify + execute a swap to bring `pool`'s token ratio to target;
/// returns `Ok(())` when no swap was needed (imbalance under threshold).
async fn rebalance_pool_tokens(
    ctx: &ExecutionContext<'_>,
    target: &PoolTarget,
    amount0: Usd,
    imbalance_fraction: f64,
) -> Result<(), CycleFailure> {
    if imbalance_fraction <= SWAP_IMBALANCE_THRESHOLD {
        return Ok(());
    }

    let swap_amount = (amount0.inner().to_f64().unwrap_or(0.0) * imbalance_fraction).max(0.0);
    let request = QuoteRequest {
        from_chain: target.chain_id,
        to_chain: target.chain_id,
        from_token: target.token0.clone(),
        to_token: target.token1.clone(),
        amount: swap_amount as u128,
        payer: ctx.payer.to_string(),
        receiver: ctx.payer.to_string(),
        slippage_bps: 50,
    };

    let quote: Option<Quote> = ctx.swap_executor.quote(request).await.map_err(|e| CycleFailure::TransientNetwork {
        pair_id: ctx.pair_id.clone(),
        epoch: ctx.epoch,
        message: format!("swap quote for {}: {e}", target.pool_ref),
    })?;

    let Some(quote) = quote else {
        return Err(CycleFailure::Simulation {
            pair_id: ctx.pair_id.clone(),
            epoch: ctx.epoch,
            message: format!("no swap route for {}", target.pool_ref),
        });
    };

    let verified = ctx
        .swap_executor
        .verify_calldata(target.chain_id, &quote.data, ctx.payer, None)
        .await
        .map_err(|e| CycleFailure::Simulation {
            pair_id: ctx.pair_id.clone(),
            epoch: ctx.epoch,
            message: format!("calldata verification failed for {}: {e}", target.pool_ref),
        })?;

    if !verified {
        return Err(CycleFailure::Simulation {
            pair_id: ctx.pair_id.clone(),
            epoch: ctx.epoch,
            message: format!("swap calldata failed pre-execution verification for {}", target.pool_ref),
        });
    }

    Ok(())
}

/// RS execution: burn -> swap -> mint, per affected pool only (§4.1 "RS
/// execution contract").
pub async fn execute_rs(
    ctx: &ExecutionContext<'_>,
    shifts: &[RangeShift],
    targets: &[PoolTarget],
    positions: &mut PositionRegistry,
) -> Result<ExecutionOutcome, CycleFailure> {
    let mut outcome = ExecutionOutcome::default();

    for shift in shifts {
        let Some(target) = targets.iter().find(|t| t.pool_ref == shift.pool_ref) else {
            warn!(pool = %shift.pool_ref, "RS shift with no matching pool target, skipping");
            continue;
        };
        let adapter = ctx.adapters.get(target.dex_family).map_err(|e| CycleFailure::InvariantViolation {
            pair_id: ctx.pair_id.clone(),
            epoch: ctx.epoch,
            message: e.to_string(),
        })?;

        let position = positions.get(&shift.pool_ref).cloned().ok_or_else(|| CycleFailure::InvariantViolation {
            pair_id: ctx.pair_id.clone(),
            epoch: ctx.epoch,
            message: format!("RS targets {} with no open position", shift.pool_ref),
        })?;

        let burn_result = burn_with_retry(&*adapter, &position, ctx.payer).await.map_err(|e| CycleFailure::TxReverted {
            pair_id: ctx.pair_id.clone(),
            epoch: ctx.epoch,
            message: format!("burn failed for {}: {e}", shift.pool_ref),
        })?;
        outcome.push(burn_log(TxDecisionType::Rs, &burn_result, 1.0, if burn_result.success { 1.0 } else { 0.0 }));

        if !burn_result.success {
            warn!(pool = %shift.pool_ref, "burn reverted after retries, RS stops for this pool");
            continue;
        }
        let removed = positions.remove(&shift.pool_ref).map_err(|e| CycleFailure::InvariantViolation {
            pair_id: ctx.pair_id.clone(),
            epoch: ctx.epoch,
            message: e.to_string(),
        })?;
        persist_removal(ctx, &removed.position_id).await;
        outcome.deleted_positions_count += 1;

        rebalance_pool_tokens(ctx, target, burn_result.amount0, token_imbalance(burn_result.amount0, burn_result.amount1)).await?;

        let mint_result = adapter
            .mint(&shift.pool_ref, &shift.new_range, burn_result.amount0, burn_result.amount1, ctx.payer)
            .await
            .map_err(|e| CycleFailure::TxReverted {
                pair_id: ctx.pair_id.clone(),
                epoch: ctx.epoch,
                message: format!("mint failed for {}: {e}", shift.pool_ref),
            })?;
        outcome.push(mint_log(TxDecisionType::Rs, &mint_result, 1.0));

        if let Some(position) = mint_result.position {
            persist_insert(ctx, &position).await;
            positions.insert(position, ctx.epoch).map_err(|e| CycleFailure::InvariantViolation {
                pair_id: ctx.pair_id.clone(),
                epoch: ctx.epoch,
                message: e.to_string(),
            })?;
        }
        positions.record_action(&shift.pool_ref, ctx.epoch);
    }

    Ok(outcome)
}

/// PRA execution: burn all -> capture balances -> bridge surpluses ->
/// per-pool rebalance + mint (§4.1 "PRA execution contract").
pub async fn execute_pra(
    ctx: &ExecutionContext<'_>,
    target_allocations: &[AllocationEntry],
    targets: &[PoolTarget],
    ranges: &std::collections::HashMap<PoolRef, Range>,
    positions: &mut PositionRegistry,
) -> Result<ExecutionOutcome, CycleFailure> {
    let mut outcome = ExecutionOutcome::default();

    // Burn all existing positions first.
    let existing: Vec<Position> = positions.iter().cloned().collect();
    let mut captured_value = Usd::ZERO;
    for position in &existing {
        let adapter = ctx.adapters.get(position.dex_family).map_err(|e| CycleFailure::InvariantViolation {
            pair_id: ctx.pair_id.clone(),
            epoch: ctx.epoch,
            message: e.to_string(),
        })?;

        let burn_result = burn_with_retry(&*adapter, position, ctx.payer).await.map_err(|e| CycleFailure::TxReverted {
            pair_id: ctx.pair_id.clone(),
            epoch: ctx.epoch,
            message: format!("burn failed for {}: {e}", position.pool_ref),
        })?;
        outcome.push(burn_log(TxDecisionType::Pra, &burn_result, 0.0, if burn_result.success { 1.0 } else { 0.0 }));

        if !burn_result.success {
            error!(pool = %position.pool_ref, "PRA burn reverted after retries");
            continue;
        }
        let removed = positions.remove(&position.pool_ref).map_err(|e| CycleFailure::InvariantViolation {
            pair_id: ctx.pair_id.clone(),
            epoch: ctx.epoch,
            message: e.to_string(),
        })?;
        persist_removal(ctx, &removed.position_id).await;
        outcome.deleted_positions_count += 1;
        captured_value = captured_value + burn_result.amount0 + burn_result.amount1;
    }

    // Bridge surplus chains to deficit chains only once the amount that
    // needs to move exceeds 1% of portfolio value (§4.1 PRA execution
    // contract). Deficit is target-allocation value on a chain minus what
    // was captured there; anything under the threshold settles in-place.
    // Initiating the bridge transfer itself is the out-of-scope adapter
    // seam (§1 — no submission method exists on `SwapExecutor`); waiting
    // for arrival does, so it is awaited here with the §7 10-minute
    // `BridgeTimeout` budget before this chain's mints are allowed to
    // proceed.
    let chains: std::collections::HashSet<u64> = targets.iter().map(|t| t.chain_id).collect();
    let mut bridge_failed_chains = std::collections::HashSet::new();
    if chains.len() > 1 && captured_value.is_positive() {
        for &chain_id in &chains {
            let chain_target: f64 = target_allocations
                .iter()
                .filter(|e| targets.iter().any(|t| t.pool_ref == e.pool_ref && t.chain_id == chain_id))
                .map(|e| e.fraction)
                .sum();
            let chain_captured: Usd = existing
                .iter()
                .filter(|p| p.pool_ref.chain_id == chain_id)
                .fold(Usd::ZERO, |acc, p| acc + p.amount0 + p.amount1);
            let deficit = captured_value * Decimal::try_from(chain_target).unwrap_or(Decimal::ZERO) - chain_captured;
            let surplus_fraction = deficit.inner().to_f64().unwrap_or(0.0).abs() / captured_value.inner().to_f64().unwrap_or(1.0).max(1.0);
            if surplus_fraction <= BRIDGE_THRESHOLD_FRACTION {
                continue;
            }
            warn!(chain_id, surplus_fraction, "cross-chain surplus exceeds bridge threshold, awaiting arrival");
            let Some(token) = targets.iter().find(|t| t.chain_id == chain_id).map(|t| t.token0.clone()) else {
                continue;
            };
            let balance_before = chain_captured.inner().to_f64().unwrap_or(0.0) as u128;
            match ctx
                .swap_executor
                .wait_arrival(chain_id, &token, ctx.payer, balance_before, BRIDGE_WAIT_TIMEOUT)
                .await
            {
                Ok(arrived) => info!(chain_id, arrived, "bridge arrival confirmed"),
                Err(e) => {
                    warn!(chain_id, error = %e, "bridge arrival timed out, this chain's allocations abort for this epoch");
                    bridge_failed_chains.insert(chain_id);
                }
            }
        }
    }

    for entry in target_allocations {
        let Some(target) = targets.iter().find(|t| t.pool_ref == entry.pool_ref) else {
            warn!(pool = %entry.pool_ref, "allocation target with no pool target metadata, skipping mint");
            continue;
        };
        if bridge_failed_chains.contains(&target.chain_id) {
            warn!(pool = %entry.pool_ref, chain_id = target.chain_id, "skipping mint, bridge arrival timed out this epoch");
            continue;
        }
        let adapter = ctx.adapters.get(target.dex_family).map_err(|e| CycleFailure::InvariantViolation {
            pair_id: ctx.pair_id.clone(),
            epoch: ctx.epoch,
            message: e.to_string(),
        })?;
        let range = ranges.get(&entry.pool_ref).ok_or_else(|| CycleFailure::InvariantViolation {
            pair_id: ctx.pair_id.clone(),
            epoch: ctx.epoch,
            message: format!("no range computed for {}", entry.pool_ref),
        })?;

        let allocated = captured_value * Decimal::try_from(entry.fraction).unwrap_or(Decimal::ZERO);
        let amount0 = allocated / Decimal::from(2);
        let amount1 = allocated / Decimal::from(2);

        rebalance_pool_tokens(ctx, target, amount0, token_imbalance(amount0, amount1)).await?;

        let mint_result = adapter.mint(&entry.pool_ref, range, amount0, amount1, ctx.payer).await.map_err(|e| {
            CycleFailure::TxReverted {
                pair_id: ctx.pair_id.clone(),
                epoch: ctx.epoch,
                message: format!("mint failed for {}: {e}", entry.pool_ref),
            }
        })?;
        outcome.push(mint_log(TxDecisionType::Pra, &mint_result, entry.fraction));

        if let Some(position) = mint_result.position {
            persist_insert(ctx, &position).await;
            positions.insert(position, ctx.epoch).map_err(|e| CycleFailure::InvariantViolation {
                pair_id: ctx.pair_id.clone(),
                epoch: ctx.epoch,
                message: e.to_string(),
            })?;
        }
        positions.record_action(&entry.pool_ref, ctx.epoch);
    }

    Ok(outcome)
}

/// Dispatch a decision to its execution contract; `Hold` is a no-op.
/// `read_only` (no signing key) forces HOLD semantics regardless of the
/// decision (§4.1 step 8: "only with a signing key present").
pub async fn execute_decision(
    ctx: &ExecutionContext<'_>,
    decision: &Decision,
    targets: &[PoolTarget],
    pool_ranges: &std::collections::HashMap<PoolRef, Range>,
    positions: &mut PositionRegistry,
    read_only: bool,
) -> Result<ExecutionOutcome, CycleFailure> {
    if read_only || decision.is_hold() {
        return Ok(ExecutionOutcome::default());
    }

    match decision {
        Decision::Pra { target_allocations } => execute_pra(ctx, target_allocations, targets, pool_ranges, positions).await,
        Decision::Rs { range_shifts } => execute_rs(ctx, range_shifts, targets, positions).await,
        Decision::Hold { .. } => Ok(ExecutionOutcome::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::future::Future;
    use std::pin::Pin;
    use tendril_adapters::{BurnResult, MintResult};
    use tendril_core::{DexFamily, RangeKind, TickRange};

    struct AlwaysMintAdapter;
    impl PositionAdapter for AlwaysMintAdapter {
        fn mint(
            &self,
            pool_ref: &PoolRef,
            _range: &Range,
            amount0: Usd,
            amount1: Usd,
            _payer: &str,
        ) -> Pin<Box<dyn Future<Output = tendril_adapters::Result<MintResult>> + Send + '_>> {
            let pool_ref = pool_ref.clone();
            Box::pin(async move {
                Ok(MintResult {
                    position: Some(Position {
                        position_id: "pos-1".to_string(),
                        pool_ref,
                        dex_family: DexFamily::V3,
                        onchain_handle: "1".to_string(),
                        tick_range: TickRange { tick_lower: -60, tick_upper: 60 },
                        liquidity: 1_000,
                        amount0,
                        amount1,
                        entry_price: 1.0,
                        entry_time: chrono::DateTime::from_timestamp(0, 0).unwrap(),
                        entry_apr: 0.1,
                        entry_value_usd: amount0 + amount1,
                    }),
                    tx_hash: "0xmint".to_string(),
                    gas_used: 200_000,
                    gas_price: 30,
                })
            })
        }

        fn burn(
            &self,
            position: &Position,
            _payer: &str,
        ) -> Pin<Box<dyn Future<Output = tendril_adapters::Result<BurnResult>> + Send + '_>> {
            let amount0 = position.amount0;
            let amount1 = position.amount1;
            Box::pin(async move {
                Ok(BurnResult {
                    success: true,
                    amount0,
                    amount1,
                    tx_hash: "0xburn".to_string(),
                    gas_used: 150_000,
                    gas_price: 30,
                })
            })
        }

        fn read_tick_spacing(&self, _pool_ref: &PoolRef) -> Pin<Box<dyn Future<Output = tendril_adapters::Result<i32>> + Send + '_>> {
            Box::pin(async { Ok(60) })
        }

        fn read_fee(&self, _pool_ref: &PoolRef) -> Pin<Box<dyn Future<Output = tendril_adapters::Result<f64>> + Send + '_>> {
            Box::pin(async { Ok(0.0005) })
        }
    }

    struct NoopSwapExecutor;
    impl SwapExecutor for NoopSwapExecutor {
        fn quote(
            &self,
            _request: QuoteRequest,
        ) -> Pin<Box<dyn Future<Output = tendril_adapters::Result<Option<Quote>>> + Send + '_>> {
            Box::pin(async { Ok(None) })
        }
        fn verify_calldata(
            &self,
            _chain: u64,
            _data: &[u8],
            _expected_receiver: &str,
            _expected_dst_chain: Option<u64>,
        ) -> Pin<Box<dyn Future<Output = tendril_adapters::Result<bool>> + Send + '_>> {
            Box::pin(async { Ok(true) })
        }
        fn wait_arrival(
            &self,
            _chain: u64,
            _token: &str,
            _account: &str,
            balance_before: u128,
            _timeout: Duration,
        ) -> Pin<Box<dyn Future<Output = tendril_adapters::Result<u128>> + Send + '_>> {
            Box::pin(async move { Ok(balance_before) })
        }
    }

    fn sample_range() -> Range {
        Range {
            price_min: 0.95,
            price_max: 1.05,
            base_price: 1.0,
            breadth: 0.1,
            confidence: 0.5,
            trend_bias: 0.0,
            kind: RangeKind::Neutral,
        }
    }

    #[tokio::test]
    async fn test_pra_mints_and_tracks_outcome() {
        let mut registry = PositionAdapterRegistry::new();
        registry.register(DexFamily::V3, Arc::new(AlwaysMintAdapter));
        let swap = NoopSwapExecutor;
        let pair_id = PairId::new("USDC-USDT");
        let ctx = ExecutionContext {
            pair_id: &pair_id,
            epoch: 1,
            payer: "0xpayer",
            adapters: &registry,
            swap_executor: &swap,
            portfolio_value_usd: Usd::new(dec!(10000)),
            hotstore: None,
        };

        let pool_ref = PoolRef::new(1, "0xpool");
        let target = PoolTarget {
            pool_ref: pool_ref.clone(),
            dex_family: DexFamily::V3,
            chain_id: 1,
            token0: "USDC".to_string(),
            token1: "USDT".to_string(),
        };
        let allocations = vec![AllocationEntry { pool_ref: pool_ref.clone(), fraction: 1.0, expected_apr: 0.12 }];
        let mut ranges = std::collections::HashMap::new();
        ranges.insert(pool_ref.clone(), sample_range());
        let mut positions = PositionRegistry::new();

        let outcome = execute_pra(&ctx, &allocations, &[target], &ranges, &mut positions).await.unwrap();
        assert_eq!(outcome.mint_count, 1);
        assert_eq!(outcome.burn_count, 0);
        assert_eq!(positions.len(), 1);
    }

    #[tokio::test]
    async fn test_hold_decision_is_noop() {
        let mut registry = PositionAdapterRegistry::new();
        registry.register(DexFamily::V3, Arc::new(AlwaysMintAdapter));
        let swap = NoopSwapExecutor;
        let pair_id = PairId::new("USDC-USDT");
        let ctx = ExecutionContext {
            pair_id: &pair_id,
            epoch: 1,
            payer: "0xpayer",
            adapters: &registry,
            swap_executor: &swap,
            portfolio_value_usd: Usd::ZERO,
            hotstore: None,
        };
        let mut positions = PositionRegistry::new();
        let outcome = execute_decision(&ctx, &Decision::hold_unreasoned(), &[], &std::collections::HashMap::new(), &mut positions, false)
            .await
            .unwrap();
        assert_eq!(outcome.tx_logs.len(), 0);
    }

    #[tokio::test]
    async fn test_read_only_forces_noop_even_for_pra() {
        let mut registry = PositionAdapterRegistry::new();
        registry.register(DexFamily::V3, Arc::new(AlwaysMintAdapter));
        let swap = NoopSwapExecutor;
        let pair_id = PairId::new("USDC-USDT");
        let ctx = ExecutionContext {
            pair_id: &pair_id,
            epoch: 1,
            payer: "0xpayer",
            adapters: &registry,
            swap_executor: &swap,
            portfolio_value_usd: Usd::new(dec!(10000)),
            hotstore: None,
        };
        let pool_ref = PoolRef::new(1, "0xpool");
        let allocations = vec![AllocationEntry { pool_ref: pool_ref.clone(), fraction: 1.0, expected_apr: 0.12 }];
        let mut positions = PositionRegistry::new();
        let decision = Decision::Pra { target_allocations: allocations };
        let outcome = execute_decision(&ctx, &decision, &[], &std::collections::HashMap::new(), &mut positions, true)
            .await
            .unwrap();
        assert_eq!(outcome.tx_logs.len(), 0);
        assert!(positions.is_empty());
    }
}
