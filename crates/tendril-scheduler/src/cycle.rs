//! The per-pair cycle engine (§4.1): one scheduler cycle, as a pipeline of
//! `CycleResult`-returning steps composed with `?` (§9 "Cycle control flow
//! without exceptions"). The top-level `run_cycle` never panics on a
//! non-Fatal failure; it folds the final outcome into a `Decision`.

use crate::config::PairConfig;
use crate::error::CycleFailure;
use futures::future::join_all;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tendril_adapters::MarketData;
use tendril_allocation::waterfill::{water_fill, PoolCandidate};
use tendril_allocation::{decide, PraCandidate, RsCandidate};
use tendril_core::{
    range_divergence, range_from_forces, Candle, Decision, Forces, OptimizerWarmStart, PairId,
    PoolRef, PoolSnapshot, Range, RegimeState, Usd,
};
use tendril_forces::composite::{composite_forces, TimeframeCandles};
use tendril_optimizer::killswitch::KillSwitchRegistry;
use tendril_optimizer::regime::{evaluate_regime, widen_threshold, RegimeInputs};
use tendril_optimizer::{fitness::FitnessConfig, optimize, simplex::SimplexConfig};
use tendril_position::PositionRegistry;
use tracing::{info_span, warn};

/// Minimum fraction of configured pools that must return a snapshot for the
/// cycle to proceed with partial data (§4.1 step 1).
const MIN_POOL_COVERAGE: f64 = 0.5;

/// Economic assumptions a cycle needs that the in-scope pure math doesn't
/// derive on its own: the available capital, gas/cost estimates, and
/// optimizer simulation parameters. Sourced by the worker from its
/// `MarketData`/balance-read collaborators (out of scope here) and threaded
/// through as an explicit input rather than re-fetched mid-pipeline.
#[derive(Debug, Clone)]
pub struct CycleEconomics {
    pub available_capital_usd: Usd,
    pub gas_estimate_usd: Usd,
    pub fitness_config: FitnessConfig,
    pub simplex_config: SimplexConfig,
    pub is_stable_pair: bool,
}

/// Per-pool candle history and the three composite timeframes, already
/// resolved by the `MarketData` collaborator (resampling is out of scope).
pub struct CyclePools<'a> {
    pub m15: &'a [Candle],
    pub h1: &'a [Candle],
    pub h4: &'a [Candle],
}

/// Outcome of one completed (non-aborted) cycle, handed to the worker for
/// execution, state publication, and telemetry.
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub decision: Decision,
    pub forces: Forces,
    pub warm_start: OptimizerWarmStart,
    pub regime: RegimeState,
    pub pool_ranges: HashMap<PoolRef, Range>,
    pub current_apr: f64,
    pub optimal_apr: f64,
}

/// Step 1: fetch candles and per-pool snapshots. Tolerates partial pool
/// failure as long as at least `MIN_POOL_COVERAGE` of configured pools
/// respond; otherwise the cycle aborts with `StaleData`.
pub async fn acquire_data(
    pair_id: &PairId,
    epoch: u64,
    config: &PairConfig,
    market_data: &dyn MarketData,
) -> Result<(Vec<Candle>, Vec<Candle>, Vec<Candle>, HashMap<PoolRef, PoolSnapshot>), CycleFailure> {
    let since_ms = 0;
    let limit = 500;

    let (m15, h1, h4) = tokio::join!(
        market_data.fetch_candles("m15", pair_id.as_str(), since_ms, limit),
        market_data.fetch_candles("h1", pair_id.as_str(), since_ms, limit),
        market_data.fetch_candles("h4", pair_id.as_str(), since_ms, limit),
    );

    let fail = |source: &str, e: tendril_adapters::AdapterError| CycleFailure::TransientNetwork {
        pair_id: pair_id.clone(),
        epoch,
        message: format!("{source} candles: {e}"),
    };
    let m15 = m15.map_err(|e| fail("m15", e))?;
    let h1 = h1.map_err(|e| fail("h1", e))?;
    let h4 = h4.map_err(|e| fail("h4", e))?;

    let snapshot_futs = config.pools.iter().map(|pool| {
        let pool_ref = PoolRef::new(pool.chain_id, pool.address.clone());
        async move {
            let result = market_data.fetch_pool(&pool_ref).await;
            (pool_ref, result)
        }
    });
    let results = join_all(snapshot_futs).await;

    let total = results.len();
    let mut snapshots = HashMap::with_capacity(total);
    for (pool_ref, result) in results {
        match result {
            Ok(snapshot) => {
                snapshots.insert(pool_ref, snapshot);
            }
            Err(e) => warn!(pool = %pool_ref, error = %e, "pool snapshot fetch failed"),
        }
    }

    if total == 0 || (snapshots.len() as f64 / total as f64) < MIN_POOL_COVERAGE {
        return Err(CycleFailure::StaleData {
            pair_id: pair_id.clone(),
            epoch,
            message: format!("{}/{} pools reporting, below {:.0}% coverage", snapshots.len(), total, MIN_POOL_COVERAGE * 100.0),
        });
    }

    Ok((m15, h1, h4))
        .map(|(m15, h1, h4)| (m15, h1, h4, snapshots))
}

/// Step 2: regime detection from trailing H1 candle statistics (§4.1 step
/// 2). Volatility spike / displacement suppress the optimizer and force
/// HOLD; a volume anomaly instead widens the RS/PRA thresholds.
pub fn compute_regime(prev: &RegimeState, h1: &[Candle], snapshots: &HashMap<PoolRef, PoolSnapshot>, config: &PairConfig, economics: &CycleEconomics) -> RegimeState {
    const TRAILING_WINDOW: usize = 24 * 30;
    const VOL_LOOKBACK: usize = 20;

    let window = if h1.len() > TRAILING_WINDOW { &h1[h1.len() - TRAILING_WINDOW..] } else { h1 };
    let samples: Vec<f64> = if window.len() > VOL_LOOKBACK {
        (VOL_LOOKBACK..window.len())
            .filter_map(|i| tendril_forces::parkinson_volatility(&window[..=i], VOL_LOOKBACK).ok())
            .collect()
    } else {
        Vec::new()
    };
    let mean_30d = if samples.is_empty() { 0.0 } else { samples.iter().sum::<f64>() / samples.len() as f64 };
    let std_30d = if samples.len() > 1 {
        let var = samples.iter().map(|s| (s - mean_30d).powi(2)).sum::<f64>() / (samples.len() - 1) as f64;
        var.sqrt()
    } else {
        0.0
    };
    let trailing_1h_vol = samples.last().copied().unwrap_or(0.0);

    let price_now = h1.last().map(|c| c.close).unwrap_or(1.0);
    let price_1h_ago = if h1.len() >= 2 { h1[h1.len() - 2].close } else { price_now };

    let cycle_volume: f64 = snapshots.values().map(|s| s.interval_volume_fallback()).sum();
    let mean_30d_epoch_volume = {
        const EPOCHS_PER_DAY: f64 = 96.0;
        let total_volume: f64 = snapshots.values().map(|s| s.volume_24h).sum();
        total_volume / EPOCHS_PER_DAY
    };

    let inputs = RegimeInputs {
        trailing_1h_parkinson_vol: trailing_1h_vol,
        mean_30d_parkinson_vol: mean_30d,
        std_30d_parkinson_vol: std_30d,
        price_now,
        price_1h_ago,
        is_stable_pair: economics.is_stable_pair,
        cycle_volume,
        mean_30d_epoch_volume,
    };
    let _ = config;
    evaluate_regime(prev, &inputs)
}

/// Step 3: composite forces across M15/H1/H4 (pure, deterministic).
pub fn compute_forces(pair_id: &PairId, epoch: u64, pools: &CyclePools) -> Result<Forces, CycleFailure> {
    composite_forces(&TimeframeCandles { m15: pools.m15, h1: pools.h1, h4: pools.h4 }).map_err(|e| {
        CycleFailure::StaleData {
            pair_id: pair_id.clone(),
            epoch,
            message: format!("insufficient candles for forces: {e}"),
        }
    })
}

/// Step 4: Nelder-Mead optimization, skipped entirely when the regime is
/// suppressed (§4.2 "Regime gating").
pub fn run_optimizer(
    pair_id: &PairId,
    epoch: u64,
    regime: &RegimeState,
    warm_start: &OptimizerWarmStart,
    candles: &[Candle],
    economics: &CycleEconomics,
) -> Result<OptimizerWarmStart, CycleFailure> {
    if regime.is_suppressed() {
        let defaults = tendril_optimizer::default_params();
        return Ok(OptimizerWarmStart::defaults(defaults, warm_start.fitness));
    }
    optimize(warm_start, candles, &economics.fitness_config, &economics.simplex_config).map_err(|e| {
        CycleFailure::InvariantViolation {
            pair_id: pair_id.clone(),
            epoch,
            message: format!("optimizer failed: {e}"),
        }
    })
}

/// Diluted APR used to rank and water-fill pools: annualized fee revenue at
/// full weight, `volume_24h * fee_fraction * 365 / tvl`.
fn diluted_apr(snapshot: &PoolSnapshot) -> f64 {
    if snapshot.tvl <= 0.0 {
        return 0.0;
    }
    snapshot.volume_24h * snapshot.fee_fraction * 365.0 / snapshot.tvl
}

/// Step 5: derive a per-pool `Range` from forces + optimized params. Pure;
/// tick alignment to the pool's on-chain spacing happens later, only for
/// pools actually being minted (§4.1 step 5).
pub fn range_geometry(snapshots: &HashMap<PoolRef, PoolSnapshot>, forces: &Forces, params: &tendril_core::RangeParams) -> HashMap<PoolRef, Range> {
    snapshots
        .iter()
        .map(|(pool_ref, snapshot)| (pool_ref.clone(), range_from_forces(snapshot.price, forces, params)))
        .collect()
}

/// Step 6: water-fill across the top-K pools by diluted APR.
pub fn water_fill_allocation(
    pair_id: &PairId,
    epoch: u64,
    snapshots: &HashMap<PoolRef, PoolSnapshot>,
    config: &PairConfig,
    economics: &CycleEconomics,
) -> Result<tendril_allocation::waterfill::WaterFillResult, CycleFailure> {
    let mut ranked: Vec<(&PoolRef, &PoolSnapshot)> = snapshots.iter().collect();
    ranked.sort_by(|a, b| diluted_apr(b.1).partial_cmp(&diluted_apr(a.1)).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(config.max_positions.max(1));

    let candidates: Vec<PoolCandidate> = ranked
        .into_iter()
        .map(|(pool_ref, snapshot)| PoolCandidate {
            pool_ref: pool_ref.clone(),
            diluted_apr: diluted_apr(snapshot),
            tvl: Usd::new(Decimal::try_from(snapshot.tvl).unwrap_or(Decimal::ZERO)),
        })
        .collect();

    water_fill(&candidates, economics.available_capital_usd).map_err(|e| CycleFailure::InvariantViolation {
        pair_id: pair_id.clone(),
        epoch,
        message: format!("water-fill failed: {e}"),
    })
}

/// Current blended APR of the pair's existing positions, weighted by entry
/// value; 0 when there are no positions yet (§4.1 S2 "PRA on first mint").
pub fn current_portfolio_apr(positions: &PositionRegistry) -> f64 {
    let total = positions.total_value_usd();
    if total.is_zero() {
        return 0.0;
    }
    let weighted: Decimal = positions
        .iter()
        .map(|p| p.entry_value_usd.inner() * Decimal::try_from(p.entry_apr).unwrap_or(Decimal::ZERO))
        .sum();
    (weighted / total.inner()).to_f64().unwrap_or(0.0)
}

/// Step 7: fold the PRA/RS triggers into a `Decision`, gated by cost and the
/// regime's widened thresholds.
#[allow(clippy::too_many_arguments)]
pub fn decide_cycle(
    config: &PairConfig,
    regime: &RegimeState,
    water_fill_result: &tendril_allocation::waterfill::WaterFillResult,
    current_apr: f64,
    positions: &PositionRegistry,
    pool_ranges: &HashMap<PoolRef, Range>,
    active_ranges: &HashMap<PoolRef, Range>,
    current_epoch: u64,
    economics: &CycleEconomics,
) -> Decision {
    let pra_threshold = widen_threshold(config.pra_threshold, regime);
    let rs_threshold = widen_threshold(config.rs_threshold, regime);

    let num_mints = water_fill_result.entries.len() as f64;
    let rebalance_gas_cost = economics.gas_estimate_usd * Decimal::try_from(num_mints.max(1.0) + positions.len() as f64).unwrap_or(Decimal::ONE);
    let gain_fraction = Decimal::try_from((water_fill_result.portfolio_apr - current_apr) / 365.0 * 7.0).unwrap_or(Decimal::ZERO);
    let projected_7day_gain = economics.available_capital_usd * gain_fraction;

    let pra = PraCandidate {
        portfolio_apr: water_fill_result.portfolio_apr,
        current_apr,
        pra_threshold,
        target_allocations: water_fill_result.entries.clone(),
        projected_7day_gain_usd: projected_7day_gain,
        rebalance_gas_cost_usd: rebalance_gas_cost,
    };

    let rs_candidates: Vec<RsCandidate> = positions
        .iter()
        .filter_map(|position| {
            let pool_ref = &position.pool_ref;
            let target = pool_ranges.get(pool_ref)?;
            let current = active_ranges.get(pool_ref).copied().unwrap_or(*target);
            let divergence = range_divergence(&current, target);
            let fee_loss_avoided = position.entry_value_usd * Decimal::try_from(divergence * 0.01).unwrap_or(Decimal::ZERO);
            Some(RsCandidate {
                pool_ref: pool_ref.clone(),
                old_range: current,
                new_range: *target,
                divergence,
                rs_threshold,
                projected_fee_loss_avoided_usd: fee_loss_avoided,
                gas_cost_usd: economics.gas_estimate_usd,
                holding_period_elapsed: positions.holding_period_elapsed(pool_ref, current_epoch),
            })
        })
        .collect();

    decide(Some(&pra), &rs_candidates)
}

/// Top-level cycle: composes steps 1-7. Execution (step 8) and publication
/// (step 9) are the worker's responsibility since they need the signing
/// key, adapter registry, and hot-store/telemetry handles this pure
/// pipeline doesn't own.
#[allow(clippy::too_many_arguments)]
pub async fn run_cycle(
    pair_id: &PairId,
    epoch: u64,
    config: &PairConfig,
    market_data: &dyn MarketData,
    positions: &PositionRegistry,
    active_ranges: &HashMap<PoolRef, Range>,
    warm_start: OptimizerWarmStart,
    regime: RegimeState,
    economics: &CycleEconomics,
) -> Result<CycleOutcome, CycleFailure> {
    let _span = info_span!("cycle", pair_id = %pair_id, epoch).entered();

    let (m15, h1, h4, snapshots) = acquire_data(pair_id, epoch, config, market_data).await?;
    let new_regime = compute_regime(&regime, &h1, &snapshots, config, economics);

    if new_regime.is_suppressed() {
        return Ok(CycleOutcome {
            decision: Decision::hold("regime_suppressed"),
            forces: Forces::NEUTRAL,
            warm_start,
            regime: new_regime,
            pool_ranges: HashMap::new(),
            current_apr: current_portfolio_apr(positions),
            optimal_apr: warm_start.fitness,
        });
    }

    let pools = CyclePools { m15: &m15, h1: &h1, h4: &h4 };
    let forces = compute_forces(pair_id, epoch, &pools)?;

    let new_warm_start = run_optimizer(pair_id, epoch, &new_regime, &warm_start, &h1, economics)?;
    let pool_ranges = range_geometry(&snapshots, &forces, &new_warm_start.params);

    let water_fill_result = water_fill_allocation(pair_id, epoch, &snapshots, config, economics)?;
    let current_apr = current_portfolio_apr(positions);

    let decision = decide_cycle(
        config,
        &new_regime,
        &water_fill_result,
        current_apr,
        positions,
        &pool_ranges,
        active_ranges,
        epoch,
        economics,
    );

    Ok(CycleOutcome {
        decision,
        forces,
        warm_start: new_warm_start.clone(),
        regime: new_regime,
        pool_ranges,
        current_apr,
        optimal_apr: new_warm_start.fitness,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolConfig;
    use std::future::Future;
    use std::pin::Pin;
    use tendril_core::DexFamily;

    struct FlatMarketData {
        price: f64,
        tvl: f64,
        volume_24h: f64,
        fee: f64,
    }

    impl MarketData for FlatMarketData {
        fn fetch_candles(
            &self,
            _source: &str,
            _symbol: &str,
            _since_ms: i64,
            limit: u32,
        ) -> Pin<Box<dyn Future<Output = tendril_adapters::Result<Vec<Candle>>> + Send + '_>> {
            let price = self.price;
            Box::pin(async move {
                Ok((0..limit.max(200))
                    .map(|i| Candle::new(i as i64 * 60_000, price, price * 1.0005, price * 0.9995, price, 1000.0))
                    .collect())
            })
        }

        fn fetch_pool(
            &self,
            pool_ref: &PoolRef,
        ) -> Pin<Box<dyn Future<Output = tendril_adapters::Result<PoolSnapshot>> + Send + '_>> {
            let snapshot = PoolSnapshot {
                pool_ref: pool_ref.clone(),
                timestamp_ms: 0,
                volume_24h: self.volume_24h,
                tvl: self.tvl,
                fee_fraction: self.fee,
                price: self.price,
                price_change_1h: 0.0,
                price_change_24h: 0.0,
            };
            Box::pin(async move { Ok(snapshot) })
        }
    }

    fn config_with_pools(n: usize) -> PairConfig {
        PairConfig {
            pair_id: PairId::new("USDC-USDT"),
            pools: (0..n)
                .map(|i| PoolConfig { chain_id: 1, address: format!("0xpool{i}"), dex_family: DexFamily::V3 })
                .collect(),
            ..PairConfig::default()
        }
    }

    fn economics() -> CycleEconomics {
        CycleEconomics {
            available_capital_usd: Usd::new(Decimal::from(10_000)),
            gas_estimate_usd: Usd::new(Decimal::from(2)),
            fitness_config: FitnessConfig::default(),
            simplex_config: SimplexConfig::default(),
            is_stable_pair: true,
        }
    }

    #[tokio::test]
    async fn test_s1_hold_on_stable_prices() {
        // S1: stable market, no positions -> expected fee gain too small
        // vs gas gate, cycle resolves HOLD.
        let market = FlatMarketData { price: 1.0, tvl: 5_000_000.0, volume_24h: 500_000.0, fee: 0.0005 };
        let config = config_with_pools(1);
        let positions = PositionRegistry::new();
        let outcome = run_cycle(
            &PairId::new("USDC-USDT"),
            1,
            &config,
            &market,
            &positions,
            &HashMap::new(),
            OptimizerWarmStart::defaults(tendril_optimizer::default_params(), f64::NEG_INFINITY),
            RegimeState::normal(),
            &CycleEconomics { available_capital_usd: Usd::new(Decimal::from(100)), ..economics() },
        )
        .await
        .unwrap();

        assert!(outcome.forces.v < 10.0);
        assert!((40.0..=60.0).contains(&outcome.forces.m));
        assert!((40.0..=60.0).contains(&outcome.forces.t));
        assert!(outcome.decision.is_hold(), "expected HOLD, got {:?}", outcome.decision);
    }

    #[tokio::test]
    async fn test_s2_pra_on_first_mint() {
        // S2: same stable market but with enough capital that the cost
        // gate clears on the very first allocation.
        let market = FlatMarketData { price: 1.0, tvl: 5_000_000.0, volume_24h: 500_000.0, fee: 0.0005 };
        let config = config_with_pools(1);
        let positions = PositionRegistry::new();
        let outcome = run_cycle(
            &PairId::new("USDC-USDT"),
            1,
            &config,
            &market,
            &positions,
            &HashMap::new(),
            OptimizerWarmStart::defaults(tendril_optimizer::default_params(), f64::NEG_INFINITY),
            RegimeState::normal(),
            &CycleEconomics { available_capital_usd: Usd::new(Decimal::from(10_000)), gas_estimate_usd: Usd::new(Decimal::from(2)), ..economics() },
        )
        .await
        .unwrap();

        match outcome.decision {
            Decision::Pra { target_allocations } => {
                assert_eq!(target_allocations.len(), 1);
                assert!((target_allocations[0].fraction - 1.0).abs() < 1e-6);
            }
            other => panic!("expected PRA, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stale_data_below_50pct_coverage() {
        struct FailingMarketData;
        impl MarketData for FailingMarketData {
            fn fetch_candles(
                &self,
                _source: &str,
                _symbol: &str,
                _since_ms: i64,
                limit: u32,
            ) -> Pin<Box<dyn Future<Output = tendril_adapters::Result<Vec<Candle>>> + Send + '_>> {
                Box::pin(async move {
                    Ok((0..limit.max(200)).map(|i| Candle::new(i as i64 * 60_000, 1.0, 1.001, 0.999, 1.0, 1000.0)).collect())
                })
            }
            fn fetch_pool(
                &self,
                _pool_ref: &PoolRef,
            ) -> Pin<Box<dyn Future<Output = tendril_adapters::Result<PoolSnapshot>> + Send + '_>> {
                Box::pin(async move { Err(tendril_adapters::AdapterError::MarketData("timeout".into())) })
            }
        }

        let market = FailingMarketData;
        let config = config_with_pools(2);
        let positions = PositionRegistry::new();
        let err = run_cycle(
            &PairId::new("USDC-USDT"),
            1,
            &config,
            &market,
            &positions,
            &HashMap::new(),
            OptimizerWarmStart::defaults(tendril_optimizer::default_params(), f64::NEG_INFINITY),
            RegimeState::normal(),
            &economics(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.reason_code(), "stale_data");
    }

    #[tokio::test]
    async fn test_exactly_50pct_coverage_proceeds() {
        struct HalfFailingMarketData;
        impl MarketData for HalfFailingMarketData {
            fn fetch_candles(
                &self,
                _source: &str,
                _symbol: &str,
                _since_ms: i64,
                limit: u32,
            ) -> Pin<Box<dyn Future<Output = tendril_adapters::Result<Vec<Candle>>> + Send + '_>> {
                Box::pin(async move {
                    Ok((0..limit.max(200)).map(|i| Candle::new(i as i64 * 60_000, 1.0, 1.001, 0.999, 1.0, 1000.0)).collect())
                })
            }
            fn fetch_pool(
                &self,
                pool_ref: &PoolRef,
            ) -> Pin<Box<dyn Future<Output = tendril_adapters::Result<PoolSnapshot>> + Send + '_>> {
                let addr = pool_ref.address.clone();
                let pool_ref = pool_ref.clone();
                Box::pin(async move {
                    if addr.ends_with('0') {
                        Ok(PoolSnapshot {
                            pool_ref,
                            timestamp_ms: 0,
                            volume_24h: 500_000.0,
                            tvl: 5_000_000.0,
                            fee_fraction: 0.0005,
                            price: 1.0,
                            price_change_1h: 0.0,
                            price_change_24h: 0.0,
                        })
                    } else {
                        Err(tendril_adapters::AdapterError::MarketData("timeout".into()))
                    }
                })
            }
        }

        let market = HalfFailingMarketData;
        let config = config_with_pools(2);
        let positions = PositionRegistry::new();
        let result = run_cycle(
            &PairId::new("USDC-USDT"),
            1,
            &config,
            &market,
            &positions,
            &HashMap::new(),
            OptimizerWarmStart::defaults(tendril_optimizer::default_params(), f64::NEG_INFINITY),
            RegimeState::normal(),
            &economics(),
        )
        .await;
        assert!(result.is_ok(), "50% coverage should proceed, got {result:?}");
    }
}
