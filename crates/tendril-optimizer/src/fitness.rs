//! Fitness function: simulates fee APR, continuous LVR, and rebalance cost
//! over a historical candle window for a candidate `RangeParams` vector,
//! then rejects overfit candidates whose out-of-sample fitness collapses
//! relative to the in-sample fitness.

use crate::error::{OptimizerError, Result};
use tendril_core::{range_divergence, range_from_forces, Candle, Forces, Range, RangeParams};
use tendril_forces::{parkinson_volatility, t_force, v_force};

const SWAP_FRICTION: f64 = 0.001;
const SECONDS_PER_YEAR: f64 = 31_557_600.0;
const MIN_RS_EPOCH_GAP: usize = 4;
const V_LOOKBACK: usize = 20;
const T_SHORT_LOOKBACK: usize = 10;
const T_LONG_LOOKBACK: usize = 40;
const TRAIN_FRACTION: f64 = 0.8;
const VALIDATION_RATIO_GATE: f64 = 0.8;

fn min_candles_needed() -> usize {
    T_LONG_LOOKBACK.max(V_LOOKBACK) + 1
}

/// Externalized simulation constants: position economics assumed for the
/// fee/cost simulation. Tuned per pair, not hardcoded inside the loop.
#[derive(Debug, Clone, Copy)]
pub struct FitnessConfig {
    pub base_apr: f64,
    pub gas_usd: f64,
    pub fee: f64,
    pub position_value: f64,
    pub epoch_seconds: f64,
}

impl Default for FitnessConfig {
    fn default() -> Self {
        Self {
            base_apr: 0.2,
            gas_usd: 2.0,
            fee: 0.0005,
            position_value: 10_000.0,
            epoch_seconds: 900.0,
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn epoch_forces(candles: &[Candle], idx: usize) -> Result<Forces> {
    let v = v_force(&candles[..=idx], V_LOOKBACK)?;
    let t = t_force(&candles[..=idx], T_SHORT_LOOKBACK, T_LONG_LOOKBACK)?;
    Ok(Forces { v, m: 50.0, t })
}

/// Simulate epochs `[eval_start, eval_end)` of `candles`, using earlier
/// candles only as lookback warm-up, and return the window's net yield.
fn simulate_window(
    params: &RangeParams,
    candles: &[Candle],
    eval_start: usize,
    eval_end: usize,
    config: &FitnessConfig,
) -> Result<f64> {
    let dt_years = config.epoch_seconds / SECONDS_PER_YEAR;
    let mut current_range: Option<Range> = None;
    let mut last_shift_idx = eval_start;
    let mut fee_aprs = Vec::with_capacity(eval_end - eval_start);
    let mut lvrs = Vec::with_capacity(eval_end - eval_start);
    let mut costs = Vec::with_capacity(eval_end - eval_start);

    for idx in eval_start..eval_end {
        let price = candles[idx].close;
        let forces = epoch_forces(candles, idx)?;
        let candidate = range_from_forces(price, &forces, params);

        let mut cost = 0.0;
        match &current_range {
            None => {
                current_range = Some(candidate);
                last_shift_idx = idx;
            }
            Some(cur) => {
                let divergence = range_divergence(cur, &candidate);
                if divergence >= params.rs_threshold && idx - last_shift_idx >= MIN_RS_EPOCH_GAP {
                    cost = config.gas_usd
                        + (2.0 * config.fee + SWAP_FRICTION) * (1.0 + forces.v / 100.0) * config.position_value;
                    current_range = Some(candidate);
                    last_shift_idx = idx;
                }
            }
        }

        let active = current_range.as_ref().expect("set above");
        let (p_low, p_high) = (active.price_min, active.price_max);
        let width = (p_high.sqrt() - p_low.sqrt()).max(f64::MIN_POSITIVE);

        let fee_apr = if (p_low..=p_high).contains(&price) {
            config.base_apr / width
        } else {
            0.0
        };

        let sigma = parkinson_volatility(&candles[..=idx], V_LOOKBACK)?;
        let lvr = (sigma * sigma / 2.0) * price.sqrt() / width * dt_years;

        fee_aprs.push(fee_apr);
        lvrs.push(lvr);
        costs.push(cost);
    }

    let mean_fee_apr = mean(&fee_aprs);
    let mean_lvr = mean(&lvrs);
    let mean_cost = mean(&costs);

    let annualized_lvr = if dt_years > 0.0 { mean_lvr / dt_years } else { 0.0 };
    let annualized_cost = if dt_years > 0.0 {
        (mean_cost / config.position_value) / dt_years
    } else {
        0.0
    };

    Ok(mean_fee_apr - annualized_lvr - annualized_cost)
}

/// Train/validation fitness: trains on the first 80% of `candles`, validates
/// on the last 20%. Rejects (returns `f64::NEG_INFINITY`) if the validation
/// fitness falls below 80% of the training fitness. The final fitness is the
/// validation fitness.
pub fn fitness(params: &RangeParams, candles: &[Candle], config: &FitnessConfig) -> Result<f64> {
    let min_needed = min_candles_needed();
    let total = candles.len();
    if total < min_needed + 5 {
        return Err(OptimizerError::InsufficientWindow {
            need: min_needed + 5,
            got: total,
        });
    }

    let split_idx = ((total as f64) * TRAIN_FRACTION) as usize;
    let split_idx = split_idx.max(min_needed);

    let train_fit = simulate_window(params, candles, min_needed - 1, split_idx, config)?;
    let val_fit = simulate_window(params, candles, split_idx, total, config)?;

    if val_fit < VALIDATION_RATIO_GATE * train_fit {
        return Ok(f64::NEG_INFINITY);
    }
    Ok(val_fit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::default_params;

    fn stable_candles(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| Candle::new(i as i64 * 60_000, 1.0, 1.001, 0.999, 1.0, 1000.0))
            .collect()
    }

    #[test]
    fn test_fitness_on_stable_market_is_finite() {
        let candles = stable_candles(120);
        let f = fitness(&default_params(), &candles, &FitnessConfig::default()).unwrap();
        assert!(f.is_finite(), "expected a finite fitness, got {f}");
    }

    #[test]
    fn test_insufficient_candles_errs() {
        let candles = stable_candles(10);
        assert!(fitness(&default_params(), &candles, &FitnessConfig::default()).is_err());
    }

    #[test]
    fn test_validation_gate_boundary_is_inclusive() {
        let train_fit = 1.0;
        assert!(!(VALIDATION_RATIO_GATE * train_fit < VALIDATION_RATIO_GATE * train_fit));
        assert!(0.7999 * train_fit < VALIDATION_RATIO_GATE * train_fit);
    }
}
