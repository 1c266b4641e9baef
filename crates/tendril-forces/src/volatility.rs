//! Parkinson volatility estimator: an extreme-value estimator using H/L
//! ratios, more statistically efficient than close-to-close. Normalized to
//! the `[0, 100]` V-force scale.
//!
//! Rolling-window bookkeeping mirrors the wick-tracker pattern used
//! elsewhere in this stack: a fixed-size trailing sample buffer with a
//! minimum-sample gate before stats are considered valid.

use crate::error::{ForcesError, Result};
use tendril_core::Candle;

/// `1 / (4 * ln 2)`, the Parkinson estimator's normalizing constant.
const PARKINSON_CONST: f64 = 0.3606737602222409;

/// Scale mapping a raw (non-annualized) Parkinson standard deviation to the
/// `[0, 100]` V-force range. Calibrated so a stable pair trading within
/// ±0.05% typically sits under V=10 (see S1 in the testable-properties
/// scenarios), while a 2% swing saturates near 100.
const V_FORCE_SCALE: f64 = 5000.0;

/// Raw (non-annualized) Parkinson variance over the trailing `lookback`
/// candles: `mean((ln(H/L))^2) / (4 ln 2)`.
pub fn parkinson_variance(candles: &[Candle], lookback: usize) -> Result<f64> {
    if candles.len() < lookback || lookback == 0 {
        return Err(ForcesError::InsufficientCandles {
            need: lookback.max(1),
            got: candles.len(),
        });
    }
    let window = &candles[candles.len() - lookback..];
    let sum_sq_log_hl: f64 = window
        .iter()
        .map(|c| {
            let ratio = c.hl_ratio().max(f64::MIN_POSITIVE);
            ratio.ln().powi(2)
        })
        .sum();
    Ok(PARKINSON_CONST * sum_sq_log_hl / lookback as f64)
}

/// Parkinson volatility (standard deviation) over the trailing window.
pub fn parkinson_volatility(candles: &[Candle], lookback: usize) -> Result<f64> {
    Ok(parkinson_variance(candles, lookback)?.sqrt())
}

/// V-force: Parkinson volatility normalized into `[0, 100]`.
pub fn v_force(candles: &[Candle], lookback: usize) -> Result<f64> {
    let vol = parkinson_volatility(candles, lookback)?;
    Ok((vol * V_FORCE_SCALE).min(100.0).max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_candles(n: usize, price: f64) -> Vec<Candle> {
        (0..n)
            .map(|i| Candle::new((i as i64) * 60_000, price, price, price, price, 100.0))
            .collect()
    }

    #[test]
    fn test_flat_series_has_zero_volatility() {
        let candles = flat_candles(30, 1.0);
        let vol = parkinson_volatility(&candles, 20).unwrap();
        assert!(vol.abs() < 1e-9);
    }

    #[test]
    fn test_insufficient_candles_errs() {
        let candles = flat_candles(5, 1.0);
        assert!(parkinson_volatility(&candles, 20).is_err());
    }

    #[test]
    fn test_wider_wicks_increase_vforce() {
        let tight: Vec<Candle> = (0..20)
            .map(|i| Candle::new(i * 60_000, 1.0, 1.0005, 0.9995, 1.0, 100.0))
            .collect();
        let wide: Vec<Candle> = (0..20)
            .map(|i| Candle::new(i * 60_000, 1.0, 1.05, 0.95, 1.0, 100.0))
            .collect();
        let v_tight = v_force(&tight, 20).unwrap();
        let v_wide = v_force(&wide, 20).unwrap();
        assert!(v_wide > v_tight);
    }

    #[test]
    fn test_v_force_bounded() {
        let extreme: Vec<Candle> = (0..20)
            .map(|i| Candle::new(i * 60_000, 1.0, 100.0, 0.01, 1.0, 100.0))
            .collect();
        let v = v_force(&extreme, 20).unwrap();
        assert!((0.0..=100.0).contains(&v));
    }
}
