//! Wilder-smoothed RSI-like momentum force. 50 is neutral, matching the
//! standard RSI scale (no separate renormalization needed).

use crate::error::{ForcesError, Result};
use tendril_core::Candle;

/// M-force: RSI with Wilder smoothing over the trailing `lookback` candles.
pub fn m_force(candles: &[Candle], lookback: usize) -> Result<f64> {
    if candles.len() < lookback + 1 || lookback == 0 {
        return Err(ForcesError::InsufficientCandles {
            need: lookback + 1,
            got: candles.len(),
        });
    }
    let window = &candles[candles.len() - (lookback + 1)..];
    let changes: Vec<f64> = window.windows(2).map(|w| w[1].close - w[0].close).collect();

    let mut avg_gain = changes.iter().take(lookback).filter(|c| **c > 0.0).sum::<f64>() / lookback as f64;
    let mut avg_loss = changes.iter().take(lookback).filter(|c| **c < 0.0).map(|c| -c).sum::<f64>() / lookback as f64;

    // Wilder smoothing recurrence for any additional changes beyond the
    // initial seed window (present when `changes.len() > lookback`).
    for change in changes.iter().skip(lookback) {
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);
        avg_gain = (avg_gain * (lookback as f64 - 1.0) + gain) / lookback as f64;
        avg_loss = (avg_loss * (lookback as f64 - 1.0) + loss) / lookback as f64;
    }

    if avg_loss.abs() < f64::EPSILON {
        return Ok(100.0);
    }
    let rs = avg_gain / avg_loss;
    Ok(100.0 - (100.0 / (1.0 + rs)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rising_candles(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let price = 1.0 + (i as f64) * 0.001;
                Candle::new((i as i64) * 60_000, price, price, price, price, 100.0)
            })
            .collect()
    }

    fn falling_candles(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let price = 1.0 - (i as f64) * 0.001;
                Candle::new((i as i64) * 60_000, price, price, price, price, 100.0)
            })
            .collect()
    }

    #[test]
    fn test_rising_series_is_overbought() {
        let m = m_force(&rising_candles(30), 14).unwrap();
        assert!(m > 60.0, "expected strong momentum, got {m}");
    }

    #[test]
    fn test_falling_series_is_oversold() {
        let m = m_force(&falling_candles(30), 14).unwrap();
        assert!(m < 40.0, "expected weak momentum, got {m}");
    }

    #[test]
    fn test_flat_series_is_neutral() {
        let candles: Vec<Candle> = (0..30)
            .map(|i| Candle::new(i * 60_000, 1.0, 1.0, 1.0, 1.0, 100.0))
            .collect();
        let m = m_force(&candles, 14).unwrap();
        assert!((40.0..=60.0).contains(&m), "got {m}");
    }

    #[test]
    fn test_insufficient_candles_errs() {
        assert!(m_force(&rising_candles(5), 14).is_err());
    }
}
