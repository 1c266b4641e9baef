//! MA-cross trend force. 50 is neutral (short MA == long MA); values above
//! 50 indicate an uptrend bias, below 50 a downtrend bias.

use crate::error::{ForcesError, Result};
use tendril_core::Candle;

/// Scale mapping the short/long MA ratio's deviation from 1.0 onto the
/// `[0, 100]` T-force range around the neutral midpoint of 50.
const T_FORCE_SCALE: f64 = 2000.0;

fn simple_moving_average(candles: &[Candle], lookback: usize) -> Result<f64> {
    if candles.len() < lookback || lookback == 0 {
        return Err(ForcesError::InsufficientCandles {
            need: lookback.max(1),
            got: candles.len(),
        });
    }
    let window = &candles[candles.len() - lookback..];
    Ok(window.iter().map(|c| c.close).sum::<f64>() / lookback as f64)
}

/// T-force: ratio of a short-period MA to a long-period MA, centered on 50.
pub fn t_force(candles: &[Candle], short_lookback: usize, long_lookback: usize) -> Result<f64> {
    if short_lookback >= long_lookback {
        return Err(ForcesError::UnorderedCandles);
    }
    let short_ma = simple_moving_average(candles, short_lookback)?;
    let long_ma = simple_moving_average(candles, long_lookback)?;
    if long_ma.abs() < f64::EPSILON {
        return Ok(50.0);
    }
    let deviation = (short_ma - long_ma) / long_ma;
    Ok((50.0 + deviation * T_FORCE_SCALE).clamp(0.0, 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rising_candles(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let price = 1.0 + (i as f64) * 0.002;
                Candle::new((i as i64) * 60_000, price, price, price, price, 100.0)
            })
            .collect()
    }

    fn falling_candles(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let price = 1.0 - (i as f64) * 0.002;
                Candle::new((i as i64) * 60_000, price, price, price, price, 100.0)
            })
            .collect()
    }

    #[test]
    fn test_uptrend_above_neutral() {
        let t = t_force(&rising_candles(60), 10, 40).unwrap();
        assert!(t > 50.0, "expected uptrend bias, got {t}");
    }

    #[test]
    fn test_downtrend_below_neutral() {
        let t = t_force(&falling_candles(60), 10, 40).unwrap();
        assert!(t < 50.0, "expected downtrend bias, got {t}");
    }

    #[test]
    fn test_flat_series_is_neutral() {
        let candles: Vec<Candle> = (0..60)
            .map(|i| Candle::new(i * 60_000, 1.0, 1.0, 1.0, 1.0, 100.0))
            .collect();
        let t = t_force(&candles, 10, 40).unwrap();
        assert!((t - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_insufficient_candles_errs() {
        assert!(t_force(&rising_candles(5), 10, 40).is_err());
    }

    #[test]
    fn test_short_must_be_less_than_long() {
        assert!(t_force(&rising_candles(60), 40, 10).is_err());
    }

    #[test]
    fn test_bounded() {
        let extreme: Vec<Candle> = (0..60)
            .map(|i| {
                let price = 1.0 + (i as f64) * 0.05;
                Candle::new(i * 60_000, price, price, price, price, 100.0)
            })
            .collect();
        let t = t_force(&extreme, 10, 40).unwrap();
        assert!((0.0..=100.0).contains(&t));
    }
}
