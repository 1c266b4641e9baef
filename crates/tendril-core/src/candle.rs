//! OHLCV candle, as produced by `MarketData`.

use serde::{Deserialize, Serialize};

/// A single minute-aligned OHLCV bar.
///
/// Candle series are read-only once produced; force computation is a
/// one-pass walk over a finite, chronologically strictly increasing sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp_ms: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(timestamp_ms: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp_ms,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// High/low ratio used by the Parkinson volatility estimator.
    #[inline]
    pub fn hl_ratio(&self) -> f64 {
        if self.low <= 0.0 {
            return 1.0;
        }
        self.high / self.low
    }
}

/// Validates that a candle series is chronologically strictly increasing.
pub fn is_strictly_increasing(candles: &[Candle]) -> bool {
    candles
        .windows(2)
        .all(|w| w[1].timestamp_ms > w[0].timestamp_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hl_ratio() {
        let c = Candle::new(0, 1.0, 1.1, 0.9, 1.0, 100.0);
        assert!((c.hl_ratio() - (1.1 / 0.9)).abs() < 1e-9);
    }

    #[test]
    fn test_strictly_increasing() {
        let a = Candle::new(1000, 1.0, 1.0, 1.0, 1.0, 1.0);
        let b = Candle::new(2000, 1.0, 1.0, 1.0, 1.0, 1.0);
        assert!(is_strictly_increasing(&[a, b]));
        assert!(!is_strictly_increasing(&[b, a]));
        assert!(!is_strictly_increasing(&[a, a]));
    }
}
