//! The three scalar "forces" (volatility, momentum, trend) that summarize a
//! pair's current price regime. Computation lives in `tendril-forces`; this
//! module only holds the data type they produce.

use serde::{Deserialize, Serialize};

/// Volatility / momentum / trend triple, each in `[0, 100]`. 50 is neutral
/// for momentum and trend; volatility has no neutral point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Forces {
    pub v: f64,
    pub m: f64,
    pub t: f64,
}

impl Forces {
    pub const NEUTRAL: Self = Self {
        v: 0.0,
        m: 50.0,
        t: 50.0,
    };

    pub fn new(v: f64, m: f64, t: f64) -> Self {
        Self { v, m, t }
    }

    /// True iff all three components fall within `[0, 100]`.
    pub fn in_bounds(&self) -> bool {
        let ok = |x: f64| (0.0..=100.0).contains(&x);
        ok(self.v) && ok(self.m) && ok(self.t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_in_bounds() {
        assert!(Forces::NEUTRAL.in_bounds());
    }

    #[test]
    fn test_out_of_bounds() {
        assert!(!Forces::new(-1.0, 50.0, 50.0).in_bounds());
        assert!(!Forces::new(50.0, 101.0, 50.0).in_bounds());
    }
}
