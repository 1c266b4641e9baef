//! Range parameters and the concrete per-pool `Range` derived from them.

use crate::forces::Forces;
use serde::{Deserialize, Serialize};

/// The 5 parameters tuned by the optimizer. Bounds are declared alongside
/// the optimizer's parameter-space definition in `tendril-optimizer`, not
/// here — this type is pure data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeParams {
    pub base_min: f64,
    pub base_max: f64,
    pub vforce_exp: f64,
    pub vforce_divider: f64,
    pub rs_threshold: f64,
}

impl RangeParams {
    pub fn as_vector(&self) -> [f64; 5] {
        [
            self.base_min,
            self.base_max,
            self.vforce_exp,
            self.vforce_divider,
            self.rs_threshold,
        ]
    }

    pub fn from_vector(v: [f64; 5]) -> Self {
        Self {
            base_min: v[0],
            base_max: v[1],
            vforce_exp: v[2],
            vforce_divider: v[3],
            rs_threshold: v[4],
        }
    }
}

/// Qualitative bias of a computed range relative to the current price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeKind {
    Bullish,
    Bearish,
    Neutral,
}

/// A concrete price range produced from current price + Forces + RangeParams,
/// before tick alignment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub price_min: f64,
    pub price_max: f64,
    pub base_price: f64,
    pub breadth: f64,
    pub confidence: f64,
    pub trend_bias: f64,
    pub kind: RangeKind,
}

impl Range {
    /// Invariant checked by S8.2: min > 0, max > min, breadth in (0, 1).
    pub fn is_valid(&self) -> bool {
        self.price_min > 0.0 && self.price_max > self.price_min && self.breadth > 0.0 && self.breadth < 1.0
    }

    /// `(R_c, centerPrice)` used by range-divergence computation: the half
    /// breadth and the midpoint of this range.
    pub fn size_and_center(&self) -> (f64, f64) {
        let size = self.price_max - self.price_min;
        let center = (self.price_max + self.price_min) / 2.0;
        (size, center)
    }
}

/// A tick-aligned range ready to mint on-chain. Alignment always widens: the
/// lower tick rounds down, the upper tick rounds up, so the on-chain range is
/// never narrower than the computed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickRange {
    pub tick_lower: i32,
    pub tick_upper: i32,
}

impl TickRange {
    pub fn from_price_range(price_min: f64, price_max: f64, tick_spacing: i32, price_to_tick: impl Fn(f64) -> f64) -> Self {
        let raw_lower = price_to_tick(price_min);
        let raw_upper = price_to_tick(price_max);
        let spacing = tick_spacing as f64;
        let tick_lower = (raw_lower / spacing).floor() as i32 * tick_spacing;
        let tick_upper = (raw_upper / spacing).ceil() as i32 * tick_spacing;
        Self { tick_lower, tick_upper }
    }

    pub fn is_valid(&self) -> bool {
        self.tick_lower < self.tick_upper
    }
}

/// Derive a concrete `Range` from the current base price, the composite
/// forces, and a candidate `RangeParams` vector. Shared by the optimizer's
/// fitness simulation and the allocation crate's range-geometry step so both
/// score the exact same geometry. Volatility (`v`) widens the breadth
/// between `base_min` and `base_max`; trend (`t`) skews the range toward the
/// trending side; momentum does not directly affect geometry.
pub fn range_from_forces(base_price: f64, forces: &Forces, params: &RangeParams) -> Range {
    let widen = (forces.v / params.vforce_divider.max(f64::MIN_POSITIVE))
        .max(0.0)
        .powf(params.vforce_exp);
    let breadth = (params.base_min + widen).clamp(params.base_min, params.base_max);

    let trend_bias = ((forces.t - 50.0) / 50.0).clamp(-1.0, 1.0);
    let lower_half = breadth / 2.0 * (1.0 - trend_bias * 0.5);
    let upper_half = breadth / 2.0 * (1.0 + trend_bias * 0.5);

    let kind = if trend_bias > 0.1 {
        RangeKind::Bullish
    } else if trend_bias < -0.1 {
        RangeKind::Bearish
    } else {
        RangeKind::Neutral
    };

    Range {
        price_min: base_price * (1.0 - lower_half),
        price_max: base_price * (1.0 + upper_half),
        base_price,
        breadth,
        confidence: (1.0 - forces.v / 100.0).clamp(0.0, 1.0),
        trend_bias,
        kind,
    }
}

/// `sizeDiff + centerDiff` clamped to 1, comparing a current range to a
/// target range (§4.1 "Decision: range divergence").
pub fn range_divergence(current: &Range, target: &Range) -> f64 {
    let (r_c, c_c) = current.size_and_center();
    let (r_t, c_t) = target.size_and_center();
    if r_c <= 0.0 {
        return 1.0;
    }
    let size_diff = (r_c - r_t).abs() / r_c;
    let center_diff = (c_c - c_t).abs() / r_c;
    (size_diff + center_diff).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_range(price_min: f64, price_max: f64) -> Range {
        Range {
            price_min,
            price_max,
            base_price: (price_min + price_max) / 2.0,
            breadth: 0.1,
            confidence: 0.5,
            trend_bias: 0.0,
            kind: RangeKind::Neutral,
        }
    }

    #[test]
    fn test_range_valid() {
        assert!(sample_range(0.95, 1.05).is_valid());
        let invalid = Range {
            breadth: 1.5,
            ..sample_range(0.95, 1.05)
        };
        assert!(!invalid.is_valid());
    }

    #[test]
    fn test_tick_range_rounds_outward() {
        // identity price->tick mapping so floor/ceil behavior is checked directly
        let lower_raw = -61.0;
        let upper_raw = 61.0;
        let tr = TickRange::from_price_range(lower_raw, upper_raw, 60, |p| p);
        assert_eq!(tr.tick_lower, -120);
        assert_eq!(tr.tick_upper, 120);
        assert!(tr.is_valid());
    }

    #[test]
    fn test_range_divergence_zero_when_equal() {
        let r = sample_range(0.95, 1.05);
        assert_eq!(range_divergence(&r, &r), 0.0);
    }

    #[test]
    fn test_range_divergence_clamped_to_one() {
        let current = sample_range(0.999, 1.001);
        let target = sample_range(0.0, 100.0);
        assert_eq!(range_divergence(&current, &target), 1.0);
    }

    #[test]
    fn test_range_from_forces_widens_with_volatility() {
        let params = RangeParams {
            base_min: 0.01,
            base_max: 0.2,
            vforce_exp: 1.0,
            vforce_divider: 100.0,
            rs_threshold: 0.25,
        };
        let calm = Forces { v: 1.0, m: 50.0, t: 50.0 };
        let wild = Forces { v: 80.0, m: 50.0, t: 50.0 };
        let calm_range = range_from_forces(1.0, &calm, &params);
        let wild_range = range_from_forces(1.0, &wild, &params);
        assert!(wild_range.breadth > calm_range.breadth);
        assert!(calm_range.is_valid());
        assert!(wild_range.is_valid());
    }

    #[test]
    fn test_range_from_forces_skews_with_trend() {
        let params = RangeParams {
            base_min: 0.01,
            base_max: 0.2,
            vforce_exp: 1.0,
            vforce_divider: 100.0,
            rs_threshold: 0.25,
        };
        let bullish = Forces { v: 10.0, m: 50.0, t: 90.0 };
        let r = range_from_forces(1.0, &bullish, &params);
        assert_eq!(r.kind, RangeKind::Bullish);
    }
}
