//! Declared bounds for the 5-parameter range-placement vector, and the
//! fixed defaults vertex used as the optimizer's fallback and regression
//! baseline. Externalized as consts rather than inlined in the simplex
//! loop, matching how `RiskGateConfig`-style structs externalize gate
//! thresholds instead of hardcoding them at each call site.

use tendril_core::RangeParams;

/// Inclusive bound pair for one parameter component.
#[derive(Debug, Clone, Copy)]
pub struct Bound {
    pub low: f64,
    pub high: f64,
}

impl Bound {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn clamp(self, v: f64) -> f64 {
        v.clamp(self.low, self.high)
    }

    pub fn contains(self, v: f64) -> bool {
        v >= self.low && v <= self.high
    }
}

pub const BASE_MIN_BOUND: Bound = Bound::new(0.001, 0.05);
pub const BASE_MAX_BOUND: Bound = Bound::new(0.01, 0.5);
pub const VFORCE_EXP_BOUND: Bound = Bound::new(0.5, 3.0);
pub const VFORCE_DIVIDER_BOUND: Bound = Bound::new(10.0, 500.0);
pub const RS_THRESHOLD_BOUND: Bound = Bound::new(0.05, 0.9);

/// All 5 bounds in the same order as `RangeParams::as_vector`.
pub const PARAM_BOUNDS: [Bound; 5] = [
    BASE_MIN_BOUND,
    BASE_MAX_BOUND,
    VFORCE_EXP_BOUND,
    VFORCE_DIVIDER_BOUND,
    RS_THRESHOLD_BOUND,
];

pub const PARAM_NAMES: [&str; 5] = [
    "base_min",
    "base_max",
    "vforce_exp",
    "vforce_divider",
    "rs_threshold",
];

/// Fixed safe defaults: the fallback vertex and regression baseline.
pub fn default_params() -> RangeParams {
    RangeParams {
        base_min: 0.01,
        base_max: 0.05,
        vforce_exp: 1.0,
        vforce_divider: 100.0,
        rs_threshold: 0.25,
    }
}

/// Clamp every component of a raw vector to its declared bound.
pub fn clamp_vector(v: [f64; 5]) -> [f64; 5] {
    let mut out = v;
    for i in 0..5 {
        out[i] = PARAM_BOUNDS[i].clamp(v[i]);
    }
    out
}

/// Whether every component of the vector lies within its declared bound.
pub fn in_bounds(v: [f64; 5]) -> bool {
    (0..5).all(|i| PARAM_BOUNDS[i].contains(v[i]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_in_bounds() {
        assert!(in_bounds(default_params().as_vector()));
    }

    #[test]
    fn test_clamp_pulls_back_inside() {
        let clamped = clamp_vector([-1.0, 10.0, 100.0, 0.0, 5.0]);
        assert!(in_bounds(clamped));
    }
}
