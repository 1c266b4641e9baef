//! Ties the simplex search, fitness function, and fallback guard together
//! into a single per-epoch optimization call (§4.2).

use crate::bounds::{clamp_vector, default_params, PARAM_BOUNDS};
use crate::error::Result;
use crate::fitness::{fitness, FitnessConfig};
use crate::killswitch::pathological_range;
use crate::simplex::{initial_simplex, maximize, SimplexConfig};
use tendril_core::{Candle, OptimizerWarmStart, RangeParams};
use tracing::warn;

/// Perturbation epsilon per coordinate for the initial simplex: 5% of that
/// coordinate's declared bound range.
fn epsilon_vector() -> [f64; 5] {
    let mut eps = [0.0; 5];
    for i in 0..5 {
        eps[i] = (PARAM_BOUNDS[i].high - PARAM_BOUNDS[i].low) * 0.05;
    }
    eps
}

/// Run one epoch's optimization: Nelder-Mead over the fitness function,
/// then the pathological-range rejection and defaults-regression fallback
/// guards (§4.2). Assumes the caller has already checked the regime isn't
/// suppressed — a suppressed regime skips optimization entirely.
pub fn optimize(
    warm_start: &OptimizerWarmStart,
    candles: &[Candle],
    fitness_config: &FitnessConfig,
    simplex_config: &SimplexConfig,
) -> Result<OptimizerWarmStart> {
    let defaults = default_params();
    let defaults_fitness = fitness(&defaults, candles, fitness_config)?;

    let eps = epsilon_vector();
    let initial = initial_simplex(warm_start.params.as_vector(), eps);

    let objective = |v: [f64; 5]| {
        let params = RangeParams::from_vector(clamp_vector(v));
        fitness(&params, candles, fitness_config).unwrap_or(f64::NEG_INFINITY)
    };

    let (best_vec, best_fitness) = maximize(objective, initial, simplex_config);
    let best_params = RangeParams::from_vector(clamp_vector(best_vec));

    if pathological_range(&best_params) {
        warn!("optimizer vertex rejected: pathological range, falling back to defaults");
        return Ok(OptimizerWarmStart::defaults(defaults, defaults_fitness));
    }

    if best_fitness < defaults_fitness {
        warn!(
            best_fitness,
            defaults_fitness, "optimizer_regression vs defaults, falling back to defaults"
        );
        return Ok(OptimizerWarmStart::defaults(defaults, defaults_fitness));
    }

    Ok(OptimizerWarmStart {
        params: best_params,
        fitness: best_fitness,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stable_candles(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| Candle::new(i as i64 * 60_000, 1.0, 1.001, 0.999, 1.0, 1000.0))
            .collect()
    }

    #[test]
    fn test_optimize_never_panics_and_stays_in_bounds() {
        let candles = stable_candles(150);
        let warm_start = OptimizerWarmStart::defaults(default_params(), f64::NEG_INFINITY);
        let result = optimize(
            &warm_start,
            &candles,
            &FitnessConfig::default(),
            &SimplexConfig::default(),
        )
        .unwrap();
        assert!(crate::bounds::in_bounds(result.params.as_vector()));
        assert!(result.fitness.is_finite() || result.fitness == f64::NEG_INFINITY);
    }

    #[test]
    fn test_optimize_errs_on_insufficient_candles() {
        let candles = stable_candles(5);
        let warm_start = OptimizerWarmStart::defaults(default_params(), f64::NEG_INFINITY);
        assert!(optimize(&warm_start, &candles, &FitnessConfig::default(), &SimplexConfig::default()).is_err());
    }
}
