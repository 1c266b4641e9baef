//! Regime detector (§4.1 step 2): classifies the current epoch as `normal`
//! or `suppressed` from trailing volatility/displacement, and separately
//! flags a volume anomaly that widens (rather than suppresses) thresholds.

use tendril_core::{RegimeKind, RegimeState};

const SUPPRESS_EPOCHS: u32 = 4;
const VOL_SPIKE_SIGMA: f64 = 3.0;
const DISPLACEMENT_STABLE_PCT: f64 = 0.02;
const DISPLACEMENT_VOLATILE_PCT: f64 = 0.10;
const VOLUME_ANOMALY_MULTIPLE: f64 = 5.0;
const WIDEN_FACTOR: f64 = 1.5;

/// Inputs the regime detector needs for one epoch's evaluation.
#[derive(Debug, Clone, Copy)]
pub struct RegimeInputs {
    pub trailing_1h_parkinson_vol: f64,
    pub mean_30d_parkinson_vol: f64,
    pub std_30d_parkinson_vol: f64,
    pub price_now: f64,
    pub price_1h_ago: f64,
    pub is_stable_pair: bool,
    pub cycle_volume: f64,
    pub mean_30d_epoch_volume: f64,
}

/// Evaluate one epoch's regime, given the previous epoch's published state.
pub fn evaluate_regime(prev: &RegimeState, inputs: &RegimeInputs) -> RegimeState {
    let vol_spike = inputs.trailing_1h_parkinson_vol
        > inputs.mean_30d_parkinson_vol + VOL_SPIKE_SIGMA * inputs.std_30d_parkinson_vol;

    let displacement_threshold = if inputs.is_stable_pair {
        DISPLACEMENT_STABLE_PCT
    } else {
        DISPLACEMENT_VOLATILE_PCT
    };
    let displacement = if inputs.price_1h_ago.abs() > f64::EPSILON {
        ((inputs.price_now - inputs.price_1h_ago) / inputs.price_1h_ago).abs()
    } else {
        0.0
    };
    let displaced = displacement > displacement_threshold;

    let triggers_suppression = vol_spike || displaced;
    let suppressed_epochs_remaining = if triggers_suppression {
        SUPPRESS_EPOCHS
    } else {
        prev.suppressed_epochs_remaining.saturating_sub(1)
    };

    let volume_anomaly = inputs.mean_30d_epoch_volume > 0.0
        && inputs.cycle_volume > VOLUME_ANOMALY_MULTIPLE * inputs.mean_30d_epoch_volume;
    let widen_factor = if volume_anomaly { WIDEN_FACTOR } else { 1.0 };

    let kind = if suppressed_epochs_remaining > 0 {
        RegimeKind::Suppressed
    } else {
        RegimeKind::Normal
    };

    RegimeState {
        kind,
        suppressed_epochs_remaining,
        widen_factor,
    }
}

/// Apply a regime's widen factor to a threshold, capped at 0.9 (§4.1 step 2).
pub fn widen_threshold(threshold: f64, regime: &RegimeState) -> f64 {
    (threshold * regime.widen_factor).min(0.9)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calm_inputs() -> RegimeInputs {
        RegimeInputs {
            trailing_1h_parkinson_vol: 1.0,
            mean_30d_parkinson_vol: 1.0,
            std_30d_parkinson_vol: 0.1,
            price_now: 1.0,
            price_1h_ago: 1.0,
            is_stable_pair: true,
            cycle_volume: 100.0,
            mean_30d_epoch_volume: 100.0,
        }
    }

    #[test]
    fn test_calm_market_is_normal() {
        let regime = evaluate_regime(&RegimeState::normal(), &calm_inputs());
        assert!(!regime.is_suppressed());
        assert_eq!(regime.widen_factor, 1.0);
    }

    #[test]
    fn test_vol_spike_suppresses_for_four_epochs() {
        let mut inputs = calm_inputs();
        inputs.trailing_1h_parkinson_vol = 10.0;
        let regime = evaluate_regime(&RegimeState::normal(), &inputs);
        assert!(regime.is_suppressed());
        assert_eq!(regime.suppressed_epochs_remaining, 4);
    }

    #[test]
    fn test_displacement_beyond_stable_threshold_suppresses() {
        let mut inputs = calm_inputs();
        inputs.price_now = 1.03; // > 2% for a stable pair
        let regime = evaluate_regime(&RegimeState::normal(), &inputs);
        assert!(regime.is_suppressed());
    }

    #[test]
    fn test_suppression_counts_down_then_lifts() {
        let mut regime = evaluate_regime(&RegimeState::normal(), &{
            let mut i = calm_inputs();
            i.trailing_1h_parkinson_vol = 10.0;
            i
        });
        assert_eq!(regime.suppressed_epochs_remaining, 4);
        for remaining in [3, 2, 1, 0] {
            regime = evaluate_regime(&regime, &calm_inputs());
            assert_eq!(regime.suppressed_epochs_remaining, remaining);
        }
        assert!(!regime.is_suppressed());
    }

    #[test]
    fn test_volume_anomaly_widens_without_suppressing() {
        let mut inputs = calm_inputs();
        inputs.cycle_volume = 600.0; // > 5x mean
        let regime = evaluate_regime(&RegimeState::normal(), &inputs);
        assert!(!regime.is_suppressed());
        assert_eq!(regime.widen_factor, 1.5);
    }

    #[test]
    fn test_widen_threshold_is_capped_at_point_nine() {
        let regime = RegimeState {
            kind: RegimeKind::Normal,
            suppressed_epochs_remaining: 0,
            widen_factor: 1.5,
        };
        assert_eq!(widen_threshold(0.8, &regime), 0.9);
    }
}
