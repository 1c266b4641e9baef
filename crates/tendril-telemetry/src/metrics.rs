//! Prometheus metrics, carried from the teacher's `hip3-telemetry::metrics`
//! and generalized from HIP-3-specific names to this system's: cycle
//! duration, decisions by kind, kill-switch activations, flush
//! failures/replays, allocation fraction sum, optimizer fitness.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. If registration
//! fails (e.g. duplicate metric names), that is a fatal configuration
//! error that should crash at startup rather than fail silently. These
//! panics only occur during static initialization, never at runtime.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge_vec, register_histogram_vec, CounterVec, GaugeVec,
    HistogramVec,
};

/// Wall-clock duration of one scheduler cycle, labeled by pair.
pub static CYCLE_DURATION_MS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "tendril_cycle_duration_ms",
        "Scheduler cycle duration in milliseconds",
        &["pair_id"],
        vec![50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0, 30000.0]
    )
    .unwrap()
});

/// Total decisions reached, labeled by pair and decision kind (hold/rs/pra).
pub static DECISIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tendril_decisions_total",
        "Total decisions reached per cycle",
        &["pair_id", "kind"]
    )
    .unwrap()
});

/// Kill-switch activation state (1 = active, 0 = inactive), labeled by pair
/// and switch name.
pub static KILL_SWITCH_ACTIVE: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "tendril_kill_switch_active",
        "Kill-switch activation state (1=active)",
        &["pair_id", "name"]
    )
    .unwrap()
});

/// Total telemetry flush failures, labeled by stream.
pub static TELEMETRY_FLUSH_FAILURES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tendril_telemetry_flush_failures_total",
        "Total failed telemetry flushes",
        &["stream"]
    )
    .unwrap()
});

/// Total records replayed after a failed flush, labeled by stream.
pub static TELEMETRY_REPLAYS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tendril_telemetry_replays_total",
        "Total telemetry records replayed after a failed flush",
        &["stream"]
    )
    .unwrap()
});

/// Sum of allocation fractions published in the last PRA decision, labeled
/// by pair (should sit at ~1.0 per §3 invariants).
pub static ALLOCATION_FRACTION_SUM: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "tendril_allocation_fraction_sum",
        "Sum of allocation fractions in the most recent PRA decision",
        &["pair_id"]
    )
    .unwrap()
});

/// Current optimizer fitness (validation fitness), labeled by pair.
pub static OPTIMIZER_FITNESS: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "tendril_optimizer_fitness",
        "Current optimizer validation fitness",
        &["pair_id"]
    )
    .unwrap()
});
