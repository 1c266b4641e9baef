//! Online Nelder-Mead optimizer for the 5-parameter range-placement
//! vector: fitness simulation, regime gating, kill-switches, and the
//! simplex search itself.

pub mod bounds;
pub mod error;
pub mod fitness;
pub mod killswitch;
pub mod optimize;
pub mod regime;
pub mod simplex;

pub use bounds::{default_params, in_bounds, Bound, PARAM_BOUNDS, PARAM_NAMES};
pub use error::{OptimizerError, Result};
pub use fitness::{fitness, FitnessConfig};
pub use killswitch::{gas_budget_exceeded, pathological_range, KillSwitchLatch, KillSwitchName, KillSwitchRegistry};
pub use optimize::optimize;
pub use regime::{evaluate_regime, widen_threshold, RegimeInputs};
pub use simplex::{initial_simplex, maximize, minimize, SimplexConfig};
