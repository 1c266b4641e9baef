//! Pure three-force price-regime computation: V (Parkinson volatility),
//! M (Wilder-smoothed momentum), T (MA-cross trend). Each force is a
//! standalone `&[Candle] -> f64` function on the `[0, 100]` scale; the
//! multi-timeframe composite combines them with fixed weights.

pub mod composite;
pub mod error;
pub mod momentum;
pub mod trend;
pub mod volatility;

pub use composite::{composite_forces, Timeframe, TimeframeCandles};
pub use error::{ForcesError, Result};
pub use momentum::m_force;
pub use trend::t_force;
pub use volatility::{parkinson_variance, parkinson_volatility, v_force};
