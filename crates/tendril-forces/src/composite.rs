//! Multi-timeframe composite: each of V/M/T is computed independently on
//! the M15, H1 and H4 candle series, then blended with fixed weights.
//! Shorter timeframes react faster to regime changes and carry the larger
//! weight; H4 contributes a stabilizing minority vote.

use crate::error::Result;
use crate::momentum::m_force;
use crate::trend::t_force;
use crate::volatility::v_force;
use tendril_core::{Candle, Forces};

/// Candle series for each timeframe feeding the composite.
pub struct TimeframeCandles<'a> {
    pub m15: &'a [Candle],
    pub h1: &'a [Candle],
    pub h4: &'a [Candle],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    M15,
    H1,
    H4,
}

impl Timeframe {
    /// Fixed blend weight. Sums to 1.0 across all three timeframes.
    pub const fn weight(self) -> f64 {
        match self {
            Timeframe::M15 => 0.5,
            Timeframe::H1 => 0.3,
            Timeframe::H4 => 0.2,
        }
    }
}

const V_LOOKBACK: usize = 20;
const M_LOOKBACK: usize = 14;
const T_SHORT_LOOKBACK: usize = 10;
const T_LONG_LOOKBACK: usize = 40;

fn forces_for(candles: &[Candle]) -> Result<Forces> {
    Ok(Forces {
        v: v_force(candles, V_LOOKBACK)?,
        m: m_force(candles, M_LOOKBACK)?,
        t: t_force(candles, T_SHORT_LOOKBACK, T_LONG_LOOKBACK)?,
    })
}

/// Weighted blend of per-timeframe forces into a single composite reading.
pub fn composite_forces(data: &TimeframeCandles) -> Result<Forces> {
    let m15 = forces_for(data.m15)?;
    let h1 = forces_for(data.h1)?;
    let h4 = forces_for(data.h4)?;

    let w15 = Timeframe::M15.weight();
    let w1 = Timeframe::H1.weight();
    let w4 = Timeframe::H4.weight();

    Ok(Forces {
        v: m15.v * w15 + h1.v * w1 + h4.v * w4,
        m: m15.m * w15 + h1.m * w1 + h4.m * w4,
        t: m15.t * w15 + h1.t * w1 + h4.t * w4,
    })
}
