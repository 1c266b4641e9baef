//! Shared domain types for the concentrated-liquidity range manager: the
//! core entities every other crate in the workspace builds on.

pub mod allocation;
pub mod candle;
pub mod decimal;
pub mod decision;
pub mod error;
pub mod forces;
pub mod ids;
pub mod position;
pub mod range;
pub mod snapshot;
pub mod txlog;
pub mod worker_state;

pub use allocation::{AllocationEntry, ALLOC_MIN};
pub use candle::Candle;
pub use decimal::Usd;
pub use decision::{Decision, RangeShift};
pub use error::{CoreError, Result};
pub use forces::Forces;
pub use ids::{DexFamily, PairId, PoolRef};
pub use position::{Position, MIN_HOLDING_PERIOD_EPOCHS};
pub use range::{range_divergence, range_from_forces, Range, RangeKind, RangeParams, TickRange};
pub use snapshot::PoolSnapshot;
pub use txlog::{TxDecisionType, TxLog, TxOpType, TxStatus};
pub use worker_state::{
    EpochSnapshot, KillSwitchState, OptimizerWarmStart, RegimeKind, RegimeState, WorkerState,
    WorkerStatus,
};
