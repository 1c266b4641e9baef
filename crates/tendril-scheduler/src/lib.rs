//! Per-pair cycle engine and worker lifecycle (§4.1, §4.4): the scheduler
//! that turns candles and pool snapshots into a `Decision`, executes it,
//! and publishes worker state on a heartbeat.

pub mod config;
pub mod cycle;
pub mod error;
pub mod execution;
pub mod state_machine;
pub mod worker;

pub use config::{PairConfig, PoolConfig};
pub use cycle::{run_cycle, CycleEconomics, CycleOutcome, CyclePools};
pub use error::{CycleFailure, CycleResult, Result, SchedulerError};
pub use execution::{execute_decision, ExecutionContext, ExecutionOutcome, PoolTarget};
pub use state_machine::{ShutdownCause, WorkerFsm};
pub use worker::{Worker, WorkerDeps};
