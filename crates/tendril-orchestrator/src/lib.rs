//! Singleton orchestrator / worker supervisor (§4.3): one `orch:lock`
//! holder per cluster, supervising one child process per configured pair.

pub mod backoff;
pub mod error;
pub mod supervisor;

pub use error::{OrchestratorError, Result};
pub use supervisor::{Orchestrator, PairSetProvider, SpawnSpec};
