//! Error taxonomy (§7) and the per-crate `SchedulerError`.

use tendril_core::PairId;
use thiserror::Error;

/// Top-level scheduler/worker error, distinct from the per-cycle
/// `CycleFailure` taxonomy realized in `cycle.rs`.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("failed to acquire worker lock for {0}")]
    LockNotAcquired(PairId),

    #[error("hot-store error: {0}")]
    HotStore(#[from] tendril_hotstore::HotStoreError),

    #[error("config error: {0}")]
    Config(String),

    #[error("fatal: {0}")]
    Fatal(String),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;

/// The §7 error taxonomy, carried as the failure half of every cycle step's
/// `CycleResult`. Each variant carries enough context (`pair_id`, `epoch`)
/// for structured-log propagation without the caller re-deriving it.
#[derive(Debug, Clone, Error)]
pub enum CycleFailure {
    #[error("[{pair_id}@{epoch}] transient network error: {message}")]
    TransientNetwork {
        pair_id: PairId,
        epoch: u64,
        message: String,
    },

    #[error("[{pair_id}@{epoch}] rate limited: {message}")]
    RateLimited {
        pair_id: PairId,
        epoch: u64,
        message: String,
    },

    #[error("[{pair_id}@{epoch}] stale data: {message}")]
    StaleData {
        pair_id: PairId,
        epoch: u64,
        message: String,
    },

    #[error("[{pair_id}@{epoch}] simulation reverted: {message}")]
    Simulation {
        pair_id: PairId,
        epoch: u64,
        message: String,
    },

    #[error("[{pair_id}@{epoch}] tx reverted: {message}")]
    TxReverted {
        pair_id: PairId,
        epoch: u64,
        message: String,
    },

    #[error("[{pair_id}@{epoch}] bridge timeout: {message}")]
    BridgeTimeout {
        pair_id: PairId,
        epoch: u64,
        message: String,
    },

    #[error("[{pair_id}@{epoch}] invariant violation: {message}")]
    InvariantViolation {
        pair_id: PairId,
        epoch: u64,
        message: String,
    },

    #[error("[{pair_id}@{epoch}] fatal: {message}")]
    Fatal {
        pair_id: PairId,
        epoch: u64,
        message: String,
    },
}

impl CycleFailure {
    /// Only `Fatal` terminates the worker process (§7 "Propagation").
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal { .. })
    }

    /// Whether this failure, by itself, forces the cycle to resolve as
    /// HOLD rather than propagate (§7): everything except an in-flight
    /// per-pool execution failure that leaves other pools free to
    /// progress independently.
    pub fn forces_hold(&self) -> bool {
        !matches!(self, Self::TxReverted { .. })
    }

    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::TransientNetwork { .. } => "transient_network",
            Self::RateLimited { .. } => "rate_limited",
            Self::StaleData { .. } => "stale_data",
            Self::Simulation { .. } => "simulation",
            Self::TxReverted { .. } => "tx_reverted",
            Self::BridgeTimeout { .. } => "bridge_timeout",
            Self::InvariantViolation { .. } => "invariant_violation",
            Self::Fatal { .. } => "fatal",
        }
    }

    pub fn pair_id(&self) -> &PairId {
        match self {
            Self::TransientNetwork { pair_id, .. }
            | Self::RateLimited { pair_id, .. }
            | Self::StaleData { pair_id, .. }
            | Self::Simulation { pair_id, .. }
            | Self::TxReverted { pair_id, .. }
            | Self::BridgeTimeout { pair_id, .. }
            | Self::InvariantViolation { pair_id, .. }
            | Self::Fatal { pair_id, .. } => pair_id,
        }
    }

    pub fn epoch(&self) -> u64 {
        match self {
            Self::TransientNetwork { epoch, .. }
            | Self::RateLimited { epoch, .. }
            | Self::StaleData { epoch, .. }
            | Self::Simulation { epoch, .. }
            | Self::TxReverted { epoch, .. }
            | Self::BridgeTimeout { epoch, .. }
            | Self::InvariantViolation { epoch, .. }
            | Self::Fatal { epoch, .. } => *epoch,
        }
    }
}

/// Result of one cycle step: either a decision-contributing value or a
/// classified failure (§9 "Cycle control flow without exceptions").
pub type CycleResult<T> = std::result::Result<T, CycleFailure>;
