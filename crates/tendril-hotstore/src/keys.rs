//! Hot-state key schema (§6.2), as plain functions rather than ad hoc
//! `format!` call sites, so the schema table is enforced at one location.

use tendril_core::PairId;

pub const ORCH_LOCK_TTL_SECS: u64 = 60;
pub const WORKER_LOCK_TTL_SECS: u64 = 900;
pub const WORKER_HEARTBEAT_TTL_SECS: u64 = 45;
pub const WORKER_STATE_TTL_SECS: u64 = 60;
pub const WORKER_RESTARTING_TTL_SECS: u64 = 60;

/// Singleton orchestrator lock.
pub fn orch_lock() -> String {
    "orch:lock".to_string()
}

/// Set of active pair ids.
pub fn workers_set() -> String {
    "workers".to_string()
}

pub fn worker_lock(pair_id: &PairId) -> String {
    format!("worker:{}:lock", pair_id.as_str())
}

pub fn worker_heartbeat(pair_id: &PairId) -> String {
    format!("worker:{}:heartbeat", pair_id.as_str())
}

pub fn worker_state(pair_id: &PairId) -> String {
    format!("worker:{}:state", pair_id.as_str())
}

pub fn worker_restarting(pair_id: &PairId) -> String {
    format!("worker:{}:restarting", pair_id.as_str())
}

/// No TTL: warm-start `{vec, fitness}`.
pub fn optimizer(pair_id: &PairId) -> String {
    format!("optimizer:{}", pair_id.as_str())
}

/// No TTL: hash `positionId -> Position`.
pub fn positions(pair_id: &PairId) -> String {
    format!("positions:{}", pair_id.as_str())
}

/// Pub/sub control channel.
pub fn control_channel() -> String {
    "control".to_string()
}
