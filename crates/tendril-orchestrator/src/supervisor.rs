//! Singleton orchestrator loop (§4.3): acquire `orch:lock`, then supervise
//! one child process per configured pair. The `tokio::select!` main loop and
//! the timeout-bounded shutdown join are grounded on
//! `hip3-bot::app::Application::run`, generalized from in-process task
//! handles to out-of-process child handles.

use crate::backoff;
use crate::error::{OrchestratorError, Result};
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;
use tendril_core::{PairId, WorkerState, WorkerStatus};
use tendril_hotstore::{keys, ControlMessage, HotStoreClient};
use tokio::process::{Child, Command};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info, warn};

const HEALTH_CHECK_INTERVAL_SECS: u64 = 10;
/// Must track `tendril_scheduler::worker::HEARTBEAT_INTERVAL_SECS`.
const WORKER_HEARTBEAT_INTERVAL_SECS: i64 = 15;
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// How to launch a worker: same executable, pair id passed via env var.
#[derive(Debug, Clone)]
pub struct SpawnSpec {
    pub executable: PathBuf,
    pub extra_args: Vec<OsString>,
    pub pair_env_var: String,
}

/// Supplies the current configured pair set; re-queried on SIGHUP.
pub trait PairSetProvider: Send {
    fn load(&self) -> std::io::Result<Vec<PairId>>;
}

struct WorkerSlot {
    child: Option<Child>,
    spawned_at_ms: i64,
    fail_count: u32,
    next_attempt_at_ms: i64,
}

impl WorkerSlot {
    fn new() -> Self {
        Self {
            child: None,
            spawned_at_ms: 0,
            fail_count: 0,
            next_attempt_at_ms: 0,
        }
    }
}

pub struct Orchestrator {
    hotstore: HotStoreClient,
    lock_value: String,
    spawn_spec: SpawnSpec,
    pairs: Vec<PairId>,
    workers: HashMap<PairId, WorkerSlot>,
}

impl Orchestrator {
    pub fn new(hotstore: HotStoreClient, spawn_spec: SpawnSpec, pairs: Vec<PairId>) -> Self {
        Self {
            hotstore,
            lock_value: std::process::id().to_string(),
            spawn_spec,
            pairs,
            workers: HashMap::new(),
        }
    }

    /// Acquires the singleton lock and runs the supervision loop until a
    /// shutdown signal arrives. Returns `Ok(())` on a clean exit, including
    /// the case where another orchestrator already holds the lock.
    pub async fn run(mut self, pair_source: impl PairSetProvider) -> Result<()> {
        let acquired = self
            .hotstore
            .try_acquire_lock(&keys::orch_lock(), &self.lock_value, (keys::ORCH_LOCK_TTL_SECS * 1000) as usize)
            .await?;
        if !acquired {
            info!("orch:lock held by another process, exiting");
            return Ok(());
        }
        info!(pid = %self.lock_value, "acquired orchestrator lock");

        let mut health_tick = tokio::time::interval(Duration::from_secs(HEALTH_CHECK_INTERVAL_SECS));
        let mut sighup = signal(SignalKind::hangup()).map_err(OrchestratorError::Spawn)?;
        let mut sigterm = signal(SignalKind::terminate()).map_err(OrchestratorError::Spawn)?;

        loop {
            tokio::select! {
                _ = health_tick.tick() => {
                    if let Err(e) = self.health_check_tick().await {
                        error!(?e, "health check failed, shutting down");
                        break;
                    }
                }
                _ = sighup.recv() => {
                    info!("SIGHUP received, reloading pair set");
                    match pair_source.load() {
                        Ok(new_pairs) => self.reload_pairs(new_pairs).await,
                        Err(e) => warn!(?e, "failed to reread pair configuration"),
                    }
                }
                _ = sigterm.recv() => {
                    info!("SIGTERM received");
                    break;
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("SIGINT received");
                    break;
                }
            }
        }

        self.graceful_shutdown().await
    }

    async fn health_check_tick(&mut self) -> Result<()> {
        let now = now_ms();
        let refreshed = self
            .hotstore
            .refresh_lock(&keys::orch_lock(), &self.lock_value, (keys::ORCH_LOCK_TTL_SECS * 1000) as usize)
            .await?;
        if !refreshed {
            return Err(OrchestratorError::LockLost);
        }

        for pair_id in self.pairs.clone() {
            self.tick_pair(&pair_id, now).await?;
        }
        Ok(())
    }

    async fn tick_pair(&mut self, pair_id: &PairId, now: i64) -> Result<()> {
        let has_live_child = self
            .workers
            .get_mut(pair_id)
            .and_then(|slot| slot.child.as_mut())
            .map(|child| matches!(child.try_wait(), Ok(None)))
            .unwrap_or(false);

        if !has_live_child {
            if let Some(slot) = self.workers.get(pair_id) {
                if slot.child.is_some() {
                    // try_wait above returned Some(status): the process exited.
                    self.record_exit(pair_id, now);
                }
            }
            self.maybe_spawn(pair_id, now).await?;
            return Ok(());
        }

        self.check_heartbeat(pair_id, now).await?;
        self.warn_if_reporting_error(pair_id).await?;
        Ok(())
    }

    fn record_exit(&mut self, pair_id: &PairId, now: i64) {
        let slot = self.workers.get_mut(pair_id).expect("checked by caller");
        slot.child = None;
        slot.fail_count += 1;
        match backoff::next_delay(slot.fail_count) {
            Some(delay) => {
                slot.next_attempt_at_ms = now + delay.as_millis() as i64;
                warn!(pair_id = %pair_id, fail_count = slot.fail_count, delay_ms = delay.as_millis() as u64, "worker exited, scheduling respawn");
            }
            None => {
                slot.next_attempt_at_ms = i64::MAX;
                error!(pair_id = %pair_id, fail_count = slot.fail_count, "worker exceeded max consecutive failures, giving up");
            }
        }
    }

    async fn maybe_spawn(&mut self, pair_id: &PairId, now: i64) -> Result<()> {
        let restarting = self
            .hotstore
            .get_json::<serde_json::Value>(&keys::worker_restarting(pair_id))
            .await?
            .is_some();

        self.workers.entry(pair_id.clone()).or_insert_with(WorkerSlot::new);
        let ready = restarting || now >= self.workers[pair_id].next_attempt_at_ms;
        if !ready {
            return Ok(());
        }

        let mut cmd = Command::new(&self.spawn_spec.executable);
        cmd.args(&self.spawn_spec.extra_args);
        cmd.env(&self.spawn_spec.pair_env_var, pair_id.as_str());
        let child = cmd.spawn()?;

        let slot = self.workers.get_mut(pair_id).expect("just inserted");
        slot.child = Some(child);
        slot.spawned_at_ms = now;
        if restarting {
            slot.fail_count = 0;
            slot.next_attempt_at_ms = 0;
        }
        info!(pair_id = %pair_id, "spawned worker");
        Ok(())
    }

    async fn check_heartbeat(&mut self, pair_id: &PairId, now: i64) -> Result<()> {
        let heartbeat_at = self.hotstore.get_json::<i64>(&keys::worker_heartbeat(pair_id)).await?;
        let spawned_at = self.workers[pair_id].spawned_at_ms;
        let stale = match heartbeat_at {
            Some(t) => now - t > 2 * WORKER_HEARTBEAT_INTERVAL_SECS * 1000,
            None => now - spawned_at > 2 * WORKER_HEARTBEAT_INTERVAL_SECS * 1000,
        };

        if stale {
            warn!(pair_id = %pair_id, "heartbeat stale, killing worker");
            if let Some(slot) = self.workers.get_mut(pair_id) {
                if let Some(mut child) = slot.child.take() {
                    let _ = child.start_kill();
                }
                // Not a backoff-penalized exit: respawn is attempted next tick.
                slot.next_attempt_at_ms = now;
            }
        } else if let Some(slot) = self.workers.get_mut(pair_id) {
            slot.fail_count = 0;
            slot.next_attempt_at_ms = 0;
        }
        Ok(())
    }

    async fn warn_if_reporting_error(&self, pair_id: &PairId) -> Result<()> {
        if let Some(state) = self.hotstore.get_json::<WorkerState>(&keys::worker_state(pair_id)).await? {
            if state.status == WorkerStatus::Error {
                warn!(pair_id = %pair_id, reason = ?state.error_reason, "worker reporting error status");
            }
        }
        Ok(())
    }

    async fn reload_pairs(&mut self, new_pairs: Vec<PairId>) {
        let current: std::collections::HashSet<_> = self.pairs.iter().cloned().collect();
        let desired: std::collections::HashSet<_> = new_pairs.iter().cloned().collect();

        for removed in current.difference(&desired) {
            if let Some(mut slot) = self.workers.remove(removed) {
                if let Some(mut child) = slot.child.take() {
                    info!(pair_id = %removed, "pair removed from config, killing worker");
                    let _ = child.kill().await;
                }
            }
        }
        self.pairs = new_pairs;
    }

    /// Broadcasts SHUTDOWN, waits up to 30 s for children to exit on their
    /// own, force-kills any survivors in parallel, then releases the
    /// singleton lock.
    async fn graceful_shutdown(mut self) -> Result<()> {
        info!("broadcasting shutdown to workers");
        self.hotstore
            .publish_json(&keys::control_channel(), &ControlMessage::Shutdown { pair_id: None })
            .await?;

        let deadline = tokio::time::Instant::now() + SHUTDOWN_GRACE;
        loop {
            let all_exited = self
                .workers
                .values_mut()
                .filter_map(|slot| slot.child.as_mut())
                .all(|child| matches!(child.try_wait(), Ok(Some(_))));
            if all_exited || tokio::time::Instant::now() >= deadline {
                break;
            }
            tokio::time::sleep(Duration::from_millis(500)).await;
        }

        let survivors: Vec<Child> = self.workers.values_mut().filter_map(|slot| slot.child.take()).collect();
        if !survivors.is_empty() {
            warn!(count = survivors.len(), "force-killing workers that missed the shutdown grace period");
        }
        let kills = survivors.into_iter().map(|mut child| async move {
            let _ = child.kill().await;
        });
        futures::future::join_all(kills).await;

        self.hotstore.release_lock(&keys::orch_lock(), &self.lock_value).await?;
        info!("released orchestrator lock, exiting");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_slot_starts_idle() {
        let slot = WorkerSlot::new();
        assert!(slot.child.is_none());
        assert_eq!(slot.fail_count, 0);
        assert_eq!(slot.next_attempt_at_ms, 0);
    }
}
