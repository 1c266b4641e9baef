//! Per-pair worker lifecycle (§4.4): lock acquisition, heartbeat, control-
//! channel subscription, the scheduler loop, and graceful shutdown. The
//! heartbeat's timer-driven CAS-refresh pattern is grounded on
//! `hip3-ws::connection::ConnectionManager`'s reconnect/keepalive loop,
//! generalized from a single socket to a lock+heartbeat+state triple.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use parking_lot::Mutex;
use tokio::time::interval;
use tracing::{error, info, info_span, warn};

use tendril_adapters::{MarketData, PositionAdapterRegistry, SwapExecutor};
use tendril_core::{
    Decision, EpochSnapshot, KillSwitchState, OptimizerWarmStart, PairId, PoolRef, Range,
    RegimeState, Usd, WorkerState, WorkerStatus,
};
use tendril_hotstore::{keys, ControlMessage, HotStoreClient};
use tendril_optimizer::bounds::default_params;
use tendril_optimizer::killswitch::KillSwitchRegistry;
use tendril_position::PositionRegistry;
use tendril_telemetry::TelemetrySink;

use crate::config::PairConfig;
use crate::cycle::{run_cycle, CycleEconomics};
use crate::error::{Result, SchedulerError};
use crate::execution::{execute_decision, ExecutionContext, PoolTarget};
use crate::state_machine::{ShutdownCause, WorkerFsm};

const HEARTBEAT_INTERVAL_SECS: u64 = 15;
const EXCESSIVE_RS_WINDOW_SECS: u64 = 4 * 3600;
const NEGATIVE_YIELD_WINDOW_LEN: usize = 24;
const EPOCHS_PER_DAY_ESTIMATE: u32 = 96;
const TX_LOG_STREAM: &str = "tx_log";
const EPOCH_SNAPSHOT_STREAM: &str = "epoch_snapshots";

/// Per-process state not owned by `PairConfig`, threaded through every
/// cycle rather than re-derived. Kept separate from `PairConfig` so that
/// the on-disk/env-loaded config stays a plain data record.
pub struct WorkerDeps {
    pub market_data: Arc<dyn MarketData>,
    pub adapters: PositionAdapterRegistry,
    pub swap_executor: Arc<dyn SwapExecutor>,
    pub pool_targets: Vec<PoolTarget>,
    pub telemetry: Arc<TelemetrySink>,
    pub hotstore_url: String,
    pub economics: CycleEconomics,
}

/// The cycle-to-cycle bookkeeping that isn't I/O: warm-start, regime,
/// kill-switch latches, and the trailing windows they gate on. Split out
/// from `Worker` so the kill-switch/pruning logic is unit-testable without
/// a live hot-store connection.
struct CycleMemory {
    warm_start: OptimizerWarmStart,
    regime: RegimeState,
    kill_switches: KillSwitchRegistry,
    trailing_net_yields: VecDeque<f64>,
    rs_events: VecDeque<i64>,
    epoch_history: VecDeque<EpochSnapshot>,
}

impl CycleMemory {
    fn new(warm_start: OptimizerWarmStart) -> Self {
        Self {
            warm_start,
            regime: RegimeState::normal(),
            kill_switches: KillSwitchRegistry::new(),
            trailing_net_yields: VecDeque::new(),
            rs_events: VecDeque::new(),
            epoch_history: VecDeque::new(),
        }
    }

    fn record_rs_event(&mut self, now_ms: i64) {
        self.rs_events.push_back(now_ms);
        let window_start = now_ms - (EXCESSIVE_RS_WINDOW_SECS as i64) * 1000;
        while self.rs_events.front().is_some_and(|t| *t < window_start) {
            self.rs_events.pop_front();
        }
    }

    fn record_net_yield(&mut self, yield_fraction: f64) {
        self.trailing_net_yields.push_back(yield_fraction);
        while self.trailing_net_yields.len() > NEGATIVE_YIELD_WINDOW_LEN {
            self.trailing_net_yields.pop_front();
        }
    }

    /// Post-optimization kill-switches (§4.2): excessive RS and negative
    /// trailing yield both revert the warm-start to defaults and force
    /// HOLD when active.
    fn apply_kill_switches(&mut self, decision: Decision, now_ms: i64) -> (Decision, KillSwitchState) {
        let rs_active = self.kill_switches.check_excessive_rs(self.rs_events.len() as u32, now_ms);
        let yields: Vec<f64> = self.trailing_net_yields.iter().copied().collect();
        let yield_active = self.kill_switches.check_negative_trailing_yield(&yields, now_ms);

        if rs_active || yield_active {
            self.warm_start = OptimizerWarmStart::defaults(default_params(), self.warm_start.fitness);
            let name = if rs_active { "excessive_rs" } else { "negative_trailing_yield" };
            return (
                Decision::hold(name),
                KillSwitchState {
                    active: true,
                    reason: Some(name.to_string()),
                    clears_at_ms: None,
                },
            );
        }
        (decision, KillSwitchState::inactive())
    }

    fn push_snapshot(&mut self, snapshot: EpochSnapshot, retention_days: u32) {
        self.epoch_history.push_back(snapshot);
        while self.epoch_history.len() as u32 > retention_days * EPOCHS_PER_DAY_ESTIMATE {
            self.epoch_history.pop_front();
        }
    }

    /// Step 2 of §4.4: drop epoch history older than the configured
    /// retention. The optimizer warm-start lives in the hot store with no
    /// TTL and is exempt, as is the kill-switch/regime state this process
    /// carries only for the life of the worker.
    fn prune_older_than(&mut self, now_ms: i64, retention_days: u32) {
        let cutoff = now_ms - (retention_days as i64) * 86_400_000;
        while self.epoch_history.front().is_some_and(|s| s.timestamp_ms < cutoff) {
            self.epoch_history.pop_front();
        }
    }
}

/// One pair's long-running worker. Owns the hot-store lock, the in-memory
/// position registry, and drives the scheduler loop.
pub struct Worker {
    pair_id: PairId,
    config: PairConfig,
    hotstore: HotStoreClient,
    deps: WorkerDeps,
    lock_token: String,
    fsm: WorkerFsm,
    positions: PositionRegistry,
    active_ranges: HashMap<PoolRef, Range>,
    memory: CycleMemory,
    epoch: u64,
    published: Arc<Mutex<WorkerState>>,
}

impl Worker {
    pub async fn new(pair_id: PairId, config: PairConfig, hotstore: HotStoreClient, deps: WorkerDeps) -> Self {
        let lock_token = hotstore.new_lock_token();
        let warm_start = hotstore
            .get_json::<OptimizerWarmStart>(&keys::optimizer(&pair_id))
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| OptimizerWarmStart::defaults(default_params(), 0.0));

        let mut positions = PositionRegistry::new();
        if let Ok(rows) = hotstore
            .hgetall_json::<tendril_core::Position>(&keys::positions(&pair_id))
            .await
        {
            for (_, position) in rows {
                let _ = positions.insert(position, 0);
            }
        }

        let published = Arc::new(Mutex::new(initial_state(&pair_id, &warm_start)));

        Self {
            pair_id,
            config,
            hotstore,
            deps,
            lock_token,
            fsm: WorkerFsm::Starting,
            positions,
            active_ranges: HashMap::new(),
            memory: CycleMemory::new(warm_start),
            epoch: 0,
            published,
        }
    }

    /// Steps 1-6 of §4.4's lifecycle. Returns once the worker has shut down
    /// cleanly (released its lock) or failed to acquire it in the first
    /// place.
    pub async fn run(mut self) -> Result<()> {
        let lock_key = keys::worker_lock(&self.pair_id);
        let acquired = self
            .hotstore
            .try_acquire_lock(&lock_key, &self.lock_token, keys::WORKER_LOCK_TTL_SECS as usize * 1000)
            .await?;
        self.fsm = WorkerFsm::on_lock_result(acquired);
        if !acquired {
            warn!(pair_id = %self.pair_id, "failed to acquire worker lock, exiting");
            return Err(SchedulerError::LockNotAcquired(self.pair_id.clone()));
        }
        if let Err(e) = self.hotstore.sadd(&keys::workers_set(), self.pair_id.as_str()).await {
            warn!(pair_id = %self.pair_id, error = %e, "failed to register pair in workers set");
        }

        self.memory
            .prune_older_than(chrono::Utc::now().timestamp_millis(), self.config.data_retention_days);

        let heartbeat_handle = self.spawn_heartbeat();
        let mut control_stream = self.hotstore.subscriber_connection(&self.deps.hotstore_url).await?;
        control_stream
            .subscribe(keys::control_channel())
            .await
            .map_err(tendril_hotstore::HotStoreError::from)?;
        let mut messages = control_stream.on_message();

        let mut cycle_timer = interval(Duration::from_secs(self.config.interval_sec));
        cycle_timer.tick().await; // first tick fires immediately; consume it before the loop owns pacing

        let cause = loop {
            tokio::select! {
                _ = cycle_timer.tick() => {
                    self.run_one_cycle().await;
                }
                msg = messages.next() => {
                    match msg {
                        Some(raw) => {
                            if let Ok(payload) = raw.get_payload::<String>() {
                                if let Ok(control) = serde_json::from_str::<ControlMessage>(&payload) {
                                    if control.applies_to(&self.pair_id) {
                                        match control {
                                            ControlMessage::Restart { .. } => {
                                                let _ = self.hotstore.set_json_ex(
                                                    &keys::worker_restarting(&self.pair_id),
                                                    &true,
                                                    keys::WORKER_RESTARTING_TTL_SECS,
                                                ).await;
                                                break ShutdownCause::ControlRestart;
                                            }
                                            ControlMessage::Shutdown { .. } => break ShutdownCause::ControlShutdown,
                                            ControlMessage::ConfigChanged => {
                                                info!(pair_id = %self.pair_id, "config changed notification received");
                                            }
                                        }
                                    }
                                }
                            }
                        }
                        None => break ShutdownCause::Signal,
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    break ShutdownCause::Signal;
                }
            }
        };

        self.fsm = self.fsm.begin_shutdown(cause);
        info!(pair_id = %self.pair_id, ?cause, "worker shutting down");
        heartbeat_handle.abort();
        self.deps.telemetry.shutdown().await;
        let _ = self.hotstore.srem(&keys::workers_set(), self.pair_id.as_str()).await;
        let _ = self.hotstore.release_lock(&lock_key, &self.lock_token).await;
        self.fsm = self.fsm.finish_shutdown();
        Ok(())
    }

    fn spawn_heartbeat(&self) -> tokio::task::JoinHandle<()> {
        let hotstore = self.hotstore.clone();
        let pair_id = self.pair_id.clone();
        let lock_key = keys::worker_lock(&pair_id);
        let lock_token = self.lock_token.clone();
        let published = self.published.clone();
        tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(HEARTBEAT_INTERVAL_SECS));
            loop {
                ticker.tick().await;
                let now_ms = chrono::Utc::now().timestamp_millis();
                match hotstore
                    .refresh_lock(&lock_key, &lock_token, keys::WORKER_LOCK_TTL_SECS as usize * 1000)
                    .await
                {
                    Ok(true) => {}
                    Ok(false) => error!(pair_id = %pair_id, "lost worker lock ownership on refresh"),
                    Err(e) => warn!(pair_id = %pair_id, error = %e, "heartbeat lock refresh failed"),
                }
                if let Err(e) = hotstore
                    .set_json_ex(&keys::worker_heartbeat(&pair_id), &now_ms, keys::WORKER_HEARTBEAT_TTL_SECS)
                    .await
                {
                    warn!(pair_id = %pair_id, error = %e, "heartbeat publish failed");
                }
                let state = published.lock().clone();
                if let Err(e) = hotstore
                    .set_json_ex(&keys::worker_state(&pair_id), &state, keys::WORKER_STATE_TTL_SECS)
                    .await
                {
                    warn!(pair_id = %pair_id, error = %e, "state publish failed");
                }
            }
        })
    }

    /// One full pass of §4.1's 9 steps for this pair, plus the
    /// post-optimization kill-switch check (§4.2), state publication, and
    /// telemetry ingest.
    async fn run_one_cycle(&mut self) {
        self.epoch += 1;
        let epoch = self.epoch;
        let _span = info_span!("worker_cycle", pair_id = %self.pair_id, epoch).entered();

        let outcome = match run_cycle(
            &self.pair_id,
            epoch,
            &self.config,
            self.deps.market_data.as_ref(),
            &self.positions,
            &self.active_ranges,
            self.memory.warm_start,
            self.memory.regime.clone(),
            &self.deps.economics,
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(failure) => {
                warn!(pair_id = %self.pair_id, epoch, reason = failure.reason_code(), "cycle aborted");
                self.publish_error(epoch, failure.reason_code());
                if failure.is_fatal() {
                    error!(pair_id = %self.pair_id, epoch, "fatal cycle failure, worker will exit on next shutdown check");
                }
                return;
            }
        };

        self.memory.regime = outcome.regime.clone();
        self.memory.warm_start = outcome.warm_start;

        let now_ms = chrono::Utc::now().timestamp_millis();
        let (decision, kill_switch_state) = self.memory.apply_kill_switches(outcome.decision, now_ms);

        if let Err(e) = self
            .hotstore
            .set_no_ttl(&keys::optimizer(&self.pair_id), &self.memory.warm_start)
            .await
        {
            warn!(pair_id = %self.pair_id, epoch, error = %e, "failed to persist optimizer warm-start");
        }

        let read_only = self.config.is_read_only();
        let payer = self.config.signing_key().unwrap_or_default();
        let ctx = ExecutionContext {
            pair_id: &self.pair_id,
            epoch,
            payer: &payer,
            adapters: &self.deps.adapters,
            swap_executor: self.deps.swap_executor.as_ref(),
            portfolio_value_usd: self.positions.total_value_usd(),
            hotstore: Some(&self.hotstore),
        };

        let execution = match execute_decision(
            &ctx,
            &decision,
            &self.deps.pool_targets,
            &outcome.pool_ranges,
            &mut self.positions,
            read_only,
        )
        .await
        {
            Ok(execution) => execution,
            Err(failure) => {
                warn!(pair_id = %self.pair_id, epoch, reason = failure.reason_code(), "execution failed");
                self.publish_error(epoch, failure.reason_code());
                return;
            }
        };

        match &decision {
            Decision::Rs { range_shifts } => {
                self.memory.record_rs_event(now_ms);
                for shift in range_shifts {
                    self.active_ranges.insert(shift.pool_ref.clone(), shift.new_range.clone());
                }
            }
            Decision::Pra { .. } => {
                self.active_ranges = outcome.pool_ranges.clone();
            }
            Decision::Hold { .. } => {}
        }

        let periods_per_year = 365.0 * 86_400.0 / self.config.interval_sec as f64;
        self.memory.record_net_yield(outcome.current_apr / periods_per_year);

        if !execution.tx_logs.is_empty() {
            let records = execution.tx_logs.iter().map(|l| serde_json::json!(l)).collect();
            self.deps.telemetry.ingest(TX_LOG_STREAM, records);
        }

        let snapshot = EpochSnapshot {
            pair_id: self.pair_id.clone(),
            epoch,
            timestamp_ms: now_ms,
            portfolio_usd: self.positions.total_value_usd(),
            fees_usd: Usd::ZERO,
            gas_usd: Usd::ZERO,
            impermanent_loss_usd: Usd::ZERO,
            net_pnl_usd: Usd::ZERO,
            range_efficiency: 0.0,
            current_apr: outcome.current_apr,
            optimal_apr: outcome.optimal_apr,
            position_count: self.positions.len() as u32,
            decision_kind: decision.kind().to_string(),
        };
        self.deps.telemetry.ingest(EPOCH_SNAPSHOT_STREAM, vec![serde_json::json!(&snapshot)]);
        self.memory.push_snapshot(snapshot, self.config.data_retention_days);

        *self.published.lock() = WorkerState {
            pair_id: self.pair_id.clone(),
            epoch,
            status: WorkerStatus::Running,
            last_decision_kind: decision.kind().to_string(),
            updated_at_ms: now_ms,
            current_apr: outcome.current_apr,
            optimal_apr: outcome.optimal_apr,
            forces: outcome.forces,
            optimizer_params: self.memory.warm_start.params,
            optimizer_fitness: self.memory.warm_start.fitness,
            regime: self.memory.regime.clone(),
            kill_switch: kill_switch_state,
            error_reason: None,
        };

        info!(pair_id = %self.pair_id, epoch, decision = decision.kind(), mint_count = execution.mint_count, burn_count = execution.burn_count, "cycle complete");
    }

    fn publish_error(&self, epoch: u64, reason: &str) {
        let now_ms = chrono::Utc::now().timestamp_millis();
        let mut state = self.published.lock();
        state.epoch = epoch;
        state.status = WorkerStatus::Error;
        state.updated_at_ms = now_ms;
        state.error_reason = Some(reason.to_string());
    }
}

fn initial_state(pair_id: &PairId, warm_start: &OptimizerWarmStart) -> WorkerState {
    WorkerState {
        pair_id: pair_id.clone(),
        epoch: 0,
        status: WorkerStatus::Starting,
        last_decision_kind: "hold".to_string(),
        updated_at_ms: chrono::Utc::now().timestamp_millis(),
        current_apr: 0.0,
        optimal_apr: warm_start.fitness,
        forces: tendril_core::Forces::NEUTRAL,
        optimizer_params: warm_start.params,
        optimizer_fitness: warm_start.fitness,
        regime: RegimeState::normal(),
        kill_switch: KillSwitchState::inactive(),
        error_reason: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_kill_switches_forces_hold_on_excessive_rs() {
        let mut memory = CycleMemory::new(OptimizerWarmStart::defaults(default_params(), 0.0));
        for i in 0..10 {
            memory.record_rs_event(1_000 + i);
        }
        let (decision, state) = memory.apply_kill_switches(Decision::hold_unreasoned(), 2_000);
        assert!(decision.is_hold());
        assert!(state.active);
        assert_eq!(state.reason.as_deref(), Some("excessive_rs"));
    }

    #[test]
    fn test_apply_kill_switches_passthrough_when_clear() {
        let mut memory = CycleMemory::new(OptimizerWarmStart::defaults(default_params(), 0.0));
        for _ in 0..24 {
            memory.record_net_yield(0.01);
        }
        let decision = Decision::Pra { target_allocations: vec![] };
        let (out, state) = memory.apply_kill_switches(decision.clone(), 1_000);
        assert_eq!(out, decision);
        assert!(!state.active);
    }

    #[test]
    fn test_negative_trailing_yield_also_forces_hold() {
        let mut memory = CycleMemory::new(OptimizerWarmStart::defaults(default_params(), 0.0));
        for _ in 0..24 {
            memory.record_net_yield(-0.01);
        }
        let (decision, state) = memory.apply_kill_switches(Decision::hold_unreasoned(), 1_000);
        assert!(decision.is_hold());
        assert!(state.active);
        assert_eq!(state.reason.as_deref(), Some("negative_trailing_yield"));
    }

    #[test]
    fn test_prune_older_than_drops_stale_epochs() {
        let mut memory = CycleMemory::new(OptimizerWarmStart::defaults(default_params(), 0.0));
        memory.push_snapshot(sample_snapshot(1, 0), 90);
        memory.push_snapshot(sample_snapshot(2, 200 * 86_400_000), 90);
        memory.prune_older_than(200 * 86_400_000 + 1_000, 90);
        assert_eq!(memory.epoch_history.len(), 1);
        assert_eq!(memory.epoch_history[0].epoch, 2);
    }

    fn sample_snapshot(epoch: u64, timestamp_ms: i64) -> EpochSnapshot {
        EpochSnapshot {
            pair_id: PairId::new("USDC-USDT"),
            epoch,
            timestamp_ms,
            portfolio_usd: Usd::ZERO,
            fees_usd: Usd::ZERO,
            gas_usd: Usd::ZERO,
            impermanent_loss_usd: Usd::ZERO,
            net_pnl_usd: Usd::ZERO,
            range_efficiency: 0.0,
            current_apr: 0.0,
            optimal_apr: 0.0,
            position_count: 0,
            decision_kind: "hold".to_string(),
        }
    }
}
