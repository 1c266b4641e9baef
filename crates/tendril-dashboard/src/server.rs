//! Read/control HTTP API (§6.4), grounded on
//! `hip3-dashboard::server::create_router`'s `AppState`+`Router` pattern:
//! unauthenticated read endpoints, one bearer-gated control endpoint.

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use serde_json::{json, Value};
use tendril_core::{AllocationEntry, PairId};
use tendril_hotstore::{keys, ControlMessage};
use tracing::{info, warn};

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/pairs", get(list_pairs))
        .route("/pairs/{pair_id}/status", get(pair_status))
        .route("/pairs/{pair_id}/positions", get(pair_positions))
        .route("/pairs/{pair_id}/allocations", get(pair_allocations))
        .route("/pairs/{pair_id}/analyses", get(pair_analyses))
        .route("/pairs/{pair_id}/candles", get(pair_candles))
        .route("/pairs/{pair_id}/snapshots", get(pair_snapshots))
        .route("/pairs/{pair_id}/tx-log", get(pair_tx_log))
        .route("/orchestrator/status", get(orchestrator_status))
        .route("/workers/{pair_id}/restart", post(restart_worker))
        .with_state(state)
}

fn internal_error<E: std::fmt::Display>(e: E) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "not found").into_response()
}

fn usd_to_f64(v: tendril_core::Usd) -> f64 {
    v.inner().to_string().parse().unwrap_or(0.0)
}

async fn list_pairs(State(state): State<AppState>) -> Result<Json<Vec<String>>, Response> {
    let pairs = state.hotstore.smembers(&keys::workers_set()).await.map_err(internal_error)?;
    Ok(Json(pairs))
}

async fn pair_status(State(state): State<AppState>, Path(pair_id): Path<String>) -> Result<Response, Response> {
    let pair = PairId::new(pair_id);
    let worker_state = state
        .hotstore
        .get_json::<tendril_core::WorkerState>(&keys::worker_state(&pair))
        .await
        .map_err(internal_error)?;
    match worker_state {
        Some(s) => Ok(Json(s).into_response()),
        None => Ok(not_found()),
    }
}

async fn pair_positions(State(state): State<AppState>, Path(pair_id): Path<String>) -> Result<Response, Response> {
    let pair = PairId::new(pair_id);
    let positions = state
        .hotstore
        .hgetall_json::<tendril_core::Position>(&keys::positions(&pair))
        .await
        .map_err(internal_error)?;
    Ok(Json(positions.into_iter().map(|(_, p)| p).collect::<Vec<_>>()).into_response())
}

/// Derived from live `entry_value_usd`/`entry_apr`, not a persisted
/// `AllocationEntry` log — the hot store only ever holds current positions,
/// not the per-cycle allocation decision that produced them.
async fn pair_allocations(State(state): State<AppState>, Path(pair_id): Path<String>) -> Result<Response, Response> {
    let pair = PairId::new(pair_id);
    let positions = state
        .hotstore
        .hgetall_json::<tendril_core::Position>(&keys::positions(&pair))
        .await
        .map_err(internal_error)?;

    let total: f64 = positions.iter().map(|(_, p)| usd_to_f64(p.entry_value_usd)).sum();
    let entries: Vec<AllocationEntry> = positions
        .into_iter()
        .map(|(_, p)| {
            let value = usd_to_f64(p.entry_value_usd);
            let fraction = if total > 0.0 { value / total } else { 0.0 };
            AllocationEntry {
                pool_ref: p.pool_ref,
                fraction,
                expected_apr: p.entry_apr,
            }
        })
        .collect();
    Ok(Json(entries).into_response())
}

/// The optimizer's current view of this pair: forces, fitness, regime,
/// kill-switch state — all already published on `WorkerState`.
async fn pair_analyses(State(state): State<AppState>, Path(pair_id): Path<String>) -> Result<Response, Response> {
    let pair = PairId::new(pair_id);
    let worker_state = state
        .hotstore
        .get_json::<tendril_core::WorkerState>(&keys::worker_state(&pair))
        .await
        .map_err(internal_error)?;
    match worker_state {
        Some(s) => Ok(Json(json!({
            "forces": s.forces,
            "optimizerParams": s.optimizer_params,
            "optimizerFitness": s.optimizer_fitness,
            "regime": s.regime,
            "killSwitch": s.kill_switch,
            "currentApr": s.current_apr,
            "optimalApr": s.optimal_apr,
        }))
        .into_response()),
        None => Ok(not_found()),
    }
}

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    pub limit: Option<u32>,
}

async fn query_cold_log(state: &AppState, stream: &str, pair_id: &str, limit: Option<u32>) -> Result<Vec<Value>, Response> {
    let client = state
        .cold_log
        .as_ref()
        .ok_or_else(|| (StatusCode::SERVICE_UNAVAILABLE, "cold log not configured").into_response())?;
    client.query(stream, pair_id, limit).await.map_err(internal_error)
}

async fn pair_candles(
    State(state): State<AppState>,
    Path(pair_id): Path<String>,
    Query(q): Query<StreamQuery>,
) -> Result<Response, Response> {
    let records = query_cold_log(&state, "candles", &pair_id, q.limit).await?;
    Ok(Json(records).into_response())
}

async fn pair_snapshots(
    State(state): State<AppState>,
    Path(pair_id): Path<String>,
    Query(q): Query<StreamQuery>,
) -> Result<Response, Response> {
    let records = query_cold_log(&state, "epoch_snapshots", &pair_id, q.limit).await?;
    Ok(Json(records).into_response())
}

async fn pair_tx_log(
    State(state): State<AppState>,
    Path(pair_id): Path<String>,
    Query(q): Query<StreamQuery>,
) -> Result<Response, Response> {
    let records = query_cold_log(&state, "tx_log", &pair_id, q.limit).await?;
    Ok(Json(records).into_response())
}

async fn orchestrator_status(State(state): State<AppState>) -> Result<Response, Response> {
    let owner = state.hotstore.get_raw(&keys::orch_lock()).await.map_err(internal_error)?;
    Ok(Json(json!({
        "held": owner.is_some(),
        "ownerPid": owner,
    }))
    .into_response())
}

async fn restart_worker(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(pair_id): Path<String>,
) -> Response {
    if state.config.auth_enabled() && !check_bearer_auth(&headers, &state.config) {
        return unauthorized_response();
    }

    let pair = PairId::new(pair_id);
    match state
        .hotstore
        .publish_json(&keys::control_channel(), &ControlMessage::Restart { pair_id: pair.clone() })
        .await
    {
        Ok(()) => {
            info!(pair_id = %pair, "published restart control message");
            StatusCode::ACCEPTED.into_response()
        }
        Err(e) => {
            warn!(pair_id = %pair, error = %e, "failed to publish restart");
            internal_error(e)
        }
    }
}

fn check_bearer_auth(headers: &HeaderMap, config: &crate::config::DashboardConfig) -> bool {
    let expected = match &config.api_token {
        Some(t) => t,
        None => return true,
    };
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return false;
    };
    let Ok(value) = value.to_str() else {
        return false;
    };
    value.strip_prefix("Bearer ").map(|token| token == expected).unwrap_or(false)
}

fn unauthorized_response() -> Response {
    (StatusCode::UNAUTHORIZED, "unauthorized").into_response()
}
