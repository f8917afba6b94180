// SPDX-License-Identifier: MIT

//! `/healthz`, `/readyz`, `/metrics` HTTP surface (spec.md §4.2.4).

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;

use crate::state::AgentState;

pub fn router(state: Arc<AgentState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

async fn healthz(State(state): State<Arc<AgentState>>) -> StatusCode {
    if state.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn readyz(State(state): State<Arc<AgentState>>) -> StatusCode {
    if state.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn metrics(State(state): State<Arc<AgentState>>) -> (StatusCode, String) {
    let mut body = state.metrics.encode();
    body.push_str(&format!("wol_agent_dedupe_cache_size {}\n", state.dedupe.len()));
    (StatusCode::OK, body)
}
