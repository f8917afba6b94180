// SPDX-License-Identifier: MIT

//! `/healthz` and `/metrics` HTTP surface for the Controller process,
//! mirroring `wol-agent`'s health router.

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;

use wol_core::metrics::Metrics;

pub fn router(metrics: Metrics) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(move || metrics_body(metrics.clone())))
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn metrics_body(metrics: Metrics) -> (StatusCode, String) {
    (StatusCode::OK, metrics.encode())
}
