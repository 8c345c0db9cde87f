//! Prometheus scrape endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

use crate::api::types::ErrorEnvelope;
use crate::domain::metrics::MetricsRegistry;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

#[derive(Clone)]
pub struct MetricsApiState {
    pub registry: Arc<MetricsRegistry>,
}

pub fn routes(registry: Arc<MetricsRegistry>) -> Router<()> {
    Router::new()
        .route("/metrics", get(scrape))
        .with_state(MetricsApiState { registry })
}

async fn scrape(State(state): State<MetricsApiState>) -> Response {
    match state.registry.encode() {
        Ok(body) => ([(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorEnvelope::new("Failed to encode metrics")),
            )
                .into_response()
        }
    }
}
