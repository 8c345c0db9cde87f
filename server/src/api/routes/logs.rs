//! Read-only view over persisted request samples

use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use validator::Validate;

use crate::api::extractors::ValidatedQuery;
use crate::api::pipeline::HandlerError;
use crate::api::types::SuccessEnvelope;
use crate::core::constants::{DEFAULT_LOGS_LIMIT, MAX_LOGS_LIMIT};
use crate::data::TelemetrySink;

#[derive(Clone)]
pub struct LogsApiState {
    pub sink: Arc<dyn TelemetrySink>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ListLogsQuery {
    #[validate(length(min = 1, max = 64, message = "endpoint must be 1-64 characters"))]
    pub endpoint: Option<String>,
    #[validate(range(min = 1, max = MAX_LOGS_LIMIT, message = "limit must be between 1 and 500"))]
    pub limit: Option<u32>,
}

pub fn routes(sink: Arc<dyn TelemetrySink>) -> Router<()> {
    Router::new()
        .route("/logs", get(list_logs))
        .with_state(LogsApiState { sink })
}

async fn list_logs(
    State(state): State<LogsApiState>,
    ValidatedQuery(query): ValidatedQuery<ListLogsQuery>,
) -> Response {
    let limit = query.limit.unwrap_or(DEFAULT_LOGS_LIMIT);
    match state.sink.list(query.endpoint.as_deref(), limit).await {
        Ok(rows) => Json(SuccessEnvelope::new(rows)).into_response(),
        Err(e) => {
            tracing::error!(backend = state.sink.backend_name(), error = %e, "Failed to list logs");
            HandlerError::internal("Failed to list logs").into_response()
        }
    }
}
