//! Fallback handler

use axum::Json;
use axum::body::to_bytes;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::types::ErrorEnvelope;

const MAX_404_BODY_LOG: usize = 64 * 1024;

/// Handle 404 Not Found, logging the request at debug level
pub async fn handle_404(req: Request) -> impl IntoResponse {
    let not_found = (StatusCode::NOT_FOUND, Json(ErrorEnvelope::new("Not found")));
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return not_found;
    }

    let method = req.method().clone();
    let uri = req.uri().clone();
    let origin = req
        .headers()
        .get(axum::http::header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    match to_bytes(req.into_body(), MAX_404_BODY_LOG).await {
        Ok(body) => tracing::debug!(
            %method,
            %uri,
            origin = origin.as_deref(),
            body_bytes = body.len(),
            "[404] No route"
        ),
        Err(_) => tracing::debug!(%method, %uri, "[404] No route (failed to read body)"),
    }

    not_found
}
