//! Clinical pipeline endpoints
//!
//! Each endpoint is one core handler wrapped by the same chain:
//! `CORS -> ErrorHandling -> Metrics -> Validation -> core`.

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::body::{Bytes, to_bytes};
use axum::extract::Request;
use axum::response::Response;
use axum::routing::{MethodRouter, post};
use serde::de::DeserializeOwned;

use crate::api::pipeline::{
    BodyTooLarge, BoxHandler, CorsLayer, ErrorHandlingLayer, FieldKind, HandlerError, Layer, MetricsLayer,
    Outcome, RequestSchema, ValidationLayer, compose, handler_fn, respond,
};
use crate::api::types::SuccessEnvelope;
use crate::core::constants::DEFAULT_BODY_LIMIT;
use crate::core::context::AppContext;
use crate::domain::clinical::{DiagnosisRequest, ExtractRequest, TranscribeRequest};

pub const TRANSCRIBE_ENDPOINT: &str = "transcribeAudio";
pub const EXTRACT_ENDPOINT: &str = "extractMedicalData";
pub const DIAGNOSIS_ENDPOINT: &str = "generateDiagnosis";

impl RequestSchema for TranscribeRequest {
    const FIELDS: &'static [(&'static str, FieldKind)] = &[("url", FieldKind::String)];
}

impl RequestSchema for ExtractRequest {
    const FIELDS: &'static [(&'static str, FieldKind)] = &[("text", FieldKind::String)];
}

impl RequestSchema for DiagnosisRequest {
    const FIELDS: &'static [(&'static str, FieldKind)] = &[("medical_info", FieldKind::Object)];
}

// ============================================================================
// Routes
// ============================================================================

pub fn routes(ctx: Arc<AppContext>) -> Router<()> {
    Router::new()
        .route(
            &format!("/{}", TRANSCRIBE_ENDPOINT),
            endpoint(chain::<TranscribeRequest>(
                &ctx,
                TRANSCRIBE_ENDPOINT,
                transcribe_core(ctx.clone()),
            )),
        )
        .route(
            &format!("/{}", EXTRACT_ENDPOINT),
            endpoint(chain::<ExtractRequest>(
                &ctx,
                EXTRACT_ENDPOINT,
                extract_core(ctx.clone()),
            )),
        )
        .route(
            &format!("/{}", DIAGNOSIS_ENDPOINT),
            endpoint(chain::<DiagnosisRequest>(
                &ctx,
                DIAGNOSIS_ENDPOINT,
                diagnosis_core(ctx.clone()),
            )),
        )
}

/// The standard layer order around a core handler
pub fn chain<T: RequestSchema>(
    ctx: &AppContext,
    endpoint: &'static str,
    core: BoxHandler,
) -> BoxHandler {
    let layers: Vec<Box<dyn Layer>> = vec![
        Box::new(CorsLayer),
        Box::new(ErrorHandlingLayer),
        Box::new(MetricsLayer::new(
            endpoint,
            ctx.sink.clone(),
            ctx.metrics.clone(),
            ctx.telemetry.append_timeout,
        )),
        Box::new(ValidationLayer::<T>::new()),
    ];
    compose(layers, core)
}

/// Serve a chain on POST and on OPTIONS preflight
fn endpoint(chain: BoxHandler) -> MethodRouter<()> {
    let handler = move |request: Request| {
        let chain = chain.clone();
        async move { dispatch(chain, request).await }
    };
    post(handler.clone()).options(handler)
}

async fn dispatch(chain: BoxHandler, request: Request) -> Response {
    let (mut parts, body) = request.into_parts();
    let body = match to_bytes(body, DEFAULT_BODY_LIMIT).await {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!(error = %e, "Failed to read request body");
            parts.extensions.insert(BodyTooLarge);
            Bytes::new()
        }
    };
    respond(chain.as_ref(), Request::from_parts(parts, body)).await
}

// ============================================================================
// Core handlers
// ============================================================================

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, HandlerError> {
    serde_json::from_slice(body)
        .map_err(|e| HandlerError::with_status(400, format!("Invalid request body: {}", e)))
}

fn transcribe_core(ctx: Arc<AppContext>) -> BoxHandler {
    handler_fn(move |request| {
        let ctx = ctx.clone();
        async move {
            let body: TranscribeRequest = parse_body(request.body())?;
            let billed = ctx.clinical.transcribe(&body).await?;
            Ok(Outcome::completed(
                Json(SuccessEnvelope::new(billed.data)),
                billed.usage,
            ))
        }
    })
}

fn extract_core(ctx: Arc<AppContext>) -> BoxHandler {
    handler_fn(move |request| {
        let ctx = ctx.clone();
        async move {
            let body: ExtractRequest = parse_body(request.body())?;
            let billed = ctx.clinical.extract(&body).await?;
            Ok(Outcome::completed(
                Json(SuccessEnvelope::new(billed.data)),
                billed.usage,
            ))
        }
    })
}

fn diagnosis_core(ctx: Arc<AppContext>) -> BoxHandler {
    handler_fn(move |request| {
        let ctx = ctx.clone();
        async move {
            let body: DiagnosisRequest = parse_body(request.body())?;
            let billed = ctx.clinical.diagnose(&body).await?;
            Ok(Outcome::completed(
                Json(SuccessEnvelope::new(billed.data)),
                billed.usage,
            ))
        }
    })
}
