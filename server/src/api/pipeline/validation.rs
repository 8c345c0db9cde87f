//! Body validation layer
//!
//! Checks the JSON body against a [`RequestSchema`] before any inner layer
//! runs. On success the body is replaced by its normalized form (unknown keys
//! dropped). On failure the chain stops with a 400 and per-field messages.
//! A body that overflowed the read limit stops the chain with a 413.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Json;
use axum::body::Bytes;
use axum::http::{Request, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use validator::Validate;

use super::{BoxHandler, Handler, HandlerResult, Layer, Outcome, PipelineRequest};
use crate::api::extractors::field_errors;
use crate::api::types::{ErrorEnvelope, FieldErrors};

const VALIDATION_FAILED: &str = "Validation failed";
const BODY_TOO_LARGE: &str = "Request body too large";
const BODY_FIELD: &str = "body";
const REQUIRED: &str = "Required";

/// Request extension set when the body exceeded the read limit.
///
/// The request still runs through the chain with an empty body so outer
/// layers see it; validation answers it with a 413.
#[derive(Debug, Clone, Copy)]
pub struct BodyTooLarge;

/// Expected JSON type of a top-level field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Object,
}

impl FieldKind {
    fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Object => "object",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Object => value.is_object(),
        }
    }
}

/// A request body type with a declared field layout
pub trait RequestSchema: DeserializeOwned + Serialize + Validate + Send + Sync + 'static {
    /// Top-level fields and their JSON types
    const FIELDS: &'static [(&'static str, FieldKind)];
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn single(field: &str, message: impl Into<String>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.insert(field.to_string(), vec![message.into()]);
    errors
}

/// Validate a raw body against `T`, returning the normalized JSON value
pub fn validate_body<T: RequestSchema>(body: &[u8]) -> Result<Value, FieldErrors> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(single(BODY_FIELD, REQUIRED));
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|e| single(BODY_FIELD, format!("Invalid JSON: {}", e)))?;

    let map = match value {
        Value::Object(map) => map,
        other => {
            return Err(single(
                BODY_FIELD,
                format!("Expected object, received {}", kind_of(&other)),
            ));
        }
    };

    let mut errors = FieldErrors::new();
    for (field, kind) in T::FIELDS {
        match map.get(*field) {
            None => {
                errors.insert(field.to_string(), vec![REQUIRED.to_string()]);
            }
            Some(v) if !kind.matches(v) => {
                errors.insert(
                    field.to_string(),
                    vec![format!("Expected {}, received {}", kind.name(), kind_of(v))],
                );
            }
            Some(_) => {}
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    let known: Map<String, Value> = map
        .into_iter()
        .filter(|(k, _)| T::FIELDS.iter().any(|(f, _)| *f == k.as_str()))
        .collect();
    let typed: T = serde_json::from_value(Value::Object(known))
        .map_err(|e| single(BODY_FIELD, e.to_string()))?;

    typed.validate().map_err(|errs| field_errors(&errs))?;

    serde_json::to_value(&typed).map_err(|e| single(BODY_FIELD, e.to_string()))
}

pub struct ValidationLayer<T> {
    _schema: PhantomData<fn() -> T>,
}

impl<T> ValidationLayer<T> {
    pub fn new() -> Self {
        Self {
            _schema: PhantomData,
        }
    }
}

impl<T> Default for ValidationLayer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RequestSchema> Layer for ValidationLayer<T> {
    fn wrap(&self, inner: BoxHandler) -> BoxHandler {
        Arc::new(Validation::<T> {
            inner,
            _schema: PhantomData,
        })
    }
}

struct Validation<T> {
    inner: BoxHandler,
    _schema: PhantomData<fn() -> T>,
}

#[async_trait]
impl<T: RequestSchema> Handler for Validation<T> {
    async fn call(&self, request: PipelineRequest) -> HandlerResult {
        let (parts, body) = request.into_parts();

        if parts.extensions.get::<BodyTooLarge>().is_some() {
            tracing::debug!(path = %parts.uri.path(), "Request rejected: body too large");
            return Ok(Outcome::rejected((
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(ErrorEnvelope::new(BODY_TOO_LARGE)),
            )));
        }

        match validate_body::<T>(&body) {
            Ok(normalized) => {
                let body = Bytes::from(normalized.to_string());
                self.inner.call(Request::from_parts(parts, body)).await
            }
            Err(fields) => {
                tracing::debug!(path = %parts.uri.path(), fields = ?fields, "Request rejected by validation");
                Ok(Outcome::rejected((
                    StatusCode::BAD_REQUEST,
                    Json(ErrorEnvelope::with_fields(VALIDATION_FAILED, fields)),
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::pipeline::{Disposition, compose, handler_fn};
    use crate::domain::clinical::{DiagnosisRequest, ExtractRequest, TranscribeRequest};
    use crate::domain::usage::UsageRecord;
    use parking_lot::Mutex;
    use serde_json::json;

    #[test]
    fn test_invalid_url_reported_on_field() {
        let errors = validate_body::<TranscribeRequest>(br#"{"url":"not-a-url"}"#).unwrap_err();
        assert_eq!(errors["url"], vec!["Invalid url"]);
    }

    #[test]
    fn test_missing_field_is_required() {
        let errors = validate_body::<ExtractRequest>(b"{}").unwrap_err();
        assert_eq!(errors["text"], vec!["Required"]);
    }

    #[test]
    fn test_wrong_type_message() {
        let errors = validate_body::<ExtractRequest>(br#"{"text": 5}"#).unwrap_err();
        assert_eq!(errors["text"], vec!["Expected string, received number"]);

        let errors =
            validate_body::<DiagnosisRequest>(br#"{"medical_info": "fever"}"#).unwrap_err();
        assert_eq!(errors["medical_info"], vec!["Expected object, received string"]);
    }

    #[test]
    fn test_empty_text_rejected() {
        let errors = validate_body::<ExtractRequest>(br#"{"text": ""}"#).unwrap_err();
        assert_eq!(errors["text"], vec!["Text is required"]);
    }

    #[test]
    fn test_non_object_and_garbage_bodies() {
        let errors = validate_body::<ExtractRequest>(b"[1,2]").unwrap_err();
        assert_eq!(errors["body"], vec!["Expected object, received array"]);

        let errors = validate_body::<ExtractRequest>(b"{not json").unwrap_err();
        assert!(errors["body"][0].starts_with("Invalid JSON"));

        let errors = validate_body::<ExtractRequest>(b"").unwrap_err();
        assert_eq!(errors["body"], vec!["Required"]);
    }

    #[test]
    fn test_normalization_drops_unknown_keys() {
        let normalized =
            validate_body::<ExtractRequest>(br#"{"text":"cough","extra":true}"#).unwrap();
        assert_eq!(normalized, json!({"text": "cough"}));
    }

    #[tokio::test]
    async fn test_layer_forwards_normalized_body() {
        let seen = Arc::new(Mutex::new(None));
        let seen_by_core = seen.clone();
        let chain = compose(
            vec![Box::new(ValidationLayer::<ExtractRequest>::new())],
            handler_fn(move |req: PipelineRequest| {
                let seen = seen_by_core.clone();
                async move {
                    *seen.lock() = Some(req.into_body());
                    Ok(Outcome::completed(StatusCode::OK, UsageRecord::default()))
                }
            }),
        );

        let request = Request::builder()
            .method("POST")
            .uri("/extractMedicalData")
            .body(Bytes::from_static(br#"{"text":"cough","junk":1}"#))
            .unwrap();
        let outcome = chain.call(request).await.unwrap();

        assert_eq!(outcome.disposition, Disposition::Completed);
        let body = seen.lock().clone().unwrap();
        let forwarded: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(forwarded, json!({"text": "cough"}));
    }

    #[tokio::test]
    async fn test_layer_rejection_skips_inner() {
        let calls = Arc::new(Mutex::new(0));
        let counted = calls.clone();
        let chain = compose(
            vec![Box::new(ValidationLayer::<TranscribeRequest>::new())],
            handler_fn(move |_req| {
                let calls = counted.clone();
                async move {
                    *calls.lock() += 1;
                    Ok(Outcome::completed(StatusCode::OK, UsageRecord::default()))
                }
            }),
        );

        let request = Request::builder()
            .method("POST")
            .uri("/transcribeAudio")
            .body(Bytes::from_static(br#"{"url":"not-a-url"}"#))
            .unwrap();
        let outcome = chain.call(request).await.unwrap();

        assert_eq!(outcome.response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(outcome.disposition, Disposition::Rejected);
        assert_eq!(*calls.lock(), 0);
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected_with_413() {
        let chain = compose(
            vec![Box::new(ValidationLayer::<ExtractRequest>::new())],
            handler_fn(|_req| async {
                Ok(Outcome::completed(StatusCode::OK, UsageRecord::default()))
            }),
        );

        let mut request = Request::builder()
            .method("POST")
            .uri("/extractMedicalData")
            .body(Bytes::new())
            .unwrap();
        request.extensions_mut().insert(BodyTooLarge);
        let outcome = chain.call(request).await.unwrap();

        assert_eq!(outcome.response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(outcome.disposition, Disposition::Rejected);
    }
}
