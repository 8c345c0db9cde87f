//! Error-handling layer
//!
//! The single place where failures become error envelopes. Panics inside the
//! wrapped chain are recovered as well and reported as a bare 500.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;

use super::{BoxHandler, Handler, HandlerError, HandlerResult, Layer, Outcome, PipelineRequest};

#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorHandlingLayer;

impl Layer for ErrorHandlingLayer {
    fn wrap(&self, inner: BoxHandler) -> BoxHandler {
        Arc::new(ErrorHandling { inner })
    }
}

struct ErrorHandling {
    inner: BoxHandler,
}

#[async_trait]
impl Handler for ErrorHandling {
    async fn call(&self, request: PipelineRequest) -> HandlerResult {
        let method = request.method().clone();
        let path = request.uri().path().to_string();

        match AssertUnwindSafe(self.inner.call(request))
            .catch_unwind()
            .await
        {
            Ok(Ok(outcome)) => Ok(outcome),
            Ok(Err(e)) => {
                tracing::error!(
                    %method,
                    %path,
                    status = e.status_code().as_u16(),
                    error = ?e,
                    "Function error: {}",
                    e
                );
                Ok(Outcome::failed(e))
            }
            Err(panic) => {
                tracing::error!(
                    %method,
                    %path,
                    panic = %panic_message(panic.as_ref()),
                    "Handler panicked"
                );
                Ok(Outcome::failed(HandlerError::internal("")))
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::pipeline::{Disposition, compose, handler_fn};
    use crate::domain::usage::UsageRecord;
    use axum::body::{Bytes, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};

    fn request() -> PipelineRequest {
        Request::builder()
            .method("POST")
            .uri("/generateDiagnosis")
            .body(Bytes::new())
            .unwrap()
    }

    async fn body_json(outcome: Outcome) -> Value {
        let bytes = to_bytes(outcome.response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let chain = compose(
            vec![Box::new(ErrorHandlingLayer)],
            handler_fn(|_req| async {
                Ok(Outcome::completed(StatusCode::CREATED, UsageRecord::default()))
            }),
        );
        let outcome = chain.call(request()).await.unwrap();
        assert_eq!(outcome.response.status(), StatusCode::CREATED);
        assert_eq!(outcome.disposition, Disposition::Completed);
    }

    #[tokio::test]
    async fn test_failure_becomes_envelope() {
        let chain = compose(
            vec![Box::new(ErrorHandlingLayer)],
            handler_fn(|_req| async { Err(HandlerError::internal("provider timeout")) }),
        );
        let outcome = chain.call(request()).await.unwrap();

        assert_eq!(outcome.response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(outcome.disposition, Disposition::Failed);
        assert_eq!(
            body_json(outcome).await,
            json!({"success": false, "error": {"message": "provider timeout"}})
        );
    }

    #[tokio::test]
    async fn test_explicit_status_is_used() {
        let chain = compose(
            vec![Box::new(ErrorHandlingLayer)],
            handler_fn(|_req| async { Err(HandlerError::with_status(422, "unprocessable")) }),
        );
        let outcome = chain.call(request()).await.unwrap();
        assert_eq!(outcome.response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_panic_is_recovered_as_500() {
        let chain = compose(
            vec![Box::new(ErrorHandlingLayer)],
            handler_fn(|_req| async {
                if true {
                    panic!("index out of bounds");
                }
                Ok(Outcome::completed(StatusCode::OK, UsageRecord::default()))
            }),
        );
        let outcome = chain.call(request()).await.unwrap();

        assert_eq!(outcome.response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(outcome).await["error"]["message"],
            "Internal server error"
        );
    }
}
