//! Request-handling pipeline
//!
//! A pipeline is one core [`Handler`] wrapped by an ordered list of
//! [`Layer`]s. [`compose`] builds the chain so the first layer is the
//! outermost:
//!
//! ```text
//! compose([L1, L2, L3], C)(req) == L1(L2(L3(C)))(req)
//! ```
//!
//! Provider usage is threaded explicitly through [`Outcome`] so every layer
//! sees exactly what the core produced for this request and nothing else.

mod cors;
mod error;
mod metrics;
mod recover;
mod validation;

pub use cors::CorsLayer;
pub use error::HandlerError;
pub use metrics::MetricsLayer;
pub use recover::ErrorHandlingLayer;
pub use validation::{BodyTooLarge, FieldKind, RequestSchema, ValidationLayer, validate_body};

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::Request;
use axum::response::{IntoResponse, Response};

use crate::domain::usage::UsageRecord;

/// Inbound request with its body fully buffered
pub type PipelineRequest = Request<Bytes>;

pub type HandlerResult = Result<Outcome, HandlerError>;

/// Shared, type-erased handler
pub type BoxHandler = Arc<dyn Handler>;

/// How the chain finished for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Core handler ran and returned normally
    Completed,
    /// Short-circuited before the core handler (validation, preflight)
    Rejected,
    /// A failure inside the chain was turned into an error envelope
    Failed,
}

/// Response plus the usage the core handler attributed to it
#[derive(Debug)]
pub struct Outcome {
    pub response: Response,
    pub usage: Option<UsageRecord>,
    pub disposition: Disposition,
}

impl Outcome {
    pub fn completed(response: impl IntoResponse, usage: UsageRecord) -> Self {
        Self {
            response: response.into_response(),
            usage: Some(usage),
            disposition: Disposition::Completed,
        }
    }

    pub fn rejected(response: impl IntoResponse) -> Self {
        Self {
            response: response.into_response(),
            usage: None,
            disposition: Disposition::Rejected,
        }
    }

    pub fn failed(response: impl IntoResponse) -> Self {
        Self {
            response: response.into_response(),
            usage: None,
            disposition: Disposition::Failed,
        }
    }
}

#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, request: PipelineRequest) -> HandlerResult;
}

/// Wraps a handler, adding behavior before and after it runs
pub trait Layer: Send + Sync {
    fn wrap(&self, inner: BoxHandler) -> BoxHandler;
}

/// Build `layers[0](layers[1](…layers[n-1](core)…))`.
///
/// No layer runs at build time. An empty list returns `core` itself.
pub fn compose(layers: Vec<Box<dyn Layer>>, core: BoxHandler) -> BoxHandler {
    layers
        .iter()
        .rev()
        .fold(core, |inner, layer| layer.wrap(inner))
}

struct FnHandler<F>(F);

#[async_trait]
impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(PipelineRequest) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    async fn call(&self, request: PipelineRequest) -> HandlerResult {
        (self.0)(request).await
    }
}

/// Adapt an async closure into a handler
pub fn handler_fn<F, Fut>(f: F) -> BoxHandler
where
    F: Fn(PipelineRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(FnHandler(f))
}

/// Run a chain and turn an escaped error into its envelope.
///
/// Chains that include [`ErrorHandlingLayer`] never take the error branch.
pub async fn respond(chain: &dyn Handler, request: PipelineRequest) -> Response {
    match chain.call(request).await {
        Ok(outcome) => outcome.response,
        Err(e) => e.into_response(),
    }
}
