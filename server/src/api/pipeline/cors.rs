//! Open cross-origin policy
//!
//! Every origin is allowed by reflecting the request origin. Credentials are
//! not advertised. The header work is delegated to `tower_http::cors`, which
//! wraps the inner chain as a tower service for the duration of one request.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use axum::response::Response;
use tower::util::BoxCloneSyncService;
use tower::{Layer as _, ServiceExt, service_fn};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer as CorsPolicy};

use super::{
    BoxHandler, Disposition, Handler, HandlerError, HandlerResult, Layer, Outcome,
    PipelineRequest,
};
use crate::domain::usage::UsageRecord;

const ALLOWED_METHODS: [Method; 6] = [
    Method::GET,
    Method::HEAD,
    Method::PUT,
    Method::PATCH,
    Method::POST,
    Method::DELETE,
];

fn policy() -> CorsPolicy {
    CorsPolicy::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(ALLOWED_METHODS)
        .allow_headers(AllowHeaders::mirror_request())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CorsLayer;

impl Layer for CorsLayer {
    fn wrap(&self, inner: BoxHandler) -> BoxHandler {
        let service = policy().layer(service_fn(move |request: PipelineRequest| {
            let inner = inner.clone();
            async move {
                let Outcome {
                    mut response,
                    usage,
                    disposition,
                } = inner.call(request).await?;
                response
                    .extensions_mut()
                    .insert(Settled { usage, disposition });
                Ok::<_, HandlerError>(response)
            }
        }));
        Arc::new(Cors {
            service: BoxCloneSyncService::new(service),
        })
    }
}

/// What the inner chain reported, carried across the tower service boundary
#[derive(Debug, Clone, Copy)]
struct Settled {
    usage: Option<UsageRecord>,
    disposition: Disposition,
}

struct Cors {
    service: BoxCloneSyncService<PipelineRequest, Response, HandlerError>,
}

#[async_trait]
impl Handler for Cors {
    async fn call(&self, request: PipelineRequest) -> HandlerResult {
        let mut response = self.service.clone().oneshot(request).await?;

        // preflights are answered by the policy without reaching the chain
        let Some(settled) = response.extensions_mut().remove::<Settled>() else {
            *response.status_mut() = StatusCode::NO_CONTENT;
            return Ok(Outcome::rejected(response));
        };

        Ok(Outcome {
            response,
            usage: settled.usage,
            disposition: settled.disposition,
        })
    }
}
