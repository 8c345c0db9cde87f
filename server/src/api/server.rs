//! API server initialization

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use super::middleware;
use super::routes::{clinical, health, logs, metrics};
use crate::core::CoreApp;
use crate::core::constants::DEFAULT_BODY_LIMIT;
use crate::core::context::AppContext;

pub struct ApiServer {
    app: CoreApp,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        Self { app }
    }

    /// Full application router over an explicit context
    pub fn router(ctx: Arc<AppContext>) -> Router {
        Router::new()
            .route("/api/v1/health", get(health::health))
            .merge(clinical::routes(ctx.clone()))
            .merge(metrics::routes(ctx.metrics.clone()))
            .nest("/api/v1", logs::routes(ctx.sink.clone()))
            .fallback(middleware::handle_404)
            .layer(CompressionLayer::new())
            .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT))
            .layer(TraceLayer::new_for_http())
    }

    /// Returns CoreApp for graceful shutdown
    pub async fn start(self) -> Result<CoreApp> {
        let Self { app } = self;
        let shutdown = app.shutdown.clone();

        let addr = SocketAddr::new(app.config.server.host.parse()?, app.config.server.port);
        let router = Self::router(app.context.clone());

        let listener = TcpListener::bind(addr).await?;
        tracing::info!(%addr, backend = %app.telemetry.backend(), "Server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        Ok(app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MemorySink;
    use crate::testing::{StubAudio, StubProvider, test_context};
    use axum::body::{Body, to_bytes};
    use axum::extract::Request;
    use axum::http::{StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let ctx = test_context(
            StubProvider::completion("{}", 1),
            StubAudio::bytes(b"x"),
            Arc::new(MemorySink::new()),
        );
        let response = ApiServer::router(ctx)
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404_envelope() {
        let ctx = test_context(
            StubProvider::completion("{}", 1),
            StubAudio::bytes(b"x"),
            Arc::new(MemorySink::new()),
        );
        let response = ApiServer::router(ctx)
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["success"], false);
    }

    #[tokio::test]
    async fn test_sampled_request_shows_up_in_logs_and_metrics() {
        let sink = Arc::new(MemorySink::new());
        let ctx = test_context(
            StubProvider::completion(r#"{"symptoms":[]}"#, 42),
            StubAudio::bytes(b"x"),
            sink,
        );
        let router = ApiServer::router(ctx);

        let response = router
            .clone()
            .oneshot(
                Request::post("/extractMedicalData")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json!({"text": "dizzy"}).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let logs = router
            .clone()
            .oneshot(Request::get("/api/v1/logs").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let logs = body_json(logs).await;
        assert_eq!(logs["data"][0]["endpoint"], "extractMedicalData");
        assert_eq!(logs["data"][0]["tokens"], 42);

        let scrape = router
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let text = String::from_utf8(
            to_bytes(scrape.into_body(), usize::MAX)
                .await
                .unwrap()
                .to_vec(),
        )
        .unwrap();
        assert!(text.contains("openai_tokens_total"));
    }
}
