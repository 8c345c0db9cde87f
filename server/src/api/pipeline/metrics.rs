//! Metrics layer
//!
//! Times the wrapped chain and records one sample per handled request: to the
//! in-memory registry and to the telemetry sink. Failures and panics are
//! sampled with zero usage before they propagate outward. Validation
//! rejections and preflights are not sampled. A failing or slow sink never affects the
//! response; the sample is dropped with a log line.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::FutureExt;

use super::{BoxHandler, Disposition, Handler, HandlerResult, Layer, PipelineRequest};
use crate::data::TelemetrySink;
use crate::data::types::MetricSample;
use crate::domain::metrics::MetricsRegistry;
use crate::domain::usage::UsageRecord;

#[derive(Clone)]
pub struct MetricsLayer {
    endpoint: &'static str,
    sink: Arc<dyn TelemetrySink>,
    registry: Arc<MetricsRegistry>,
    append_timeout: Duration,
}

impl MetricsLayer {
    pub fn new(
        endpoint: &'static str,
        sink: Arc<dyn TelemetrySink>,
        registry: Arc<MetricsRegistry>,
        append_timeout: Duration,
    ) -> Self {
        Self {
            endpoint,
            sink,
            registry,
            append_timeout,
        }
    }
}

impl Layer for MetricsLayer {
    fn wrap(&self, inner: BoxHandler) -> BoxHandler {
        Arc::new(Metrics {
            layer: self.clone(),
            inner,
        })
    }
}

struct Metrics {
    layer: MetricsLayer,
    inner: BoxHandler,
}

impl Metrics {
    async fn record(&self, sample: MetricSample) {
        self.layer.registry.observe(&sample);

        match tokio::time::timeout(self.layer.append_timeout, self.layer.sink.append(&sample))
            .await
        {
            Ok(Ok(id)) => tracing::debug!(
                id = %id,
                endpoint = %sample.endpoint,
                ms = sample.duration_ms,
                tokens = sample.tokens,
                "Metrics logged: {} - {}ms, {} tokens, ${:.4}",
                sample.endpoint,
                sample.duration_ms,
                sample.tokens,
                sample.cost_usd
            ),
            Ok(Err(e)) => tracing::error!(
                endpoint = %sample.endpoint,
                backend = self.layer.sink.backend_name(),
                error = %e,
                "Failed to persist metric sample"
            ),
            Err(_) => tracing::warn!(
                endpoint = %sample.endpoint,
                backend = self.layer.sink.backend_name(),
                timeout_ms = self.layer.append_timeout.as_millis() as u64,
                "Metric sample append timed out, dropping sample"
            ),
        }
    }
}

#[async_trait]
impl Handler for Metrics {
    async fn call(&self, request: PipelineRequest) -> HandlerResult {
        let start = Instant::now();
        let caught = AssertUnwindSafe(self.inner.call(request))
            .catch_unwind()
            .await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let usage = match &caught {
            Ok(Ok(outcome)) if outcome.disposition == Disposition::Rejected => None,
            Ok(Ok(outcome)) => Some(outcome.usage.unwrap_or_default()),
            Ok(Err(_)) | Err(_) => Some(UsageRecord::default()),
        };

        if let Some(usage) = usage {
            self.record(MetricSample::new(
                self.layer.endpoint,
                duration_ms,
                usage.tokens,
                usage.cost_usd,
            ))
            .await;
        }

        // the sample is written; the error-handling layer renders the panic
        match caught {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}
