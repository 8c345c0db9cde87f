//! Telemetry sink trait
//!
//! Each backend (SQLite, in-memory) implements this trait so the metrics
//! layer can stay backend-agnostic.

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::types::{MetricLogRow, MetricSample};

/// Append-only durable store of per-request metric samples.
///
/// There is no update or delete path. Callers treat a failed append as
/// non-fatal: it is logged and the sample is dropped.
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    /// Persist one sample, returning the generated record identifier
    async fn append(&self, sample: &MetricSample) -> Result<String, DataError>;

    /// Most recent records first, optionally filtered by endpoint
    async fn list(
        &self,
        endpoint: Option<&str>,
        limit: u32,
    ) -> Result<Vec<MetricLogRow>, DataError>;

    /// Backend name for logging
    fn backend_name(&self) -> &'static str;
}
