//! Telemetry record types shared by every sink backend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One measured request, as handed to the telemetry sink.
///
/// Serializes to the persisted record shape
/// `{ endpoint, ms, tokens, costUsd, timestamp }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub endpoint: String,
    #[serde(rename = "ms")]
    pub duration_ms: u64,
    pub tokens: u64,
    #[serde(rename = "costUsd")]
    pub cost_usd: f64,
    pub timestamp: DateTime<Utc>,
}

impl MetricSample {
    /// Sample stamped with the current time
    pub fn new(endpoint: impl Into<String>, duration_ms: u64, tokens: u64, cost_usd: f64) -> Self {
        Self {
            endpoint: endpoint.into(),
            duration_ms,
            tokens,
            cost_usd,
            timestamp: Utc::now(),
        }
    }
}

/// A persisted sample with the identifier the sink generated for it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricLogRow {
    pub id: String,
    #[serde(flatten)]
    pub sample: MetricSample,
}
