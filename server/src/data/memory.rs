//! In-memory telemetry sink
//!
//! Keeps samples in process memory. Used for ephemeral runs and tests.

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::data::error::DataError;
use crate::data::traits::TelemetrySink;
use crate::data::types::{MetricLogRow, MetricSample};

#[derive(Debug, Default)]
pub struct MemorySink {
    rows: RwLock<Vec<MetricLogRow>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored samples
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    /// Snapshot of all stored samples in insertion order
    pub fn samples(&self) -> Vec<MetricSample> {
        self.rows.read().iter().map(|r| r.sample.clone()).collect()
    }
}

#[async_trait]
impl TelemetrySink for MemorySink {
    async fn append(&self, sample: &MetricSample) -> Result<String, DataError> {
        let id = uuid::Uuid::new_v4().to_string();
        self.rows.write().push(MetricLogRow {
            id: id.clone(),
            sample: sample.clone(),
        });
        Ok(id)
    }

    async fn list(
        &self,
        endpoint: Option<&str>,
        limit: u32,
    ) -> Result<Vec<MetricLogRow>, DataError> {
        let rows = self.rows.read();
        Ok(rows
            .iter()
            .rev()
            .filter(|r| endpoint.is_none_or(|e| r.sample.endpoint == e))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
