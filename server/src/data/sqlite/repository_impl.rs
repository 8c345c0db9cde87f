//! TelemetrySink implementation for SQLite

use std::sync::Arc;

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::traits::TelemetrySink;
use crate::data::types::{MetricLogRow, MetricSample};

use super::SqliteService;
use super::repositories::{insert_metric_log, list_metric_logs};

#[async_trait]
impl TelemetrySink for Arc<SqliteService> {
    async fn append(&self, sample: &MetricSample) -> Result<String, DataError> {
        insert_metric_log(self.pool(), sample)
            .await
            .map_err(Into::into)
    }

    async fn list(
        &self,
        endpoint: Option<&str>,
        limit: u32,
    ) -> Result<Vec<MetricLogRow>, DataError> {
        list_metric_logs(self.pool(), endpoint, limit)
            .await
            .map_err(Into::into)
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
