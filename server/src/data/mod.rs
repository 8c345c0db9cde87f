//! Data storage layer
//!
//! - `sqlite` - Durable telemetry store (default)
//! - `memory` - Process-local telemetry store
//! - `types` - Telemetry record types shared by every backend
//! - `traits` - The `TelemetrySink` trait both backends implement
//! - `error` - Unified error type for all backends

pub mod error;
pub mod memory;
pub mod sqlite;
pub mod traits;
pub mod types;

pub use error::DataError;
pub use memory::MemorySink;
pub use sqlite::SqliteService;
pub use traits::TelemetrySink;
pub use types::{MetricLogRow, MetricSample};

use std::sync::Arc;

use crate::core::config::SinkBackend;
use crate::core::storage::AppStorage;

/// Telemetry service enum
///
/// Wraps the configured sink backend and owns its lifecycle.
pub enum TelemetryService {
    /// SQLite backend (default, durable)
    Sqlite(Arc<SqliteService>),
    /// In-memory backend (lost on exit)
    Memory(Arc<MemorySink>),
}

impl TelemetryService {
    /// Initialize the telemetry service based on configuration
    pub async fn init(backend: SinkBackend, storage: &AppStorage) -> Result<Self, DataError> {
        match backend {
            SinkBackend::Sqlite => {
                let service = SqliteService::init(storage).await?;
                Ok(Self::Sqlite(Arc::new(service)))
            }
            SinkBackend::Memory => Ok(Self::Memory(Arc::new(MemorySink::new()))),
        }
    }

    /// Get the sink trait object for appends and queries
    pub fn sink(&self) -> Arc<dyn TelemetrySink> {
        match self {
            Self::Sqlite(s) => Arc::new(Arc::clone(s)),
            Self::Memory(m) => m.clone(),
        }
    }

    /// Run a WAL checkpoint (SQLite) before shutdown
    pub async fn checkpoint(&self) -> Result<(), DataError> {
        match self {
            Self::Sqlite(s) => s.checkpoint().await.map_err(Into::into),
            Self::Memory(_) => Ok(()),
        }
    }

    /// Close the underlying store gracefully
    pub async fn close(&self) {
        match self {
            Self::Sqlite(s) => s.close().await,
            Self::Memory(_) => {}
        }
    }

    pub fn backend(&self) -> SinkBackend {
        match self {
            Self::Sqlite(_) => SinkBackend::Sqlite,
            Self::Memory(_) => SinkBackend::Memory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backend_shares_sink() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = AppStorage::init_for_test(temp_dir.path().to_path_buf()).await;
        let service = TelemetryService::init(SinkBackend::Memory, &storage)
            .await
            .unwrap();

        assert_eq!(service.backend(), SinkBackend::Memory);
        service
            .sink()
            .append(&MetricSample::new("generateDiagnosis", 1, 2, 0.0))
            .await
            .unwrap();

        let rows = service.sink().list(None, 10).await.unwrap();
        assert_eq!(rows.len(), 1);
        service.checkpoint().await.unwrap();
        service.close().await;
    }

    #[tokio::test]
    async fn test_sqlite_backend_reports_name() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = AppStorage::init_for_test(temp_dir.path().to_path_buf()).await;
        let service = TelemetryService::init(SinkBackend::Sqlite, &storage)
            .await
            .unwrap();

        assert_eq!(service.backend(), SinkBackend::Sqlite);
        assert_eq!(service.sink().backend_name(), "sqlite");
        service.close().await;
    }
}
