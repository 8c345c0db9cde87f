//! Explicit application context
//!
//! Everything a request needs, built once at startup and shared by
//! reference. Tests build their own isolated contexts.

use std::sync::Arc;

use crate::core::config::TelemetryConfig;
use crate::data::TelemetrySink;
use crate::domain::clinical::ClinicalService;
use crate::domain::metrics::MetricsRegistry;

pub struct AppContext {
    pub clinical: ClinicalService,
    pub sink: Arc<dyn TelemetrySink>,
    pub metrics: Arc<MetricsRegistry>,
    pub telemetry: TelemetryConfig,
}

impl AppContext {
    pub fn new(
        clinical: ClinicalService,
        sink: Arc<dyn TelemetrySink>,
        metrics: Arc<MetricsRegistry>,
        telemetry: TelemetryConfig,
    ) -> Self {
        Self {
            clinical,
            sink,
            metrics,
            telemetry,
        }
    }
}
