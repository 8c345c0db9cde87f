//! Domain logic for the clinical assistant
//!
//! - `usage` - Provider usage to cost conversion
//! - `metrics` - In-memory Prometheus registry for request telemetry
//! - `provider` - AI provider and audio source capabilities
//! - `clinical` - Transcription, extraction and diagnosis handlers

pub mod clinical;
pub mod metrics;
pub mod provider;
pub mod usage;

pub use metrics::MetricsRegistry;
pub use usage::UsageRecord;
