//! In-memory metrics registry
//!
//! Pull-based mirror of the telemetry sink: a latency histogram and token and
//! cost counters, all labeled by endpoint. One registry per application
//! context, so tests never share counters.

use prometheus::{
    CounterVec, Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

use crate::core::constants::{LATENCY_BUCKETS_MS, METRIC_COST, METRIC_LATENCY, METRIC_TOKENS};
use crate::data::types::MetricSample;

const ENDPOINT_LABEL: &str = "endpoint";

pub struct MetricsRegistry {
    registry: Registry,
    latency_ms: HistogramVec,
    tokens_total: IntCounterVec,
    cost_usd: CounterVec,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let latency_ms = HistogramVec::new(
            HistogramOpts::new(METRIC_LATENCY, "Execution time per function")
                .buckets(LATENCY_BUCKETS_MS.to_vec()),
            &[ENDPOINT_LABEL],
        )?;
        let tokens_total = IntCounterVec::new(
            Opts::new(METRIC_TOKENS, "Sum of tokens used"),
            &[ENDPOINT_LABEL],
        )?;
        let cost_usd = CounterVec::new(
            Opts::new(METRIC_COST, "Estimated cost in USD"),
            &[ENDPOINT_LABEL],
        )?;

        registry.register(Box::new(latency_ms.clone()))?;
        registry.register(Box::new(tokens_total.clone()))?;
        registry.register(Box::new(cost_usd.clone()))?;

        Ok(Self {
            registry,
            latency_ms,
            tokens_total,
            cost_usd,
        })
    }

    /// Record one sample: latency always, counters only when non-zero
    pub fn observe(&self, sample: &MetricSample) {
        let endpoint = sample.endpoint.as_str();
        self.latency_ms
            .with_label_values(&[endpoint])
            .observe(sample.duration_ms as f64);
        if sample.tokens > 0 {
            self.tokens_total
                .with_label_values(&[endpoint])
                .inc_by(sample.tokens);
        }
        if sample.cost_usd > 0.0 {
            self.cost_usd
                .with_label_values(&[endpoint])
                .inc_by(sample.cost_usd);
        }
    }

    /// Prometheus text exposition format
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    /// Number of latency observations for an endpoint
    pub fn latency_count(&self, endpoint: &str) -> u64 {
        self.latency_ms
            .with_label_values(&[endpoint])
            .get_sample_count()
    }

    pub fn tokens(&self, endpoint: &str) -> u64 {
        self.tokens_total.with_label_values(&[endpoint]).get()
    }

    pub fn cost_usd(&self, endpoint: &str) -> f64 {
        self.cost_usd.with_label_values(&[endpoint]).get()
    }
}
