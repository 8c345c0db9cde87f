//! Test doubles shared by unit and router tests

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::core::config::{PricingConfig, TelemetryConfig};
use crate::core::context::AppContext;
use crate::data::error::DataError;
use crate::data::traits::TelemetrySink;
use crate::data::types::{MetricLogRow, MetricSample};
use crate::domain::clinical::ClinicalService;
use crate::domain::metrics::MetricsRegistry;
use crate::domain::provider::{
    AiProvider, AudioSource, Completion, CompletionRequest, ProviderError, Transcription,
};

enum Reply {
    Transcript(String),
    Completion { text: String, tokens: u64 },
    /// Tokens equal to the user message length, after a delay
    EchoTokens { delay: Duration },
    Fail { status: u16, message: String },
}

/// Scripted provider that counts calls
pub struct StubProvider {
    reply: Reply,
    transcribe_calls: AtomicUsize,
    complete_calls: AtomicUsize,
    last_completion: Mutex<Option<CompletionRequest>>,
}

impl StubProvider {
    fn with(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            transcribe_calls: AtomicUsize::new(0),
            complete_calls: AtomicUsize::new(0),
            last_completion: Mutex::new(None),
        })
    }

    pub fn transcript(text: &str) -> Arc<Self> {
        Self::with(Reply::Transcript(text.to_string()))
    }

    pub fn completion(text: &str, tokens: u64) -> Arc<Self> {
        Self::with(Reply::Completion {
            text: text.to_string(),
            tokens,
        })
    }

    pub fn echo_tokens(delay: Duration) -> Arc<Self> {
        Self::with(Reply::EchoTokens { delay })
    }

    pub fn failing(status: u16, message: &str) -> Arc<Self> {
        Self::with(Reply::Fail {
            status,
            message: message.to_string(),
        })
    }

    pub fn transcribe_calls(&self) -> usize {
        self.transcribe_calls.load(Ordering::SeqCst)
    }

    pub fn complete_calls(&self) -> usize {
        self.complete_calls.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.transcribe_calls() + self.complete_calls()
    }

    pub fn last_completion(&self) -> Option<CompletionRequest> {
        self.last_completion.lock().clone()
    }

    fn failure(&self) -> Option<ProviderError> {
        match &self.reply {
            Reply::Fail { status, message } => Some(ProviderError::Api {
                status: *status,
                message: message.clone(),
            }),
            _ => None,
        }
    }
}

#[async_trait]
impl AiProvider for StubProvider {
    async fn transcribe(&self, _audio: Vec<u8>) -> Result<Transcription, ProviderError> {
        self.transcribe_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = self.failure() {
            return Err(e);
        }
        let text = match &self.reply {
            Reply::Transcript(text) | Reply::Completion { text, .. } => text.clone(),
            _ => String::new(),
        };
        Ok(Transcription { text, tokens: None })
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError> {
        self.complete_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_completion.lock() = Some(request.clone());
        if let Some(e) = self.failure() {
            return Err(e);
        }
        match &self.reply {
            Reply::Completion { text, tokens } => Ok(Completion {
                text: text.clone(),
                tokens: *tokens,
            }),
            Reply::EchoTokens { delay } => {
                tokio::time::sleep(*delay).await;
                Ok(Completion {
                    text: "{}".to_string(),
                    tokens: request.user.len() as u64,
                })
            }
            _ => Ok(Completion {
                text: String::new(),
                tokens: 0,
            }),
        }
    }
}

/// Audio source returning fixed bytes or a download failure
pub struct StubAudio {
    result: Result<Vec<u8>, u16>,
}

impl StubAudio {
    pub fn bytes(data: &[u8]) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(data.to_vec()),
        })
    }

    pub fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            result: Err(status),
        })
    }
}

#[async_trait]
impl AudioSource for StubAudio {
    async fn fetch(&self, _url: &str) -> Result<Vec<u8>, ProviderError> {
        self.result
            .clone()
            .map_err(|status| ProviderError::Download { status })
    }
}

/// Sink whose appends always fail
pub struct FailingSink;

#[async_trait]
impl TelemetrySink for FailingSink {
    async fn append(&self, _sample: &MetricSample) -> Result<String, DataError> {
        Err(DataError::backend_unavailable("failing", "sink is down"))
    }

    async fn list(
        &self,
        _endpoint: Option<&str>,
        _limit: u32,
    ) -> Result<Vec<MetricLogRow>, DataError> {
        Err(DataError::backend_unavailable("failing", "sink is down"))
    }

    fn backend_name(&self) -> &'static str {
        "failing"
    }
}

/// Sink that stalls every append
pub struct SlowSink {
    delay: Duration,
}

impl SlowSink {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl TelemetrySink for SlowSink {
    async fn append(&self, _sample: &MetricSample) -> Result<String, DataError> {
        tokio::time::sleep(self.delay).await;
        Ok("late".to_string())
    }

    async fn list(
        &self,
        _endpoint: Option<&str>,
        _limit: u32,
    ) -> Result<Vec<MetricLogRow>, DataError> {
        Ok(Vec::new())
    }

    fn backend_name(&self) -> &'static str {
        "slow"
    }
}

pub fn clinical_service(
    provider: Arc<dyn AiProvider>,
    audio: Arc<dyn AudioSource>,
) -> ClinicalService {
    ClinicalService::new(provider, audio, PricingConfig::default())
}

/// Isolated context with its own registry
pub fn test_context(
    provider: Arc<dyn AiProvider>,
    audio: Arc<dyn AudioSource>,
    sink: Arc<dyn TelemetrySink>,
) -> Arc<AppContext> {
    Arc::new(AppContext::new(
        clinical_service(provider, audio),
        sink,
        Arc::new(MetricsRegistry::new().unwrap()),
        TelemetryConfig {
            append_timeout: Duration::from_millis(500),
            ..TelemetryConfig::default()
        },
    ))
}
