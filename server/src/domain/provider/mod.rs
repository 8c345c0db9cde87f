//! External AI capabilities
//!
//! The handlers only see the `AiProvider` and `AudioSource` traits. The
//! OpenAI-compatible HTTP implementation lives in `openai`, the plain HTTP
//! audio downloader in `audio`.

mod audio;
mod openai;

pub use audio::HttpAudioSource;
pub use openai::OpenAiProvider;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Audio download failed with status {status}")]
    Download { status: u16 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected provider response: {0}")]
    InvalidResponse(String),
}

/// Result of a speech-to-text call
#[derive(Debug, Clone, PartialEq)]
pub struct Transcription {
    pub text: String,
    /// `None` when the provider does not report usage
    pub tokens: Option<u64>,
}

/// Single-turn chat completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// Empty when the provider returned no content
    pub text: String,
    pub tokens: u64,
}

#[async_trait]
pub trait AiProvider: Send + Sync {
    async fn transcribe(&self, audio: Vec<u8>) -> Result<Transcription, ProviderError>;

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError>;
}

/// Fetches the audio bytes a transcription request points at
#[async_trait]
pub trait AudioSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ProviderError>;
}
