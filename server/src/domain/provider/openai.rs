//! OpenAI-compatible HTTP provider

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use super::{AiProvider, Completion, CompletionRequest, ProviderError, Transcription};
use crate::core::config::ProviderConfig;

const AUDIO_FILE_NAME: &str = "audio.mp3";
const AUDIO_MIME: &str = "audio/mpeg";

pub struct OpenAiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    chat_model: String,
    transcription_model: String,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("base_url", &self.base_url)
            .field("chat_model", &self.chat_model)
            .field("transcription_model", &self.transcription_model)
            .finish_non_exhaustive()
    }
}

impl OpenAiProvider {
    pub fn new(client: reqwest::Client, config: &ProviderConfig, api_key: String) -> Self {
        tracing::debug!(
            base_url = %config.base_url,
            chat_model = %config.chat_model,
            "OpenAI provider initialized"
        );
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            chat_model: config.chat_model.clone(),
            transcription_model: config.transcription_model.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Map a non-2xx response to `ProviderError::Api`, preferring `error.message` from the body
    async fn api_error(resp: reqwest::Response) -> ProviderError {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error.message)
            .unwrap_or_else(|_| {
                if body.is_empty() {
                    status.to_string()
                } else {
                    body
                }
            });
        ProviderError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

#[derive(Deserialize)]
struct TranscriptionBody {
    text: String,
}

#[derive(Deserialize)]
struct ChatBody {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    total_tokens: u64,
}

#[async_trait]
impl AiProvider for OpenAiProvider {
    async fn transcribe(&self, audio: Vec<u8>) -> Result<Transcription, ProviderError> {
        let file = Part::bytes(audio)
            .file_name(AUDIO_FILE_NAME)
            .mime_str(AUDIO_MIME)?;
        let form = Form::new()
            .text("model", self.transcription_model.clone())
            .part("file", file);

        let resp = self
            .client
            .post(self.url("audio/transcriptions"))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Self::api_error(resp).await);
        }

        let body: TranscriptionBody = resp.json().await?;
        Ok(Transcription {
            text: body.text,
            tokens: None,
        })
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError> {
        let payload = serde_json::json!({
            "model": self.chat_model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.user },
            ],
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });

        let resp = self
            .client
            .post(self.url("chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Self::api_error(resp).await);
        }

        let body: ChatBody = resp.json().await?;
        let Some(choice) = body.choices.into_iter().next() else {
            return Err(ProviderError::InvalidResponse(
                "completion has no choices".to_string(),
            ));
        };

        Ok(Completion {
            text: choice.message.content.unwrap_or_default(),
            tokens: body.usage.map(|u| u.total_tokens).unwrap_or(0),
        })
    }
}
