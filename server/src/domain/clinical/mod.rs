//! Clinical handlers
//!
//! Transcription, structured extraction and diagnosis synthesis. Each call
//! returns its payload together with the provider usage it consumed so the
//! caller can account for it.

mod diagnosis;
mod extract;
mod prompts;
mod transcribe;
pub mod types;

pub use types::{
    DiagnosisRequest, ExtractRequest, ExtractResponse, TranscribeRequest, TranscribeResponse,
};

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use super::provider::{AiProvider, AudioSource, ProviderError};
use crate::core::config::PricingConfig;
use crate::domain::usage::UsageRecord;

#[derive(Error, Debug)]
pub enum ClinicalError {
    #[error("Downloaded audio is empty")]
    EmptyAudio,

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Handler payload plus the usage it consumed
#[derive(Debug, Clone, PartialEq)]
pub struct Billed<T> {
    pub data: T,
    pub usage: UsageRecord,
}

pub struct ClinicalService {
    provider: Arc<dyn AiProvider>,
    audio: Arc<dyn AudioSource>,
    pricing: PricingConfig,
}

impl ClinicalService {
    pub fn new(
        provider: Arc<dyn AiProvider>,
        audio: Arc<dyn AudioSource>,
        pricing: PricingConfig,
    ) -> Self {
        Self {
            provider,
            audio,
            pricing,
        }
    }

    fn bill<T>(&self, data: T, tokens: u64) -> Billed<T> {
        Billed {
            data,
            usage: UsageRecord::priced(tokens, &self.pricing),
        }
    }
}

/// Parse a model answer that was asked to be JSON only.
///
/// Strips a surrounding Markdown code fence first. Empty content parses as an
/// empty object. Returns `None` when the answer is not a JSON object.
fn parse_json_answer(content: &str) -> Option<Value> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Some(Value::Object(Default::default()));
    }
    match serde_json::from_str::<Value>(strip_code_fence(trimmed)) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

fn strip_code_fence(s: &str) -> &str {
    let Some(rest) = s.strip_prefix("```") else {
        return s;
    };
    // drop the language tag line
    let rest = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_json_answer_object() {
        assert_eq!(
            parse_json_answer(r#"{"symptoms":["cough"]}"#),
            Some(json!({"symptoms": ["cough"]}))
        );
    }

    #[test]
    fn test_parse_json_answer_fenced() {
        let fenced = "```json\n{\"severity\": \"mild\"}\n```";
        assert_eq!(parse_json_answer(fenced), Some(json!({"severity": "mild"})));

        let bare_fence = "```\n{\"a\": 1}\n```";
        assert_eq!(parse_json_answer(bare_fence), Some(json!({"a": 1})));
    }

    #[test]
    fn test_parse_json_answer_empty_is_empty_object() {
        assert_eq!(parse_json_answer("  "), Some(json!({})));
    }

    #[test]
    fn test_parse_json_answer_rejects_prose_and_scalars() {
        assert_eq!(parse_json_answer("cannot determine"), None);
        assert_eq!(parse_json_answer("42"), None);
        assert_eq!(parse_json_answer("[1, 2]"), None);
    }
}
