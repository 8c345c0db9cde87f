//! Request and response bodies of the clinical endpoints

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct TranscribeRequest {
    #[validate(url(message = "Invalid url"))]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscribeResponse {
    pub transcript: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ExtractRequest {
    #[validate(length(min = 1, message = "Text is required"))]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractResponse {
    pub extracted_info: Value,
}

/// Free-form patient information, usually the output of extraction
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct DiagnosisRequest {
    pub medical_info: Map<String, Value>,
}
