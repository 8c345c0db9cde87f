//! Response envelopes shared by the pipeline endpoints
//!
//! Every pipeline response is either `{ success: true, data }` or
//! `{ success: false, error: { message, fields? } }`.

use std::collections::BTreeMap;

use serde::Serialize;

/// Per-field validation messages, keyed by field name
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Serialize)]
pub struct SuccessEnvelope<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> SuccessEnvelope<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: ErrorBody,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorBody {
                message: message.into(),
                fields: None,
            },
        }
    }

    pub fn with_fields(message: impl Into<String>, fields: FieldErrors) -> Self {
        Self {
            success: false,
            error: ErrorBody {
                message: message.into(),
                fields: Some(fields),
            },
        }
    }
}
