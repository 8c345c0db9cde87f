//! Handler failures and their envelope rendering

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::api::types::ErrorEnvelope;
use crate::domain::clinical::ClinicalError;
use crate::domain::provider::ProviderError;

const DEFAULT_ERROR_MESSAGE: &str = "Internal server error";

/// A failure raised inside the pipeline
#[derive(Error, Debug)]
pub enum HandlerError {
    /// Failure that carries its own HTTP status
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    /// Provider or audio download failure, always a 500
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("{0}")]
    Internal(String),
}

impl HandlerError {
    /// Unknown or out-of-range codes fall back to 500
    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Status { status, .. } => *status,
            Self::Provider(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the caller
    pub fn public_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            DEFAULT_ERROR_MESSAGE.to_string()
        } else {
            message
        }
    }
}

impl From<ClinicalError> for HandlerError {
    fn from(e: ClinicalError) -> Self {
        match e {
            ClinicalError::EmptyAudio => Self::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: e.to_string(),
            },
            ClinicalError::Provider(e) => Self::Provider(e),
        }
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(ErrorEnvelope::new(self.public_message())),
        )
            .into_response()
    }
}
