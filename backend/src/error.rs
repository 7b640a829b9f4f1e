use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::validate::ValidationError;

/// Errors returned by the HTTP handlers.
///
/// The `Display` text is for logs. Callers only see [`Error::http_message`]
/// plus, for delivery failures, the relay message and an optional hint.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    MissingFields(#[from] ValidationError),

    #[error("no recipient: TO_EMAIL and GMAIL_USER are unset")]
    NotConfigured,

    #[error("email delivery failed: {details}")]
    Delivery {
        details: String,
        hint: Option<String>,
    },

    #[error("route not found")]
    NotFound,
}

pub type Result<T> = std::result::Result<T, Error>;

/// JSON error body: `{"error": ..., "details": ..., "hint": ...}`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl Error {
    pub fn http_code(&self) -> StatusCode {
        match self {
            Self::MissingFields(_) => StatusCode::BAD_REQUEST,
            Self::NotConfigured | Self::Delivery { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }

    pub fn http_message(&self) -> &'static str {
        match self {
            Self::MissingFields(_) => "Missing required fields",
            Self::NotConfigured => "Server not configured with TO_EMAIL or GMAIL_USER",
            Self::Delivery { .. } => "Failed to send email",
            Self::NotFound => "Not found",
        }
    }

    fn body(&self) -> ErrorResponse {
        let (details, hint) = match self {
            Self::Delivery { details, hint } => (Some(details.clone()), hint.clone()),
            _ => (None, None),
        };

        ErrorResponse {
            error: self.http_message().to_string(),
            details,
            hint,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Raw details go to the log; the body only carries the sanitized subset.
        if self.http_code().is_server_error() {
            tracing::error!("Error Status {}: {}", self.http_code(), self);
        } else {
            tracing::debug!("Error Status {}: {}", self.http_code(), self);
        }

        (self.http_code(), Json(self.body())).into_response()
    }
}
