//! HTTP mapping for relay errors.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::RelayError;

const TRACING_TARGET: &str = "llmrelay::server::error";

impl RelayError {
    /// HTTP status reported to the caller
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::MissingField(_) | RelayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RelayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::NotFound => StatusCode::NOT_FOUND,
            RelayError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            RelayError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            RelayError::Config(_)
            | RelayError::MissingApiKey
            | RelayError::UpstreamStatus { .. }
            | RelayError::EmptyChoices { .. }
            | RelayError::EmptyDescription
            | RelayError::Request(_)
            | RelayError::Response(_)
            | RelayError::Timeout(_)
            | RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(target: TRACING_TARGET, status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::debug!(target: TRACING_TARGET, status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = match &self {
            RelayError::EmptyChoices { raw } => json!({ "error": self.to_string(), "raw": raw }),
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for RelayError {
    fn from(rejection: JsonRejection) -> Self {
        RelayError::InvalidRequest(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

impl From<FormRejection> for RelayError {
    fn from(rejection: FormRejection) -> Self {
        RelayError::InvalidRequest(format!("Invalid form body: {}", rejection.body_text()))
    }
}

impl From<MultipartRejection> for RelayError {
    fn from(rejection: MultipartRejection) -> Self {
        RelayError::InvalidRequest(format!("Invalid multipart request: {}", rejection.body_text()))
    }
}

/// Map a multipart read failure, reporting body-limit hits as 413
pub(crate) fn multipart_error(err: MultipartError, limit: usize) -> RelayError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        RelayError::PayloadTooLarge(limit)
    } else {
        RelayError::InvalidRequest(format!("Invalid multipart data: {}", err.body_text()))
    }
}
