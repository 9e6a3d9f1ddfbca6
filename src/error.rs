//! Relay Error Types
//!
//! Error handling for model routing and upstream relaying.

use thiserror::Error;

/// Main error type for relay operations
#[derive(Debug, Error)]
pub enum RelayError {
    /// Configuration errors (invalid model table, unreadable files, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required request field was absent or empty
    #[error("{} is required", capitalize(.0))]
    MissingField(&'static str),

    /// Malformed client request
    #[error("{0}")]
    InvalidRequest(String),

    /// Route exists but not for this method
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// No such route
    #[error("Not found")]
    NotFound,

    /// Upload exceeded the configured size limit (bytes)
    #[error("File too large. Maximum upload size is {} MB", .0 / (1024 * 1024))]
    PayloadTooLarge(usize),

    /// Upload was not an image
    #[error("Only image files are allowed")]
    UnsupportedMediaType(String),

    /// No upstream credential configured
    #[error("API key not configured")]
    MissingApiKey,

    /// Upstream answered with a non-success status
    #[error("API error: {status}")]
    UpstreamStatus { status: u16, body: String },

    /// Upstream answered successfully but without any completion choice
    #[error("No response from AI model")]
    EmptyChoices { raw: serde_json::Value },

    /// Image-description model answered without any choice
    #[error("No response from image generation model")]
    EmptyDescription,

    /// HTTP request failed
    #[error("Request failed: {0}")]
    Request(String),

    /// Response parsing failed
    #[error("Response error: {0}")]
    Response(String),

    /// Timeout
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RelayError::Timeout(err.to_string())
        } else if err.is_connect() {
            RelayError::Request(format!("Connection failed: {}", err))
        } else if err.is_decode() {
            RelayError::Response(format!("Failed to decode response: {}", err))
        } else {
            RelayError::Request(err.to_string())
        }
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(err: serde_json::Error) -> Self {
        RelayError::Response(format!("JSON parsing error: {}", err))
    }
}

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_message() {
        assert_eq!(
            RelayError::MissingField("message").to_string(),
            "Message is required"
        );
        assert_eq!(
            RelayError::MissingField("prompt").to_string(),
            "Prompt is required"
        );
    }

    #[test]
    fn test_upstream_status_includes_code() {
        let err = RelayError::UpstreamStatus {
            status: 429,
            body: "slow down".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 429");
    }

    #[test]
    fn test_payload_too_large_reports_megabytes() {
        let err = RelayError::PayloadTooLarge(10 * 1024 * 1024);
        assert!(err.to_string().contains("10 MB"));
    }
}
