//! HTTP Client
//!
//! Authenticated single-shot POST to the upstream chat-completion endpoint.

use crate::api::{CompletionRequest, CompletionResponse};
use crate::config::RelaySettings;
use crate::error::{RelayError, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;

const TRACING_TARGET: &str = "llmrelay::client::http";

/// HTTP client for the upstream API
#[derive(Debug, Clone)]
pub struct HttpClient {
    /// Inner reqwest client (pooled, cheap to clone)
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(settings: &RelaySettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .connect_timeout(settings.connect_timeout)
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| RelayError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// POST a completion request; no retries
    ///
    /// Fails on a non-success status and on a body without completion
    /// choices. In the latter case the raw upstream JSON is kept for
    /// diagnosis.
    pub async fn post_completion(
        &self,
        url: &str,
        request: &CompletionRequest,
        api_key: &str,
    ) -> Result<CompletionResponse> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| RelayError::Config(format!("Invalid API key format: {}", e)))?,
        );

        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(request)
            .send()
            .await
            .map_err(|err| {
                tracing::error!(target: TRACING_TARGET, error = %err, "Upstream request failed");
                RelayError::from(err)
            })?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                target: TRACING_TARGET,
                status = status.as_u16(),
                body = %body,
                "Upstream API error"
            );
            return Err(RelayError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let raw: Value = serde_json::from_str(&body).map_err(|e| {
            RelayError::Response(format!(
                "Failed to parse response: {}. Body: {}",
                e,
                truncate(&body, 500)
            ))
        })?;

        let has_choices = raw
            .get("choices")
            .and_then(Value::as_array)
            .is_some_and(|choices| !choices.is_empty());

        if !has_choices {
            tracing::error!(target: TRACING_TARGET, raw = %raw, "No choices in response");
            return Err(RelayError::EmptyChoices { raw });
        }

        Ok(serde_json::from_value(raw)?)
    }
}

/// Truncate on a char boundary
fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
