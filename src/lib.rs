//! llmrelay - Lightweight LLM chat relay
//!
//! Accepts chat messages (optionally with an image), picks an upstream model
//! from a static table and relays the reply from an OpenRouter-compatible
//! chat-completion API.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod router;
pub mod server;

use api::{CompletionRequest, CompletionResponse};
use client::HttpClient;
use config::{ModelCatalog, RelaySettings};
use error::{RelayError, Result};
use router::{ChatInput, ModelRouter};
use serde::Serialize;
use std::sync::Arc;

const TRACING_TARGET: &str = "llmrelay::relay";

/// Note attached to every image description
pub const IMAGE_DESCRIPTION_NOTE: &str =
    "Image generation is experimental. This is a text description of what would be generated.";

/// The relay: model table, upstream settings and HTTP client
pub struct Relay {
    /// Model selection over the immutable catalog
    router: ModelRouter,

    /// Upstream endpoint and credential
    settings: RelaySettings,

    /// HTTP client
    http_client: HttpClient,
}

impl Relay {
    /// Create a relay over a loaded catalog
    pub fn new(catalog: ModelCatalog, settings: RelaySettings) -> Result<Self> {
        Ok(Self {
            router: ModelRouter::new(Arc::new(catalog)),
            http_client: HttpClient::new(&settings)?,
            settings,
        })
    }

    pub fn catalog(&self) -> &ModelCatalog {
        self.router.catalog()
    }

    pub fn has_api_key(&self) -> bool {
        self.settings.has_api_key()
    }

    /// Send a prepared request upstream
    pub async fn send(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        let Some(api_key) = self.settings.api_key.as_deref() else {
            tracing::error!(target: TRACING_TARGET, "OPENROUTER_API_KEY is not configured");
            return Err(RelayError::MissingApiKey);
        };

        let url = self.settings.completions_url();
        self.http_client
            .post_completion(&url, request, api_key)
            .await
    }

    /// Relay one chat turn and return the reply text
    pub async fn chat(&self, input: ChatInput) -> Result<String> {
        if input.message.trim().is_empty() {
            return Err(RelayError::MissingField("message"));
        }

        let routed = self.router.route(&input);
        let response = self.send(&routed.request).await?;

        tracing::debug!(
            target: TRACING_TARGET,
            model = %routed.entry.key,
            served_by = response.model.as_deref().unwrap_or("<unknown>"),
            response_id = response.id.as_deref().unwrap_or("<none>"),
            finish_reason = response.finish_reason().unwrap_or("<none>"),
            prompt_tokens = response.usage.as_ref().map(|u| u.prompt_tokens),
            completion_tokens = response.usage.as_ref().map(|u| u.completion_tokens),
            total_tokens = response.usage.as_ref().map(|u| u.total_tokens),
            "Chat completed"
        );

        response
            .content()
            .ok_or_else(|| RelayError::Internal("Upstream reply had no message content".to_string()))
    }

    /// Ask the fixed description model to describe an image for a prompt
    pub async fn describe_image(&self, prompt: &str) -> Result<ImageDescription> {
        if prompt.trim().is_empty() {
            return Err(RelayError::MissingField("prompt"));
        }

        let request = self.router.image_description(prompt);
        let response = match self.send(&request).await {
            Ok(response) => response,
            Err(RelayError::EmptyChoices { .. }) => return Err(RelayError::EmptyDescription),
            Err(err) => return Err(err),
        };

        let description = response.content().ok_or(RelayError::EmptyDescription)?;

        Ok(ImageDescription {
            description,
            note: IMAGE_DESCRIPTION_NOTE,
        })
    }
}

/// Textual stand-in for a generated image
#[derive(Debug, Clone, Serialize)]
pub struct ImageDescription {
    pub description: String,
    pub note: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CatalogLoader;
    use crate::router::ImageAttachment;

    fn relay(base_url: &str, api_key: Option<&str>) -> Relay {
        let settings = RelaySettings::default()
            .with_base_url(base_url)
            .with_api_key(api_key.map(str::to_string));
        Relay::new(
            CatalogLoader::builtin().unwrap().into_catalog().unwrap(),
            settings,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_chat_relays_first_choice() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "model": "qwen/qwen2.5-vl-32b-instruct:free"
            })))
            .with_status(200)
            .with_body(
                r#"{"choices":[
                    {"message":{"role":"assistant","content":"A cat."}},
                    {"message":{"role":"assistant","content":"A dog."}}
                ]}"#,
            )
            .create_async()
            .await;

        let reply = relay(&server.url(), Some("sk-test"))
            .chat(
                ChatInput::new("what is this?")
                    .with_model("qwen2.5-vl-32b")
                    .with_image(ImageAttachment::new("image/jpeg", vec![1u8, 2, 3])),
            )
            .await
            .unwrap();

        assert_eq!(reply, "A cat.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_api_key_never_contacts_upstream() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .expect(0)
            .create_async()
            .await;

        let err = relay(&server.url(), None)
            .chat(ChatInput::new("hello"))
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::MissingApiKey));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_blank_message_rejected() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .expect(0)
            .create_async()
            .await;

        let err = relay(&server.url(), Some("sk-test"))
            .chat(ChatInput::new("   "))
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::MissingField("message")));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_request_error() {
        let err = relay("http://127.0.0.1:1", Some("sk-test"))
            .chat(ChatInput::new("hello"))
            .await
            .unwrap_err();

        assert!(
            matches!(&err, RelayError::Request(msg) if msg.contains("Connection failed")),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn test_describe_image() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "model": "google/gemini-2.0-flash-exp:free"
            })))
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"content":"A fox in snow."}}]}"#)
            .create_async()
            .await;

        let description = relay(&server.url(), Some("sk-test"))
            .describe_image("a fox")
            .await
            .unwrap();

        assert_eq!(description.description, "A fox in snow.");
        assert_eq!(description.note, IMAGE_DESCRIPTION_NOTE);
    }

    #[tokio::test]
    async fn test_describe_image_empty_choices() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let err = relay(&server.url(), Some("sk-test"))
            .describe_image("a fox")
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::EmptyDescription));
    }
}
