//! Model Selection
//!
//! Maps a caller-facing model key to an upstream request.

use crate::api::{CompletionRequest, ContentPart, ImageUrl, Message, MessageContent};
use crate::config::{ModelCatalog, ModelEntry};
use crate::router::ImageAttachment;
use std::sync::Arc;

const TRACING_TARGET: &str = "llmrelay::router";

/// Upstream model used for image descriptions
pub const IMAGE_DESCRIPTION_MODEL: &str = "google/gemini-2.0-flash-exp:free";

/// System prompt for image descriptions
pub const IMAGE_DESCRIPTION_PROMPT: &str =
    "You are an AI that can generate images. Describe the image in detail based on the user's prompt.";

/// A chat turn as received from the caller
#[derive(Debug, Clone, Default)]
pub struct ChatInput {
    /// User text
    pub message: String,

    /// Caller-facing model key; absent means the default entry
    pub model: Option<String>,

    /// Optional image upload
    pub image: Option<ImageAttachment>,
}

impl ChatInput {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_image(mut self, image: ImageAttachment) -> Self {
        self.image = Some(image);
        self
    }
}

/// A routing decision plus the request it produced
#[derive(Debug, Clone)]
pub struct RoutedRequest {
    /// Entry that serves the request
    pub entry: ModelEntry,

    /// True when the default entry was used in place of the requested key
    pub fallback: bool,

    /// True when an image was attached but not forwarded
    pub image_dropped: bool,

    /// Payload for the upstream endpoint
    pub request: CompletionRequest,
}

/// Model router over an immutable catalog
#[derive(Debug, Clone)]
pub struct ModelRouter {
    catalog: Arc<ModelCatalog>,
}

impl ModelRouter {
    pub fn new(catalog: Arc<ModelCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    /// Build the upstream request for a chat turn
    ///
    /// Unknown or absent keys select the default entry. An image reaches
    /// upstream only when the selected entry supports vision; otherwise it
    /// is dropped and the text is sent alone.
    pub fn route(&self, input: &ChatInput) -> RoutedRequest {
        let selection = self.catalog.get_or_default(input.model.as_deref());
        let entry = selection.entry;

        tracing::info!(
            target: TRACING_TARGET,
            requested = input.model.as_deref().unwrap_or("<none>"),
            fallback = selection.fallback,
            "Using model: {} -> {}",
            entry.key,
            entry.upstream_id
        );

        let (content, image_dropped) = match &input.image {
            Some(image) if entry.supports_vision => (
                MessageContent::Parts(vec![
                    ContentPart::Text {
                        text: input.message.clone(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image.data_uri(),
                        },
                    },
                ]),
                false,
            ),
            Some(image) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    model = %entry.key,
                    mime_type = %image.mime_type,
                    "Model has no vision support, dropping image"
                );
                (MessageContent::Text(input.message.clone()), true)
            }
            None => (MessageContent::Text(input.message.clone()), false),
        };

        let request = CompletionRequest::new(
            entry.upstream_id.clone(),
            vec![Message::system(entry.system_prompt.clone()), Message::user(content)],
        );

        RoutedRequest {
            entry: entry.clone(),
            fallback: selection.fallback,
            image_dropped,
            request,
        }
    }

    /// Fixed request asking for a textual description of an image
    pub fn image_description(&self, prompt: &str) -> CompletionRequest {
        CompletionRequest::new(
            IMAGE_DESCRIPTION_MODEL,
            vec![
                Message::system(IMAGE_DESCRIPTION_PROMPT),
                Message::user(MessageContent::Text(format!("Generate an image: {}", prompt))),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CatalogLoader;

    fn router() -> ModelRouter {
        let catalog = CatalogLoader::builtin().unwrap().into_catalog().unwrap();
        ModelRouter::new(Arc::new(catalog))
    }

    fn png() -> ImageAttachment {
        ImageAttachment::new("image/png", vec![0x89, b'P', b'N', b'G'])
    }

    #[test]
    fn test_recognized_key() {
        let routed = router().route(&ChatInput::new("hi").with_model("kimi-k2"));

        assert!(!routed.fallback);
        assert_eq!(routed.request.model, "moonshotai/kimi-k2:free");
        assert_eq!(
            routed.request.messages[0],
            Message::system(
                "You are Kimi K2, an AI assistant created by Moonshot AI. You are a helpful programming assistant."
            )
        );
        assert_eq!(
            routed.request.messages[1],
            Message::user(MessageContent::Text("hi".to_string()))
        );
    }

    #[test]
    fn test_unknown_and_absent_keys_fall_back() {
        let router = router();
        let default = router.catalog().default_entry().clone();

        for input in [
            ChatInput::new("hi").with_model("gpt-17-ultra"),
            ChatInput::new("hi").with_model(""),
            ChatInput::new("hi"),
        ] {
            let routed = router.route(&input);
            assert!(routed.fallback);
            assert_eq!(routed.request.model, default.upstream_id);
            assert_eq!(
                routed.request.messages[0].content,
                MessageContent::Text(default.system_prompt.clone())
            );
        }
    }

    #[test]
    fn test_image_forwarded_to_vision_model() {
        let routed = router().route(
            &ChatInput::new("what is this?")
                .with_model("qwen2.5-vl-32b")
                .with_image(png()),
        );

        assert!(!routed.image_dropped);
        assert_eq!(routed.request.model, "qwen/qwen2.5-vl-32b-instruct:free");
        assert_eq!(
            routed.request.messages[1].content,
            MessageContent::Parts(vec![
                ContentPart::Text {
                    text: "what is this?".to_string()
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: "data:image/png;base64,iVBORw==".to_string()
                    }
                },
            ])
        );
    }

    #[test]
    fn test_image_dropped_for_text_model() {
        let routed = router().route(
            &ChatInput::new("what is this?")
                .with_model("mistral-nemo")
                .with_image(png()),
        );

        assert!(routed.image_dropped);
        assert_eq!(routed.request.messages.len(), 2);
        assert_eq!(
            routed.request.messages[1].content,
            MessageContent::Text("what is this?".to_string())
        );
    }

    #[test]
    fn test_image_description_request() {
        let request = router().image_description("a red fox");

        assert_eq!(request.model, IMAGE_DESCRIPTION_MODEL);
        assert_eq!(request.messages[0], Message::system(IMAGE_DESCRIPTION_PROMPT));
        assert_eq!(
            request.messages[1].content,
            MessageContent::Text("Generate an image: a red fox".to_string())
        );
    }
}
