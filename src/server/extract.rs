//! Request extractors for chat and prompt bodies.
//!
//! Both endpoints accept JSON or url-encoded bodies; `/chat` also accepts
//! `multipart/form-data` with an `image` file field. Non-image uploads are
//! rejected here, before the handler runs.

use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::{Form, Json};
use bytes::{Bytes, BytesMut};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{RelayError, Result};
use crate::router::{ChatInput, ImageAttachment};
use crate::server::error::multipart_error;
use crate::server::AppState;

const TRACING_TARGET: &str = "llmrelay::server::extract";

/// Chat turn extracted from any supported body encoding
#[derive(Debug)]
pub struct ChatForm(pub ChatInput);

/// Text fields of a chat request
#[derive(Debug, Default, Deserialize)]
struct ChatFields {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    model: Option<String>,
}

/// Body of `POST /generate-image`
#[derive(Debug, Default, Deserialize)]
pub struct PromptForm {
    #[serde(default)]
    pub prompt: Option<String>,

    /// Accepted for compatibility, ignored
    #[serde(default)]
    pub model: Option<String>,
}

impl FromRequest<AppState> for ChatForm {
    type Rejection = RelayError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self> {
        if content_type(&req).starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state).await?;
            let input = read_multipart(multipart, state.max_upload_bytes).await?;
            return Ok(ChatForm(input));
        }

        let fields: ChatFields = read_fields(req, state).await?;
        Ok(ChatForm(ChatInput {
            message: fields.message.unwrap_or_default(),
            model: fields.model,
            image: None,
        }))
    }
}

impl FromRequest<AppState> for PromptForm {
    type Rejection = RelayError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self> {
        read_fields(req, state).await
    }
}

fn content_type(req: &Request) -> String {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// Decode a JSON or url-encoded body; no content type means no fields
async fn read_fields<T>(req: Request, state: &AppState) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let content_type = content_type(&req);

    if content_type.is_empty() {
        return Ok(T::default());
    }

    if content_type.starts_with("application/json") {
        let Json(fields) = Json::<T>::from_request(req, state).await?;
        return Ok(fields);
    }

    if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(fields) = Form::<T>::from_request(req, state).await?;
        return Ok(fields);
    }

    Err(RelayError::InvalidRequest(format!(
        "Unsupported content type '{}'",
        content_type
    )))
}

async fn read_multipart(mut multipart: Multipart, max_bytes: usize) -> Result<ChatInput> {
    let mut input = ChatInput::default();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|err| multipart_error(err, max_bytes))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "message" => {
                input.message = field
                    .text()
                    .await
                    .map_err(|err| multipart_error(err, max_bytes))?;
            }
            "model" => {
                let model = field
                    .text()
                    .await
                    .map_err(|err| multipart_error(err, max_bytes))?;
                input.model = Some(model).filter(|m| !m.is_empty());
            }
            "image" => {
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();

                if !ImageAttachment::is_image_mime(&mime_type) {
                    return Err(RelayError::UnsupportedMediaType(mime_type));
                }

                let mut data = BytesMut::new();
                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|err| multipart_error(err, max_bytes))?
                {
                    // Check size before buffering the chunk
                    if data.len() + chunk.len() > max_bytes {
                        return Err(RelayError::PayloadTooLarge(max_bytes));
                    }
                    data.extend_from_slice(&chunk);
                }

                let data: Bytes = data.freeze();
                tracing::debug!(
                    target: TRACING_TARGET,
                    mime_type = %mime_type,
                    size = data.len(),
                    "Received image upload"
                );

                if !data.is_empty() {
                    input.image = Some(ImageAttachment::new(mime_type, data));
                }
            }
            other => {
                tracing::debug!(target: TRACING_TARGET, field = other, "Ignoring form field");
            }
        }
    }

    Ok(input)
}
