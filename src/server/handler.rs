//! Route handlers.

use std::future::Future;

use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::error::{RelayError, Result};
use crate::server::extract::{ChatForm, PromptForm};
use crate::server::response::{ChatReply, HealthResponse, ModelsResponse};
use crate::server::AppState;
use crate::ImageDescription;

const TRACING_TARGET: &str = "llmrelay::server::handler";

/// Relays a chat turn to the selected upstream model.
#[tracing::instrument(skip_all)]
pub async fn chat(
    State(state): State<AppState>,
    ChatForm(input): ChatForm,
) -> Result<Json<ChatReply>> {
    let relay = state.relay.clone();
    let reply = detached(async move { relay.chat(input).await }).await?;

    Ok(Json(ChatReply { reply }))
}

/// Returns the full model table.
pub async fn models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.relay.catalog().entries().clone(),
    })
}

/// Health probe; reports whether the upstream credential is configured.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::new(state.relay.has_api_key()))
}

/// Returns a textual description of the image a prompt asks for.
#[tracing::instrument(skip_all)]
pub async fn generate_image(
    State(state): State<AppState>,
    form: PromptForm,
) -> Result<Json<ImageDescription>> {
    if let Some(model) = form.model.as_deref() {
        tracing::debug!(target: TRACING_TARGET, model, "Ignoring requested image model");
    }

    let prompt = form
        .prompt
        .filter(|p| !p.trim().is_empty())
        .ok_or(RelayError::MissingField("prompt"))?;

    let relay = state.relay.clone();
    let description = detached(async move { relay.describe_image(&prompt).await }).await?;

    Ok(Json(description))
}

/// Answers methods a route does not serve; bare `OPTIONS` is accepted.
pub async fn method_not_allowed(method: Method) -> Response {
    if method == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        RelayError::MethodNotAllowed.into_response()
    }
}

pub async fn not_found() -> RelayError {
    RelayError::NotFound
}

/// Run the upstream call on its own task so a client disconnect does not
/// cancel it.
async fn detached<F, T>(fut: F) -> Result<T>
where
    F: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(fut)
        .await
        .map_err(|err| RelayError::Internal(format!("Relay task failed: {}", err)))?
}
