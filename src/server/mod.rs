//! HTTP Server
//!
//! Axum routes, CORS, body limits and graceful shutdown.

pub mod error;
pub mod extract;
pub mod handler;
pub mod response;
mod shutdown;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::Relay;

pub use shutdown::shutdown_signal;

const TRACING_TARGET: &str = "llmrelay::server";

/// Maximum size of an uploaded image: 10MB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Room for multipart framing and text fields on top of the image limit
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(relay: Relay) -> Self {
        Self {
            relay: Arc::new(relay),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}

/// Build the router with all relay endpoints
pub fn routes(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes.saturating_add(FORM_OVERHEAD_BYTES);

    Router::new()
        .route(
            "/chat",
            post(handler::chat).fallback(handler::method_not_allowed),
        )
        .route(
            "/models",
            get(handler::models).fallback(handler::method_not_allowed),
        )
        .route(
            "/test",
            get(handler::health).fallback(handler::method_not_allowed),
        )
        .route(
            "/generate-image",
            post(handler::generate_image).fallback(handler::method_not_allowed),
        )
        .fallback(handler::not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Any origin; GET, POST and OPTIONS
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Bind and serve until a shutdown signal arrives
pub async fn serve(router: Router, addr: SocketAddr) -> std::io::Result<()> {
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(
                target: TRACING_TARGET,
                addr = %addr,
                error = %err,
                "Failed to bind to address"
            );
            return Err(err);
        }
    };

    tracing::info!(target: TRACING_TARGET, addr = %addr, "Server is running");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!(target: TRACING_TARGET, "Server shut down gracefully");
    Ok(())
}
