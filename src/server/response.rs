//! Response bodies.

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::ModelEntry;

/// `POST /chat` success body
#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub reply: String,
}

/// `GET /models` body, in table order
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: IndexMap<String, ModelEntry>,
}

/// `GET /test` body
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(rename = "apiKey")]
    pub api_key: &'static str,
}

impl HealthResponse {
    pub fn new(has_api_key: bool) -> Self {
        Self {
            status: "Server working",
            api_key: if has_api_key { "Present" } else { "Missing" },
        }
    }
}
