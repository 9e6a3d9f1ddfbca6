//! Relay Settings
//!
//! Upstream endpoint, credential and timeouts.

use std::fmt;
use std::time::Duration;

/// Default upstream API base
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Upstream connection settings
#[derive(Clone)]
pub struct RelaySettings {
    /// Bearer credential; `None` when not configured
    pub api_key: Option<String>,

    /// Base URL of the chat-completion API
    pub base_url: String,

    /// Total time allowed for one upstream call
    pub request_timeout: Duration,

    /// Time allowed to establish the upstream connection
    pub connect_timeout: Duration,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(300),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl RelaySettings {
    /// Set the credential; blank values count as absent
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }

    /// Set the upstream base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the total request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Full chat-completion endpoint URL
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl fmt::Debug for RelaySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelaySettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}
