//! Client Module
//!
//! Upstream HTTP client.

pub mod http;

pub use http::HttpClient;
