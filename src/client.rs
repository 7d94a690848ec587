//! HTTP and OpenAI-compatible client construction.

use crate::error::{Result, TekstError};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

const USER_AGENT: &str = concat!("tekst/", env!("CARGO_PKG_VERSION"));

/// Create a plain HTTP client with the given per-request timeout.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| TekstError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Create a client for an OpenAI-compatible API at `base_url`.
pub fn openai_client(base_url: &str, api_key: &str, timeout: Duration) -> Result<Client<OpenAIConfig>> {
    let config = OpenAIConfig::new()
        .with_api_base(base_url.trim_end_matches('/'))
        .with_api_key(api_key);
    Ok(Client::with_config(config).with_http_client(http_client(timeout)?))
}
