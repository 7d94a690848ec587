//! Error types for Tekst.

use thiserror::Error;

/// Library-level error type for Tekst operations.
#[derive(Error, Debug)]
pub enum TekstError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Unsupported media: {0}")]
    UnsupportedMedia(String),

    #[error("Malformed backend response: {0}")]
    MalformedBackendResponse(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Corrupt cache file: {0}")]
    Corruption(String),

    #[error("Translation failed: {0}")]
    Translation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("OpenAI-compatible API error: {0}")]
    OpenAI(String),

    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl TekstError {
    /// Whether a retry of the same request could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            TekstError::BackendUnavailable(_)
            | TekstError::Timeout(_)
            | TekstError::Translation(_)
            | TekstError::OpenAI(_) => true,
            TekstError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}

/// Map a non-success HTTP status to the matching backend error.
pub(crate) fn status_error(backend: &str, status: reqwest::StatusCode, body: &str) -> TekstError {
    match status.as_u16() {
        401 | 403 => TekstError::AuthenticationFailed(format!("{backend}: {status} {body}")),
        415 => TekstError::UnsupportedMedia(format!("{backend}: {status} {body}")),
        _ => TekstError::BackendUnavailable(format!("{backend}: {status} {body}")),
    }
}

/// Result type alias for Tekst operations.
pub type Result<T> = std::result::Result<T, TekstError>;
