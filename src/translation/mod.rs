//! Subtitle translation.
//!
//! Backends implement [`Translator`] and own their request shaping. The
//! [`TranslationBatchEngine`] owns concurrency, retry and progress.
//!
//! # Backends
//!
//! - **Google**: the public web endpoint, no key required.
//! - **SiliconCloud**: OpenAI-compatible chat completions.
//! - **Ollama**: a local chat server.

mod engine;
mod google;
mod ollama;
mod silicon_cloud;

pub use engine::{BatchOutcome, TranslationBatchEngine};
pub use google::GoogleTranslator;
pub use ollama::OllamaTranslator;
pub use silicon_cloud::SiliconCloudTranslator;

use crate::config::{Credentials, TranslationBackend, TranslationSettings};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One text to translate, keyed by its subtitle index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationItem {
    pub index: usize,
    pub text: String,
}

impl TranslationItem {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }
}

/// Trait for translation backends.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate a single text. Called once per attempt.
    async fn translate(&self, text: &str) -> Result<String>;

    /// Backend (and model) identifier stored with each result.
    fn tag(&self) -> String;
}

/// Build the adapter for `backend`, failing fast on missing credentials.
pub fn create_translator(
    backend: TranslationBackend,
    settings: &TranslationSettings,
    credentials: &Credentials,
) -> Result<Arc<dyn Translator>> {
    let translator: Arc<dyn Translator> = match backend {
        TranslationBackend::Google => Arc::new(GoogleTranslator::new(settings)?),
        TranslationBackend::SiliconCloud => Arc::new(SiliconCloudTranslator::new(
            settings,
            credentials.silicon_cloud()?,
        )?),
        TranslationBackend::Ollama => Arc::new(OllamaTranslator::new(settings)?),
    };
    Ok(translator)
}

/// System prompt for generative backends.
pub(crate) fn system_prompt(target_language_name: &str) -> String {
    format!(
        "You are a professional translator. Translate the user's text into {} accurately and \
         fluently, keeping the tone and style of the original. Reply with the translation only, \
         without explanations or extra content.",
        target_language_name
    )
}

/// Completion token budget scaled to the input length.
pub(crate) fn token_budget(text: &str) -> u32 {
    let chars = text.chars().count() as u32;
    chars.saturating_mul(2).saturating_add(64).clamp(256, 2048)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TekstError;

    #[test]
    fn test_token_budget_scales() {
        assert_eq!(token_budget("hi"), 256);
        assert_eq!(token_budget(&"a".repeat(500)), 1064);
        assert_eq!(token_budget(&"a".repeat(10_000)), 2048);
    }

    #[test]
    fn test_system_prompt_names_language() {
        assert!(system_prompt("Chinese").contains("into Chinese"));
    }

    #[test]
    fn test_silicon_cloud_requires_key() {
        let result = create_translator(
            TranslationBackend::SiliconCloud,
            &TranslationSettings::default(),
            &Credentials::new(None, None),
        );
        assert!(matches!(result, Err(TekstError::Config(_))));
    }

    #[test]
    fn test_google_needs_no_key() {
        let translator = create_translator(
            TranslationBackend::Google,
            &TranslationSettings::default(),
            &Credentials::new(None, None),
        )
        .unwrap();
        assert_eq!(translator.tag(), "google");
    }
}
