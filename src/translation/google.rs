//! Google web translation endpoint (`client=gtx`).

use super::Translator;
use crate::client::http_client;
use crate::config::TranslationSettings;
use crate::error::{status_error, Result, TekstError};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

pub struct GoogleTranslator {
    client: reqwest::Client,
    url: String,
    target_language: String,
}

impl GoogleTranslator {
    pub fn new(settings: &TranslationSettings) -> Result<Self> {
        Ok(Self {
            client: http_client(settings.request_timeout())?,
            url: settings.google_url.clone(),
            target_language: settings.target_language.clone(),
        })
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", self.target_language.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error("google", status, &body));
        }

        let body: Value = response.json().await?;
        let translated = parse_google_response(&body)?;
        debug!("google: {} chars -> {} chars", text.len(), translated.len());
        Ok(translated)
    }

    fn tag(&self) -> String {
        "google".to_string()
    }
}

/// Join the translated segments of a `gtx` response.
///
/// The payload is a nested array whose first element lists segments as
/// `[translated, original, ...]`.
pub(crate) fn parse_google_response(body: &Value) -> Result<String> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TekstError::MalformedBackendResponse("google: missing segment list".into()))?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if translated.trim().is_empty() {
        return Err(TekstError::Translation("google: empty translation".into()));
    }
    Ok(translated)
}
