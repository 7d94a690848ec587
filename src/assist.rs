//! Single-shot helpers on top of a transcript: summaries and speech.
//!
//! Both talk to SiliconCloud and go through the shared [`RetryPolicy`].

use crate::client::{http_client, openai_client};
use crate::config::{AssistSettings, Credentials, Settings};
use crate::error::{status_error, Result, TekstError};
use crate::retry::RetryPolicy;
use crate::transcript::TranscriptRecord;
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Generation over a whole transcript takes longer than a single line.
const ASSIST_TIMEOUT: Duration = Duration::from_secs(120);

const SUMMARY_MAX_TOKENS: u32 = 4096;

/// Summary and text-to-speech client.
pub struct Assistant {
    chat: Client<OpenAIConfig>,
    http: reqwest::Client,
    settings: AssistSettings,
    api_key: String,
    policy: RetryPolicy,
}

impl Assistant {
    pub fn new(settings: &AssistSettings, api_key: &str, policy: RetryPolicy) -> Result<Self> {
        Ok(Self {
            chat: openai_client(&settings.base_url, api_key, policy.timeout)?,
            http: http_client(policy.timeout)?,
            settings: settings.clone(),
            api_key: api_key.to_string(),
            policy,
        })
    }

    /// Build from the application settings; needs the SiliconCloud key.
    pub fn from_settings(settings: &Settings, credentials: &Credentials) -> Result<Self> {
        let policy = RetryPolicy {
            max_attempts: settings.translation.max_attempts,
            base_delay: settings.translation.base_delay(),
            timeout: ASSIST_TIMEOUT,
        };
        Self::new(&settings.assist, credentials.silicon_cloud()?, policy)
    }

    /// Summarize a transcript in `language_name`.
    #[instrument(skip(self, record), fields(subtitles = record.subtitles.len()))]
    pub async fn summarize(&self, record: &TranscriptRecord, language_name: &str) -> Result<String> {
        let text = summary_input(record)?;
        info!("Summarizing {} chars with {}", text.len(), self.settings.summary_model);

        let summary = self
            .policy
            .run("Summary", |_| self.summarize_once(&text, language_name))
            .await?;
        debug!("Summary has {} chars", summary.len());
        Ok(summary)
    }

    async fn summarize_once(&self, text: &str, language_name: &str) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(summary_prompt(language_name))
                .build()
                .map_err(|e| TekstError::OpenAI(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(text)
                .build()
                .map_err(|e| TekstError::OpenAI(e.to_string()))?
                .into(),
        ];

        #[allow(deprecated)]
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.settings.summary_model)
            .messages(messages)
            .temperature(0.7)
            .max_tokens(SUMMARY_MAX_TOKENS)
            .build()
            .map_err(|e| TekstError::OpenAI(e.to_string()))?;

        let response = self
            .chat
            .chat()
            .create(request)
            .await
            .map_err(|e| TekstError::OpenAI(format!("Failed to generate summary: {}", e)))?;

        response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| TekstError::OpenAI("Empty summary from model".to_string()))
    }

    /// Synthesize `text` to MP3 bytes.
    #[instrument(skip(self, text), fields(chars = text.chars().count()))]
    pub async fn speak(&self, text: &str) -> Result<Vec<u8>> {
        if text.trim().is_empty() {
            return Err(TekstError::InvalidInput("Nothing to speak".into()));
        }

        let audio = self.policy.run("Speech", |_| self.speak_once(text)).await?;
        info!("Generated {} bytes of audio", audio.len());
        Ok(audio)
    }

    async fn speak_once(&self, text: &str) -> Result<Vec<u8>> {
        let response = self
            .http
            .post(format!("{}/audio/speech", self.settings.base_url.trim_end_matches('/')))
            .bearer_auth(&self.api_key)
            .json(&speech_payload(&self.settings, text))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error("silicon_cloud", status, &body));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

fn summary_prompt(language_name: &str) -> String {
    format!(
        "You are a content summarization assistant. Summarize the provided transcript concisely, \
         highlighting the key points. Write the summary in {}, keep it under 500 words and stay \
         objective and accurate.",
        language_name
    )
}

/// Non-empty subtitle text joined with spaces.
fn summary_input(record: &TranscriptRecord) -> Result<String> {
    let text = record
        .subtitles
        .iter()
        .map(|s| s.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if text.is_empty() {
        return Err(TekstError::InvalidInput("Transcript has no text to summarize".into()));
    }
    Ok(text)
}

fn speech_payload(settings: &AssistSettings, text: &str) -> serde_json::Value {
    json!({
        "model": settings.tts_model,
        "input": text,
        "voice": format!("{}:{}", settings.tts_model, settings.tts_voice),
        "response_format": "mp3",
        "sample_rate": 8000,
        "stream": false,
        "speed": 1,
        "gain": 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::Subtitle;

    #[test]
    fn test_summary_input_skips_blank() {
        let record = TranscriptRecord::new(
            vec![
                Subtitle::new(None, 0, 10, "First.", Vec::new()),
                Subtitle::new(None, 10, 20, "  ", Vec::new()),
                Subtitle::new(None, 20, 30, "Second.", Vec::new()),
            ],
            "/m/a.mp3",
        );
        assert_eq!(summary_input(&record).unwrap(), "First. Second.");

        let empty = TranscriptRecord::new(Vec::new(), "/m/a.mp3");
        assert!(matches!(summary_input(&empty), Err(TekstError::InvalidInput(_))));
    }

    #[test]
    fn test_speech_payload_voice() {
        let settings = AssistSettings::default();
        let payload = speech_payload(&settings, "hello");
        assert_eq!(payload["voice"], format!("{}:anna", settings.tts_model));
        assert_eq!(payload["response_format"], "mp3");
        assert_eq!(payload["input"], "hello");
    }

    #[test]
    fn test_requires_key() {
        let result = Assistant::from_settings(&Settings::default(), &Credentials::new(None, None));
        assert!(matches!(result, Err(TekstError::Config(_))));
    }

    #[tokio::test]
    async fn test_speak_rejects_blank_text() {
        let assistant =
            Assistant::new(&AssistSettings::default(), "sk-test", RetryPolicy::default()).unwrap();
        assert!(matches!(assistant.speak("  ").await, Err(TekstError::InvalidInput(_))));
    }
}
