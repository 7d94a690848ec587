//! Local Ollama chat translation.

use super::{system_prompt, token_budget, Translator};
use crate::client::http_client;
use crate::config::TranslationSettings;
use crate::error::{status_error, Result, TekstError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

pub struct OllamaTranslator {
    client: reqwest::Client,
    url: String,
    model: String,
    system_prompt: String,
}

impl OllamaTranslator {
    pub fn new(settings: &TranslationSettings) -> Result<Self> {
        Ok(Self {
            client: http_client(settings.request_timeout())?,
            url: settings.ollama_url.clone(),
            model: settings.ollama_model.clone(),
            system_prompt: system_prompt(&settings.target_language_name),
        })
    }

    fn request<'a>(&'a self, text: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &self.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            stream: false,
            options: ChatOptions {
                temperature: 0.7,
                top_p: 0.9,
                frequency_penalty: 0.2,
                presence_penalty: 0.1,
                num_predict: token_budget(text),
            },
        }
    }
}

#[async_trait]
impl Translator for OllamaTranslator {
    async fn translate(&self, text: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.url)
            .json(&self.request(text))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error("ollama", status, &body));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| TekstError::MalformedBackendResponse(format!("ollama: {}", e)))?;

        let content = body
            .message
            .map(|m| m.content.trim().to_string())
            .unwrap_or_default();
        if content.is_empty() {
            return Err(TekstError::Translation("ollama: empty reply".into()));
        }
        Ok(content)
    }

    fn tag(&self) -> String {
        format!("ollama:{}", self.model)
    }
}
