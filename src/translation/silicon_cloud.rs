//! SiliconCloud chat-completions translation.

use super::{system_prompt, token_budget, Translator};
use crate::client::openai_client;
use crate::config::TranslationSettings;
use crate::error::{Result, TekstError};
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;

pub struct SiliconCloudTranslator {
    client: Client<OpenAIConfig>,
    model: String,
    system_prompt: String,
}

impl SiliconCloudTranslator {
    pub fn new(settings: &TranslationSettings, api_key: &str) -> Result<Self> {
        Ok(Self {
            client: openai_client(
                &settings.silicon_cloud_base_url,
                api_key,
                settings.request_timeout(),
            )?,
            model: settings.silicon_cloud_model.clone(),
            system_prompt: system_prompt(&settings.target_language_name),
        })
    }
}

#[async_trait]
impl Translator for SiliconCloudTranslator {
    async fn translate(&self, text: &str) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.system_prompt.clone())
                .build()
                .map_err(|e| TekstError::Translation(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(text)
                .build()
                .map_err(|e| TekstError::Translation(e.to_string()))?
                .into(),
        ];

        #[allow(deprecated)]
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.3)
            .max_tokens(token_budget(text))
            .build()
            .map_err(|e| TekstError::Translation(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| TekstError::OpenAI(format!("silicon_cloud: {}", e)))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .map(|c| c.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(TekstError::Translation("silicon_cloud: empty completion".into()));
        }
        Ok(content)
    }

    fn tag(&self) -> String {
        format!("silicon_cloud:{}", self.model)
    }
}
