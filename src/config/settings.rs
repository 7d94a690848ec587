//! Configuration settings for Tekst.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub transcription: TranscriptionSettings,
    pub translation: TranslationSettings,
    pub assist: AssistSettings,
    pub credentials: CredentialSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory holding the media index and subtitle cache.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.tekst".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Transcription backend type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptionBackend {
    /// AssemblyAI: remote, speaker-diarizing, job-based.
    #[default]
    AssemblyAi,
    /// A local whisper.cpp server returning SRT captions.
    Whisper,
}

impl TranscriptionBackend {
    /// Stable identifier used for registry lookups and logging.
    pub fn id(&self) -> &'static str {
        match self {
            TranscriptionBackend::AssemblyAi => "assemblyai",
            TranscriptionBackend::Whisper => "whisper",
        }
    }
}

impl std::str::FromStr for TranscriptionBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "assemblyai" | "assembly" => Ok(TranscriptionBackend::AssemblyAi),
            "whisper" | "local" => Ok(TranscriptionBackend::Whisper),
            _ => Err(format!("Unknown transcription backend: {}", s)),
        }
    }
}

impl std::fmt::Display for TranscriptionBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Transcription service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Default backend when none is given on the command line.
    pub backend: TranscriptionBackend,
    /// AssemblyAI API root.
    pub assemblyai_base_url: String,
    /// whisper.cpp server inference endpoint.
    pub whisper_server_url: String,
    /// Seconds between job status polls.
    pub poll_interval_secs: u64,
    /// Timeout for each individual network call.
    pub request_timeout_secs: u64,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            backend: TranscriptionBackend::AssemblyAi,
            assemblyai_base_url: "https://api.assemblyai.com/v2".to_string(),
            whisper_server_url: "http://127.0.0.1:8080/inference".to_string(),
            poll_interval_secs: 5,
            request_timeout_secs: 30,
        }
    }
}

impl TranscriptionSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Translation backend type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TranslationBackend {
    /// Google web translation endpoint (no key).
    #[default]
    Google,
    /// SiliconCloud, an OpenAI-compatible chat API.
    SiliconCloud,
    /// A local Ollama server.
    Ollama,
}

impl TranslationBackend {
    pub fn id(&self) -> &'static str {
        match self {
            TranslationBackend::Google => "google",
            TranslationBackend::SiliconCloud => "silicon_cloud",
            TranslationBackend::Ollama => "ollama",
        }
    }
}

impl std::str::FromStr for TranslationBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "google" => Ok(TranslationBackend::Google),
            "silicon_cloud" | "siliconcloud" | "siliconflow" => Ok(TranslationBackend::SiliconCloud),
            "ollama" => Ok(TranslationBackend::Ollama),
            _ => Err(format!("Unknown translation backend: {}", s)),
        }
    }
}

impl std::fmt::Display for TranslationBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Translation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationSettings {
    /// Default backend when none is given on the command line.
    pub backend: TranslationBackend,
    /// Maximum translation requests in flight.
    pub concurrency: usize,
    /// Attempts per item before it is recorded as failed.
    pub max_attempts: u32,
    /// Backoff unit; attempt n waits n times this.
    pub base_delay_ms: u64,
    /// Timeout for each translation request.
    pub request_timeout_secs: u64,
    /// Target language code.
    pub target_language: String,
    /// Human readable target language, used in generative prompts.
    pub target_language_name: String,
    /// Google translation endpoint.
    pub google_url: String,
    /// SiliconCloud API root.
    pub silicon_cloud_base_url: String,
    /// SiliconCloud chat model.
    pub silicon_cloud_model: String,
    /// Ollama chat endpoint.
    pub ollama_url: String,
    /// Ollama model.
    pub ollama_model: String,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            backend: TranslationBackend::Google,
            concurrency: 2,
            max_attempts: 3,
            base_delay_ms: 1000,
            request_timeout_secs: 30,
            target_language: "zh-cn".to_string(),
            target_language_name: "Chinese".to_string(),
            google_url: "https://translate.googleapis.com/translate_a/single".to_string(),
            silicon_cloud_base_url: "https://api.siliconflow.cn/v1".to_string(),
            silicon_cloud_model: "Qwen/Qwen2.5-7B-Instruct".to_string(),
            ollama_url: "http://localhost:11434/api/chat".to_string(),
            ollama_model: "qwen2.5:0.5b".to_string(),
        }
    }
}

impl TranslationSettings {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Settings for the single-shot summary and speech helpers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistSettings {
    /// SiliconCloud API root.
    pub base_url: String,
    /// Chat model used for summaries.
    pub summary_model: String,
    /// Speech model used for text-to-speech.
    pub tts_model: String,
    /// Voice name within the speech model.
    pub tts_voice: String,
}

impl Default for AssistSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.siliconflow.cn/v1".to_string(),
            summary_model: "Qwen/Qwen2.5-7B-Instruct".to_string(),
            tts_model: "FunAudioLLM/CosyVoice2-0.5B".to_string(),
            tts_voice: "anna".to_string(),
        }
    }
}

/// API keys. Empty values fall back to environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct CredentialSettings {
    pub assemblyai_api_key: Option<String>,
    pub silicon_cloud_api_key: Option<String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::TekstError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tekst")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }
}
