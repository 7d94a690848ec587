//! Read-only credential provider.
//!
//! Keys come from the `[credentials]` section of the config file, falling back
//! to environment variables. Lookups fail fast with a configuration error so
//! no network call is attempted without a key.

use super::CredentialSettings;
use crate::error::{Result, TekstError};

const ASSEMBLYAI_ENV: &str = "ASSEMBLYAI_API_KEY";
const SILICON_CLOUD_ENV: &str = "SILICONFLOW_API_KEY";

/// Resolved API keys.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    assemblyai_api_key: Option<String>,
    silicon_cloud_api_key: Option<String>,
}

impl Credentials {
    /// Resolve keys from settings, then the environment.
    pub fn resolve(settings: &CredentialSettings) -> Self {
        Self {
            assemblyai_api_key: non_empty(settings.assemblyai_api_key.clone())
                .or_else(|| non_empty(std::env::var(ASSEMBLYAI_ENV).ok())),
            silicon_cloud_api_key: non_empty(settings.silicon_cloud_api_key.clone())
                .or_else(|| non_empty(std::env::var(SILICON_CLOUD_ENV).ok())),
        }
    }

    /// Build credentials directly, bypassing the environment.
    pub fn new(assemblyai_api_key: Option<String>, silicon_cloud_api_key: Option<String>) -> Self {
        Self {
            assemblyai_api_key: non_empty(assemblyai_api_key),
            silicon_cloud_api_key: non_empty(silicon_cloud_api_key),
        }
    }

    pub fn assemblyai(&self) -> Result<&str> {
        self.assemblyai_api_key.as_deref().ok_or_else(|| {
            TekstError::Config(format!(
                "AssemblyAI API key not set. Add credentials.assemblyai_api_key to the config or export {}",
                ASSEMBLYAI_ENV
            ))
        })
    }

    pub fn silicon_cloud(&self) -> Result<&str> {
        self.silicon_cloud_api_key.as_deref().ok_or_else(|| {
            TekstError::Config(format!(
                "SiliconCloud API key not set. Add credentials.silicon_cloud_api_key to the config or export {}",
                SILICON_CLOUD_ENV
            ))
        })
    }

    pub fn has_assemblyai(&self) -> bool {
        self.assemblyai_api_key.is_some()
    }

    pub fn has_silicon_cloud(&self) -> bool {
        self.silicon_cloud_api_key.is_some()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_config_error() {
        let creds = Credentials::new(None, Some("   ".into()));
        assert!(matches!(creds.assemblyai(), Err(TekstError::Config(_))));
        assert!(matches!(creds.silicon_cloud(), Err(TekstError::Config(_))));
    }

    #[test]
    fn test_settings_key_wins() {
        let settings = CredentialSettings {
            assemblyai_api_key: Some("from-config".into()),
            silicon_cloud_api_key: None,
        };
        let creds = Credentials::resolve(&settings);
        assert_eq!(creds.assemblyai().unwrap(), "from-config");
    }
}
