//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;
use std::path::PathBuf;

/// Run the config command.
pub fn run_config(action: &ConfigAction, config_path: Option<PathBuf>, settings: Settings) -> Result<()> {
    let config_path = config_path.unwrap_or_else(Settings::default_config_path);

    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&redacted(&settings))
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Init => {
            if config_path.exists() {
                Output::info(&format!("Config already exists at {}", config_path.display()));
            } else {
                settings.save_to(&config_path)?;
                Output::success(&format!("Created default config at {}", config_path.display()));
            }
        }

        ConfigAction::Edit => {
            if !config_path.exists() {
                settings.save_to(&config_path)?;
                Output::info(&format!("Created default config at {}", config_path.display()));
            }

            let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());
            Output::info(&format!("Opening config in {}...", editor));

            match std::process::Command::new(&editor).arg(&config_path).status() {
                Ok(s) if s.success() => Output::success("Config saved."),
                Ok(_) => Output::warning("Editor exited with non-zero status."),
                Err(e) => {
                    Output::error(&format!("Failed to open editor: {}", e));
                    Output::info(&format!("Config file is at: {}", config_path.display()));
                }
            }
        }

        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

/// Copy of the settings with API keys masked.
fn redacted(settings: &Settings) -> Settings {
    let mut shown = settings.clone();
    for key in [
        &mut shown.credentials.assemblyai_api_key,
        &mut shown.credentials.silicon_cloud_api_key,
    ] {
        if let Some(value) = key.as_mut() {
            *value = mask(value);
        }
    }
    shown
}

fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask() {
        assert_eq!(mask("short"), "****");
        assert_eq!(mask("sk-1234567890abcd"), "sk-1...abcd");
    }

    #[test]
    fn test_show_redacts_keys() {
        let mut settings = Settings::default();
        settings.credentials.silicon_cloud_api_key = Some("sk-secret-value-123".to_string());
        let shown = redacted(&settings);
        assert_eq!(shown.credentials.silicon_cloud_api_key.as_deref(), Some("sk-s...-123"));
        assert!(shown.credentials.assemblyai_api_key.is_none());
    }

    #[test]
    fn test_init_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tekst").join("config.toml");
        run_config(&ConfigAction::Init, Some(path.clone()), Settings::default()).unwrap();
        assert!(path.exists());
        Settings::load_from(Some(&path)).unwrap();
    }
}
