//! Select command implementation.

use super::open_orchestrator;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;
use std::path::Path;

/// Run the select command.
pub async fn run_select(path: &str, settings: Settings) -> Result<()> {
    let orchestrator = open_orchestrator(settings)?;
    let selected = orchestrator.select(Path::new(path)).await?;

    Output::kv("Fingerprint", selected.fingerprint.as_str());
    match &selected.cached {
        Some(record) => {
            Output::success(&format!(
                "Cached: {} subtitles, {} translated",
                record.subtitles.len(),
                record.translated_count()
            ));
        }
        None => {
            Output::info(&format!("Not transcribed yet. Run 'tekst transcribe {}'.", path));
        }
    }

    Ok(())
}
