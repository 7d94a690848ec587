//! List command implementation.

use super::open_orchestrator;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the list command.
pub async fn run_list(settings: Settings) -> Result<()> {
    let orchestrator = open_orchestrator(settings)?;
    let history = orchestrator.list().await?;

    if history.is_empty() {
        Output::info("No media processed yet. Use 'tekst transcribe <file>' to add content.");
        return Ok(());
    }

    Output::header(&format!("Processed Media ({})", history.len()));
    println!();
    for item in &history {
        Output::history_entry(item);
    }

    let subtitles: usize = history.iter().filter_map(|h| h.subtitles).sum();
    let translated: usize = history.iter().map(|h| h.translated).sum();
    println!();
    Output::kv("Total items", &history.len().to_string());
    Output::kv("Total subtitles", &subtitles.to_string());
    Output::kv("Translated", &translated.to_string());

    Ok(())
}
