//! Locate command implementation.

use super::{open_orchestrator, parse_time, resolve_fingerprint};
use crate::cli::Output;
use crate::config::Settings;
use crate::transcript::format_timestamp;
use anyhow::Result;

/// Run the locate command.
pub async fn run_locate(fingerprint: &str, time: &str, settings: Settings) -> Result<()> {
    let time_ms = parse_time(time)?;
    let orchestrator = open_orchestrator(settings)?;
    let fp = resolve_fingerprint(&orchestrator, fingerprint).await?;
    let position = orchestrator.locate(&fp, time_ms).await?;

    Output::kv("Time", &format!("{} ({} ms)", format_timestamp(time_ms), time_ms));
    match (&position.subtitle_index, &position.subtitle) {
        (Some(index), Some(subtitle)) => {
            Output::kv("Subtitle", &format!("#{}", index));
            Output::subtitle(subtitle, position.translation.as_deref());
        }
        _ => Output::info("No subtitle at this time."),
    }
    if let Some(word) = &position.word {
        Output::kv(
            "Word",
            &format!("{} [{}-{} ms]", word.text, word.start_time_ms, word.end_time_ms),
        );
    }

    Ok(())
}
