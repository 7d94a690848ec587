//! Show command implementation.

use super::{open_orchestrator, resolve_fingerprint};
use crate::cli::Output;
use crate::config::Settings;
use crate::transcript::format_timestamp;
use anyhow::Result;

/// Run the show command.
pub async fn run_show(fingerprint: &str, translated: bool, settings: Settings) -> Result<()> {
    let orchestrator = open_orchestrator(settings)?;
    let fp = resolve_fingerprint(&orchestrator, fingerprint).await?;
    let record = orchestrator.require(&fp).await?;

    Output::header(&record.source_path);
    Output::kv("Fingerprint", fp.as_str());
    Output::kv("Duration", &format_timestamp(record.duration_ms()));
    Output::kv("Subtitles", &record.subtitles.len().to_string());
    if let Some(tag) = record.translator_tag() {
        Output::kv("Translator", tag);
    }
    if record.timing_approximate {
        Output::kv("Word timing", "approximate");
    }
    println!();

    for subtitle in &record.subtitles {
        let translation = translated
            .then(|| record.translations.get(&subtitle.index))
            .flatten()
            .filter(|t| !t.is_empty())
            .map(|t| t.text.as_str());
        Output::subtitle(subtitle, translation);
    }

    Ok(())
}
