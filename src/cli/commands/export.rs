//! Export command implementation.

use super::{open_orchestrator, resolve_fingerprint};
use crate::cli::Output;
use crate::config::Settings;
use crate::transcript::{format_transcript, OutputFormat};
use anyhow::Result;

/// Run the export command.
pub async fn run_export(
    fingerprint: &str,
    output: Option<String>,
    format: &str,
    translated: bool,
    settings: Settings,
) -> Result<()> {
    let output_format: OutputFormat = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let orchestrator = open_orchestrator(settings)?;
    let fp = resolve_fingerprint(&orchestrator, fingerprint).await?;
    let record = orchestrator.require(&fp).await?;

    if translated && record.translated_count() == 0 {
        Output::warning("Transcript has no translations yet; exporting originals only.");
    }

    let output_str = format_transcript(&record, output_format, translated);

    match output {
        Some(path) if path != "-" => {
            std::fs::write(&path, &output_str)?;
            Output::success(&format!(
                "Exported '{}' to {} ({} subtitles)",
                record.source_path,
                path,
                record.subtitles.len()
            ));
        }
        _ => {
            println!("{}", output_str);
        }
    }

    Ok(())
}
