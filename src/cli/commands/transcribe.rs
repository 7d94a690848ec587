//! Transcribe command implementation.

use super::open_orchestrator;
use crate::cli::Output;
use crate::config::{Settings, TranscriptionBackend};
use crate::transcript::{format_timestamp, format_transcript, OutputFormat};
use anyhow::Result;
use std::path::Path;

/// Run the transcribe command.
pub async fn run_transcribe(
    path: &str,
    backend: Option<&str>,
    force: bool,
    output: Option<String>,
    format: &str,
    settings: Settings,
) -> Result<()> {
    let backend: TranscriptionBackend = match backend {
        Some(name) => name.parse().map_err(anyhow::Error::msg)?,
        None => settings.transcription.backend,
    };
    let output_format: OutputFormat = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let orchestrator = open_orchestrator(settings)?;

    let spinner = Output::spinner(&format!("Transcribing {} with {}...", path, backend));
    let result = orchestrator.process(Path::new(path), backend, force).await;
    spinner.finish_and_clear();

    let (fp, record, cached) = match result {
        Ok(done) => done,
        Err(e) => {
            Output::error(&format!("Transcription failed: {}", e));
            return Err(e.into());
        }
    };

    if cached {
        Output::success("Already transcribed (cached). Use --force to transcribe again.");
    } else {
        Output::success(&format!("Transcribed with {}", backend));
    }
    Output::kv("Fingerprint", fp.as_str());
    Output::kv("Subtitles", &record.subtitles.len().to_string());
    Output::kv("Duration", &format_timestamp(record.duration_ms()));
    if record.timing_approximate {
        Output::warning("Word timings are approximate (caption backend).");
    }

    if let Some(out) = output {
        std::fs::write(&out, format_transcript(&record, output_format, false))?;
        Output::success(&format!("Wrote transcript to {}", out));
    }

    Ok(())
}
