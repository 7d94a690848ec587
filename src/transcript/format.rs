//! Transcript output formatting (JSON, SRT, VTT).
//!
//! Renders a cached record in standard subtitle formats, optionally with the
//! translation placed under each original line.

use super::TranscriptRecord;
use serde::Serialize;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Json,
    Srt,
    Vtt,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "srt" => Ok(OutputFormat::Srt),
            "vtt" | "webvtt" => Ok(OutputFormat::Vtt),
            _ => Err(format!("Unknown format: {}. Use json, srt, or vtt.", s)),
        }
    }
}

/// JSON-serializable transcript for export.
#[derive(Debug, Serialize)]
pub struct TranscriptExport {
    pub source_path: String,
    pub duration_ms: u64,
    pub timing_approximate: bool,
    pub subtitles: Vec<SubtitleExport>,
}

#[derive(Debug, Serialize)]
pub struct SubtitleExport {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    pub start_ms: u64,
    pub end_ms: u64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
}

impl TranscriptExport {
    fn from_record(record: &TranscriptRecord, translated: bool) -> Self {
        Self {
            source_path: record.source_path.clone(),
            duration_ms: record.duration_ms(),
            timing_approximate: record.timing_approximate,
            subtitles: record
                .subtitles
                .iter()
                .map(|s| SubtitleExport {
                    index: s.index,
                    speaker: s.speaker.clone(),
                    start_ms: s.start_time_ms,
                    end_ms: s.end_time_ms,
                    text: s.text.clone(),
                    translation: translated
                        .then(|| record.translations.get(&s.index))
                        .flatten()
                        .filter(|t| !t.is_empty())
                        .map(|t| t.text.clone()),
                })
                .collect(),
        }
    }
}

/// Format a transcript for output.
pub fn format_transcript(record: &TranscriptRecord, format: OutputFormat, translated: bool) -> String {
    match format {
        OutputFormat::Json => format_json(record, translated),
        OutputFormat::Srt => format_cues(record, translated, format_srt_timestamp, ""),
        OutputFormat::Vtt => format_cues(record, translated, format_vtt_timestamp, "WEBVTT\n\n"),
    }
}

fn format_json(record: &TranscriptRecord, translated: bool) -> String {
    let export = TranscriptExport::from_record(record, translated);
    serde_json::to_string_pretty(&export).unwrap_or_else(|_| "{}".to_string())
}

/// Numbered cue blocks shared by SRT and WebVTT.
fn format_cues(
    record: &TranscriptRecord,
    translated: bool,
    timestamp: fn(u64) -> String,
    header: &str,
) -> String {
    let mut output = String::from(header);

    for subtitle in &record.subtitles {
        output.push_str(&format!("{}\n", subtitle.index + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            timestamp(subtitle.start_time_ms),
            timestamp(subtitle.end_time_ms)
        ));
        output.push_str(&subtitle.text);
        output.push('\n');

        if translated {
            if let Some(entry) = record.translations.get(&subtitle.index).filter(|t| !t.is_empty()) {
                output.push_str(&entry.text);
                output.push('\n');
            }
        }
        output.push('\n');
    }

    output
}

/// Format timestamp for SRT (00:00:00,000).
fn format_srt_timestamp(total_ms: u64) -> String {
    let (hours, minutes, secs, ms) = split_ms(total_ms);
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, ms)
}

/// Format timestamp for VTT (00:00:00.000).
fn format_vtt_timestamp(total_ms: u64) -> String {
    let (hours, minutes, secs, ms) = split_ms(total_ms);
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, ms)
}

fn split_ms(total_ms: u64) -> (u64, u64, u64, u64) {
    (
        total_ms / 3_600_000,
        (total_ms % 3_600_000) / 60_000,
        (total_ms % 60_000) / 1000,
        total_ms % 1000,
    )
}
