//! Transcription backends and output normalization.
//!
//! Each backend implements [`Transcriber`] and returns a [`RawTranscript`];
//! [`TranscriptionOrchestrator`] turns that into a validated
//! [`TranscriptRecord`](crate::transcript::TranscriptRecord).
//!
//! # Backends
//!
//! - **AssemblyAI** (default): remote, diarizing. Uploads the file, submits a
//!   job and polls it to a terminal state.
//! - **Whisper**: a local whisper.cpp server returning SRT captions. Word
//!   timing is synthesized and the record is flagged approximate.

mod assemblyai;
mod pipeline;
mod poll;
mod srt;
mod whisper_server;

pub use assemblyai::AssemblyAiTranscriber;
pub use pipeline::TranscriptionOrchestrator;
pub use srt::parse_srt;
pub use whisper_server::WhisperServerTranscriber;

use crate::config::{Credentials, TranscriptionBackend, TranscriptionSettings};
use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

/// A word as reported by a backend. Timing may be missing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawWord {
    pub text: String,
    #[serde(default, rename = "start")]
    pub start_ms: Option<u64>,
    #[serde(default, rename = "end")]
    pub end_ms: Option<u64>,
}

/// One utterance as reported by a backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawUtterance {
    #[serde(default)]
    pub speaker: Option<String>,
    #[serde(default, rename = "start")]
    pub start_ms: Option<u64>,
    #[serde(default, rename = "end")]
    pub end_ms: Option<u64>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub words: Vec<RawWord>,
}

/// Backend output before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTranscript {
    pub utterances: Vec<RawUtterance>,
    /// Word timings were synthesized rather than measured.
    pub timing_approximate: bool,
}

/// Trait for transcription backends.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe the media file at `media_path`.
    async fn transcribe(&self, media_path: &Path) -> Result<RawTranscript>;

    /// Which backend this adapter speaks to.
    fn backend(&self) -> TranscriptionBackend;
}

/// Build the adapter for `backend`, failing fast on missing credentials.
pub fn create_transcriber(
    backend: TranscriptionBackend,
    settings: &TranscriptionSettings,
    credentials: &Credentials,
) -> Result<Arc<dyn Transcriber>> {
    let transcriber: Arc<dyn Transcriber> = match backend {
        TranscriptionBackend::AssemblyAi => Arc::new(AssemblyAiTranscriber::new(
            settings,
            credentials.assemblyai()?,
        )?),
        TranscriptionBackend::Whisper => Arc::new(WhisperServerTranscriber::new(settings)?),
    };
    Ok(transcriber)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TekstError;

    #[test]
    fn test_assemblyai_requires_key() {
        let result = create_transcriber(
            TranscriptionBackend::AssemblyAi,
            &TranscriptionSettings::default(),
            &Credentials::new(None, None),
        );
        assert!(matches!(result, Err(TekstError::Config(_))));
    }

    #[test]
    fn test_whisper_needs_no_key() {
        let transcriber = create_transcriber(
            TranscriptionBackend::Whisper,
            &TranscriptionSettings::default(),
            &Credentials::new(None, None),
        )
        .unwrap();
        assert_eq!(transcriber.backend(), TranscriptionBackend::Whisper);
    }

    #[test]
    fn test_raw_utterance_tolerates_missing_fields() {
        let raw: RawUtterance = serde_json::from_str(
            r#"{"speaker":"A","start":0,"end":900,"text":"hi there",
                "words":[{"text":"hi","start":0,"end":400,"confidence":0.9},{"text":"there"}]}"#,
        )
        .unwrap();
        assert_eq!(raw.words.len(), 2);
        assert_eq!(raw.words[1].start_ms, None);
    }
}
