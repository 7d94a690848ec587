//! Backend selection and normalization into the canonical schema.

use super::{create_transcriber, RawTranscript, RawUtterance, Transcriber};
use crate::config::{Credentials, TranscriptionBackend, TranscriptionSettings};
use crate::error::{Result, TekstError};
use crate::media::ensure_media_file;
use crate::transcript::{repair_subtitles, validate_record, Subtitle, TranscriptRecord, Word};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Runs a registered [`Transcriber`] and adapts its output.
#[derive(Default)]
pub struct TranscriptionOrchestrator {
    transcribers: HashMap<TranscriptionBackend, Arc<dyn Transcriber>>,
    /// Why a known backend could not be set up (usually a missing key).
    unavailable: HashMap<TranscriptionBackend, String>,
}

impl TranscriptionOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every built-in backend that can be constructed.
    pub fn from_settings(settings: &TranscriptionSettings, credentials: &Credentials) -> Self {
        let mut orchestrator = Self::new();
        for backend in [TranscriptionBackend::AssemblyAi, TranscriptionBackend::Whisper] {
            match create_transcriber(backend, settings, credentials) {
                Ok(transcriber) => orchestrator.register(transcriber),
                Err(TekstError::Config(reason)) => {
                    orchestrator.unavailable.insert(backend, reason);
                }
                Err(e) => {
                    orchestrator.unavailable.insert(backend, e.to_string());
                }
            }
        }
        orchestrator
    }

    /// Add or replace the adapter for its backend.
    pub fn register(&mut self, transcriber: Arc<dyn Transcriber>) {
        let backend = transcriber.backend();
        self.unavailable.remove(&backend);
        self.transcribers.insert(backend, transcriber);
    }

    pub fn is_available(&self, backend: TranscriptionBackend) -> bool {
        self.transcribers.contains_key(&backend)
    }

    /// Transcribe `path` with `backend` and return a validated record.
    ///
    /// Nothing is cached here; a failure leaves no trace.
    #[instrument(skip(self), fields(path = %path.display(), backend = %backend))]
    pub async fn request(&self, path: &Path, backend: TranscriptionBackend) -> Result<TranscriptRecord> {
        ensure_media_file(path)?;

        let transcriber = self.transcribers.get(&backend).ok_or_else(|| {
            TekstError::Config(
                self.unavailable
                    .get(&backend)
                    .cloned()
                    .unwrap_or_else(|| format!("No transcriber registered for {}", backend)),
            )
        })?;

        let raw = transcriber.transcribe(path).await?;
        let record = normalize(raw, &path.to_string_lossy())?;
        info!(
            "Transcribed {} subtitles ({} words) with {}",
            record.subtitles.len(),
            record.subtitles.iter().map(|s| s.words.len()).sum::<usize>(),
            backend
        );
        Ok(record)
    }
}

/// Adapt raw backend output into a canonical, validated record.
pub(crate) fn normalize(raw: RawTranscript, source_path: &str) -> Result<TranscriptRecord> {
    let subtitles: Vec<Subtitle> = raw.utterances.into_iter().filter_map(adapt_utterance).collect();
    let subtitles = repair_subtitles(subtitles);
    if subtitles.is_empty() {
        return Err(TekstError::MalformedBackendResponse(
            "backend returned no usable utterances".into(),
        ));
    }

    let record =
        TranscriptRecord::new(subtitles, source_path).with_approximate_timing(raw.timing_approximate);
    validate_record(&record)
        .map_err(|e| TekstError::MalformedBackendResponse(e.to_string()))?;
    Ok(record)
}

fn adapt_utterance(utterance: RawUtterance) -> Option<Subtitle> {
    let word_starts = utterance.words.iter().filter_map(|w| w.start_ms);
    let word_ends = utterance.words.iter().filter_map(|w| w.end_ms);
    let start = utterance.start_ms.or_else(|| word_starts.min());
    let end = utterance.end_ms.or_else(|| word_ends.max());

    let (start, end) = match (start, end) {
        (Some(start), Some(end)) => (start, end.max(start)),
        _ => {
            warn!("Dropping utterance without timing: {:?}", utterance.text);
            return None;
        }
    };

    let words: Vec<Word> = utterance
        .words
        .into_iter()
        .map(|w| Word::new(w.text.trim(), w.start_ms.unwrap_or(start), w.end_ms.unwrap_or(end)))
        .collect();

    let text = match utterance.text.trim() {
        "" => words.iter().map(|w| w.text.as_str()).collect::<Vec<_>>().join(" "),
        text => text.to_string(),
    };

    Some(Subtitle::new(utterance.speaker, start, end, text, words))
}
