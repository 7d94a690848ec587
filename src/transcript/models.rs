//! Canonical transcript data model.
//!
//! All times are integer milliseconds from the start of the media.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single time-bounded token inside a subtitle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    #[serde(rename = "start")]
    pub start_time_ms: u64,
    #[serde(rename = "end")]
    pub end_time_ms: u64,
}

impl Word {
    pub fn new(text: impl Into<String>, start_time_ms: u64, end_time_ms: u64) -> Self {
        Self {
            text: text.into(),
            start_time_ms,
            end_time_ms,
        }
    }
}

/// One utterance of a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtitle {
    /// Position within the transcript. Not persisted; assigned on load.
    #[serde(skip)]
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    #[serde(rename = "start_time")]
    pub start_time_ms: u64,
    #[serde(rename = "end_time")]
    pub end_time_ms: u64,
    pub text: String,
    pub words: Vec<Word>,
}

impl Subtitle {
    pub fn new(
        speaker: Option<String>,
        start_time_ms: u64,
        end_time_ms: u64,
        text: impl Into<String>,
        words: Vec<Word>,
    ) -> Self {
        Self {
            index: 0,
            speaker,
            start_time_ms,
            end_time_ms,
            text: text.into(),
            words,
        }
    }

    /// Duration in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.end_time_ms.saturating_sub(self.start_time_ms)
    }
}

/// A translated subtitle, tagged with the backend that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationEntry {
    pub text: String,
    #[serde(rename = "translator")]
    pub translator_tag: String,
}

impl TranslationEntry {
    pub fn new(text: impl Into<String>, translator_tag: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            translator_tag: translator_tag.into(),
        }
    }

    /// An entry whose translation never succeeded.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Everything cached for one piece of content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptRecord {
    pub subtitles: Vec<Subtitle>,
    #[serde(default)]
    pub translations: BTreeMap<usize, TranslationEntry>,
    #[serde(rename = "file_path")]
    pub source_path: String,
    /// Word timings were synthesized rather than measured.
    #[serde(default)]
    pub timing_approximate: bool,
}

impl TranscriptRecord {
    /// Create a record, numbering subtitles by position.
    pub fn new(subtitles: Vec<Subtitle>, source_path: impl Into<String>) -> Self {
        let mut record = Self {
            subtitles,
            translations: BTreeMap::new(),
            source_path: source_path.into(),
            timing_approximate: false,
        };
        record.renumber();
        record
    }

    pub fn with_approximate_timing(mut self, approximate: bool) -> Self {
        self.timing_approximate = approximate;
        self
    }

    /// Assign each subtitle its position as index.
    pub fn renumber(&mut self) {
        for (i, subtitle) in self.subtitles.iter_mut().enumerate() {
            subtitle.index = i;
        }
    }

    /// Total duration in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.subtitles.last().map(|s| s.end_time_ms).unwrap_or(0)
    }

    /// Number of subtitles with a non-empty translation.
    pub fn translated_count(&self) -> usize {
        self.translations.values().filter(|t| !t.is_empty()).count()
    }

    /// Tag of the translator that produced the current translations, if any.
    pub fn translator_tag(&self) -> Option<&str> {
        self.translations.values().next().map(|t| t.translator_tag.as_str())
    }

    /// Merge a batch of translations.
    ///
    /// A batch from a different translator replaces the existing set so that
    /// one record never mixes output from incompatible backends. A batch with
    /// no usable text never replaces anything, and an empty entry never
    /// overwrites a non-empty one.
    pub fn apply_translations(&mut self, batch: BTreeMap<usize, TranslationEntry>) {
        let Some(incoming) = batch.values().next().map(|t| t.translator_tag.clone()) else {
            return;
        };
        let has_text = batch.values().any(|t| !t.is_empty());

        if let Some(existing) = self.translator_tag() {
            if existing != incoming {
                if !has_text {
                    return;
                }
                self.translations.clear();
            }
        }

        for (index, entry) in batch {
            let keeps_existing = entry.is_empty()
                && self.translations.get(&index).is_some_and(|t| !t.is_empty());
            if !keeps_existing {
                self.translations.insert(index, entry);
            }
        }
    }

    /// Full text, one subtitle per line.
    pub fn full_text(&self) -> String {
        self.subtitles
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Format milliseconds as MM:SS or HH:MM:SS.
pub fn format_timestamp(ms: u64) -> String {
    let total_seconds = ms / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}
