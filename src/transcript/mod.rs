//! Transcript model shared by the cache, the backends and the timeline.

mod format;
mod models;
mod validate;

pub use format::{format_transcript, OutputFormat, SubtitleExport, TranscriptExport};
pub use models::{format_timestamp, Subtitle, TranscriptRecord, TranslationEntry, Word};
pub use validate::{repair_subtitles, validate_record};
