//! Media file checks.
//!
//! Supports both audio and video containers; backends extract the audio
//! track themselves.

use crate::error::{Result, TekstError};
use std::path::Path;

/// Supported audio file extensions.
const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "wav", "flac", "aac", "ogg", "opus", "m4a", "wma", "aiff", "alac",
];

/// Supported video file extensions.
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "mov", "webm", "m4v"];

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Check if path is a supported audio file.
pub fn is_audio_file(path: &Path) -> bool {
    extension(path).is_some_and(|ext| AUDIO_EXTENSIONS.contains(&ext.as_str()))
}

/// Check if path is a supported media file (audio or video).
pub fn is_media_file(path: &Path) -> bool {
    is_audio_file(path)
        || extension(path).is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
}

/// Fail unless `path` is an existing, supported media file.
pub fn ensure_media_file(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(TekstError::NotFound(format!("File not found: {}", path.display())));
    }
    if !is_media_file(path) {
        return Err(TekstError::UnsupportedMedia(format!(
            "Not a recognized audio or video file: {}",
            path.display()
        )));
    }
    Ok(())
}

/// Mime type used when uploading the file.
pub fn mime_type(path: &Path) -> &'static str {
    match extension(path).as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("flac") => "audio/flac",
        Some("ogg") | Some("opus") => "audio/ogg",
        Some("m4a") | Some("aac") => "audio/mp4",
        Some("mp4") | Some("m4v") => "video/mp4",
        Some("webm") => "video/webm",
        _ => "application/octet-stream",
    }
}
