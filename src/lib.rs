//! Tekst - content-addressed transcription and translation
//!
//! A library and CLI for turning audio and video files into timed subtitles,
//! caching them against the file's content and translating them.
//!
//! # Overview
//!
//! Tekst allows you to:
//! - Fingerprint a media file so a moved or renamed copy reuses its cache
//! - Transcribe with AssemblyAI or a local whisper.cpp server
//! - Translate subtitles with Google, SiliconCloud or Ollama
//! - Find the subtitle and word active at any playback time
//!
//! # Architecture
//!
//! - `config` - Configuration and credentials
//! - `hashing` - Content fingerprints
//! - `cache` - Media index and subtitle cache on disk
//! - `transcript` - Transcript model, validation and export formats
//! - `transcription` - Speech-to-text backends and normalization
//! - `translation` - Translation backends and the batch engine
//! - `timeline` - Playback-time lookups
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use tekst::config::{Settings, TranscriptionBackend};
//! use tekst::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let (fingerprint, record, cached) = orchestrator
//!         .process(Path::new("talk.mp3"), TranscriptionBackend::AssemblyAi, false)
//!         .await?;
//!     println!("{}: {} subtitles (cached: {})", fingerprint, record.subtitles.len(), cached);
//!
//!     Ok(())
//! }
//! ```

pub mod assist;
pub mod cache;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod hashing;
pub mod media;
pub mod orchestrator;
pub mod retry;
pub mod timeline;
pub mod transcript;
pub mod transcription;
pub mod translation;

pub use error::{Result, TekstError};
