//! CLI module for Tekst.

pub mod commands;
mod output;

pub use output::Output;
pub(crate) use output::content_preview;

use clap::{Parser, Subcommand};

/// Tekst - content-addressed transcription and translation
///
/// Transcribes audio and video files, caches the result against the file's
/// content, and translates subtitles with a choice of backends.
#[derive(Parser, Debug)]
#[command(name = "tekst")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check credentials and data directory
    Doctor,

    /// Fingerprint a media file and report whether it is cached
    Select {
        /// Audio or video file
        path: String,
    },

    /// Transcribe a media file (uses the cache unless --force)
    Transcribe {
        /// Audio or video file
        path: String,

        /// Transcription backend (assemblyai, whisper)
        #[arg(short, long)]
        backend: Option<String>,

        /// Transcribe again even if a cached transcript exists
        #[arg(short, long)]
        force: bool,

        /// Also write the transcript to this file
        #[arg(short, long)]
        output: Option<String>,

        /// Format for --output (json, srt, vtt)
        #[arg(long, default_value = "srt")]
        format: String,
    },

    /// Translate a cached transcript, or a single text with --adhoc
    Translate {
        /// Fingerprint (or unique prefix) of a cached transcript
        #[arg(required_unless_present = "adhoc")]
        fingerprint: Option<String>,

        /// Translate this text without touching the cache
        #[arg(long, conflicts_with = "fingerprint")]
        adhoc: Option<String>,

        /// Translation backend (google, silicon_cloud, ollama)
        #[arg(short, long)]
        backend: Option<String>,

        /// Only translate subtitles without a translation from this backend
        #[arg(long)]
        only_missing: bool,

        /// Maximum concurrent requests (overrides config)
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Remove a transcript from the index and cache
    Evict {
        /// Fingerprint (or unique prefix)
        fingerprint: String,
    },

    /// List processed media
    List,

    /// Print a cached transcript
    Show {
        /// Fingerprint (or unique prefix)
        fingerprint: String,

        /// Print translations under each line
        #[arg(short, long)]
        translated: bool,
    },

    /// Show the subtitle and word active at a playback time
    Locate {
        /// Fingerprint (or unique prefix)
        fingerprint: String,

        /// Playback time in milliseconds, or MM:SS / HH:MM:SS(.mmm)
        time: String,
    },

    /// Export a cached transcript
    Export {
        /// Fingerprint (or unique prefix)
        fingerprint: String,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,

        /// Output format (json, srt, vtt)
        #[arg(long, default_value = "srt")]
        format: String,

        /// Include translations
        #[arg(short, long)]
        translated: bool,
    },

    /// Summarize a cached transcript
    Summarize {
        /// Fingerprint (or unique prefix)
        fingerprint: String,
    },

    /// Convert text to speech (MP3)
    Speak {
        /// Text to speak
        text: String,

        /// Output file
        #[arg(short, long, default_value = "speech.mp3")]
        output: String,
    },

    /// Start HTTP API server for integration with other applications
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Write the default configuration file if missing
    Init,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
