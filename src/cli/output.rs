//! CLI output formatting utilities.

use crate::orchestrator::HistoryEntry;
use crate::transcript::{format_timestamp, Subtitle};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print one processed file.
    pub fn history_entry(item: &HistoryEntry) {
        let detail = match item.subtitles {
            Some(n) => format!("{} subtitles, {} translated", n, item.translated),
            None => style("cache missing").yellow().to_string(),
        };
        println!(
            "  {} {} ({}, {})",
            style("*").cyan(),
            style(&item.entry.source_path).bold(),
            style(short_fingerprint(item.fingerprint.as_str())).dim(),
            detail
        );
    }

    /// Print one subtitle line, optionally followed by its translation.
    pub fn subtitle(subtitle: &Subtitle, translation: Option<&str>) {
        let speaker = subtitle
            .speaker
            .as_deref()
            .map(|s| format!("{}: ", style(s).magenta()))
            .unwrap_or_default();
        println!(
            "{} {}{}",
            style(format!("[{}]", format_timestamp(subtitle.start_time_ms))).cyan(),
            speaker,
            subtitle.text
        );
        if let Some(t) = translation {
            println!("        {}", style(t).dim());
        }
    }

    /// Create a progress bar.
    pub fn progress_bar(len: u64, msg: &str) -> ProgressBar {
        let pb = ProgressBar::new(len);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb.set_message(msg.to_string());
        pb
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// First 12 hex characters, enough to pass back as a prefix.
pub fn short_fingerprint(fp: &str) -> &str {
    &fp[..fp.len().min(12)]
}

/// Truncate content with ellipsis, on a character boundary.
pub fn content_preview(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_chars {
        content
    } else {
        let cut: String = content.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_preview_multibyte() {
        assert_eq!(content_preview("short", 10), "short");
        assert_eq!(content_preview("你好世界", 2), "你好...");
        assert_eq!(content_preview("a\nb", 10), "a b");
    }

    #[test]
    fn test_short_fingerprint() {
        assert_eq!(short_fingerprint("abc"), "abc");
        assert_eq!(short_fingerprint(&"f".repeat(64)).len(), 12);
    }
}
