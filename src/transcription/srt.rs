//! SRT caption parsing.

use super::{RawUtterance, RawWord};
use regex::Regex;
use std::sync::OnceLock;
use tracing::warn;

fn timecode_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(\d{1,2}):(\d{2}):(\d{2})[,.](\d{3})\s*-->\s*(\d{1,2}):(\d{2}):(\d{2})[,.](\d{3})",
        )
        .expect("timecode pattern is valid")
    })
}

fn to_ms(caps: &regex::Captures<'_>, first: usize) -> u64 {
    let field = |i: usize| caps[first + i].parse::<u64>().unwrap_or(0);
    field(0) * 3_600_000 + field(1) * 60_000 + field(2) * 1_000 + field(3)
}

/// Parse SRT text into utterances with evenly spread word timing.
///
/// Blocks without a timecode line or without text are skipped.
pub fn parse_srt(content: &str) -> Vec<RawUtterance> {
    let normalized = content.replace("\r\n", "\n");
    let mut utterances = Vec::new();

    for block in normalized.split("\n\n").map(str::trim).filter(|b| !b.is_empty()) {
        let mut lines = block.lines();
        let caps = match lines.by_ref().find_map(|line| timecode_pattern().captures(line)) {
            Some(caps) => caps,
            None => {
                warn!("Skipping SRT block without timecode: {:?}", block);
                continue;
            }
        };
        let start_ms = to_ms(&caps, 1);
        let end_ms = to_ms(&caps, 5).max(start_ms);

        let text = lines
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if text.is_empty() {
            continue;
        }

        let words = spread_words(&text, start_ms, end_ms);
        utterances.push(RawUtterance {
            speaker: None,
            start_ms: Some(start_ms),
            end_ms: Some(end_ms),
            text,
            words,
        });
    }

    utterances
}

/// Divide `[start_ms, end_ms]` evenly across the whitespace-split tokens.
fn spread_words(text: &str, start_ms: u64, end_ms: u64) -> Vec<RawWord> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let n = tokens.len() as u64;
    let span = end_ms - start_ms;

    tokens
        .into_iter()
        .enumerate()
        .map(|(i, token)| {
            let i = i as u64;
            RawWord {
                text: token.to_string(),
                start_ms: Some(start_ms + span * i / n),
                end_ms: Some(start_ms + span * (i + 1) / n),
            }
        })
        .collect()
}
