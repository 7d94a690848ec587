//! CLI command implementations.

mod config;
mod doctor;
mod evict;
mod export;
mod list;
mod locate;
mod select;
mod serve;
mod show;
mod speak;
mod summarize;
mod transcribe;
mod translate;

pub use config::run_config;
pub use doctor::run_doctor;
pub use evict::run_evict;
pub use export::run_export;
pub use list::run_list;
pub use locate::run_locate;
pub use select::run_select;
pub use serve::run_serve;
pub use show::run_show;
pub use speak::run_speak;
pub use summarize::run_summarize;
pub use transcribe::run_transcribe;
pub use translate::run_translate;

use crate::hashing::Fingerprint;
use crate::orchestrator::Orchestrator;
use anyhow::{anyhow, bail, Result};

/// Resolve a full fingerprint or a unique prefix of a processed one.
pub(crate) async fn resolve_fingerprint(orchestrator: &Orchestrator, input: &str) -> Result<Fingerprint> {
    if let Ok(fp) = input.parse::<Fingerprint>() {
        return Ok(fp);
    }

    let prefix = input.trim().to_ascii_lowercase();
    if prefix.is_empty() {
        bail!("Empty fingerprint");
    }

    let mut matches: Vec<Fingerprint> = orchestrator
        .list()
        .await?
        .into_iter()
        .map(|h| h.fingerprint)
        .filter(|fp| fp.as_str().starts_with(&prefix))
        .collect();

    match matches.len() {
        0 => Err(anyhow!(
            "No processed media matches '{}'. Use 'tekst list' to see processed media.",
            input
        )),
        1 => Ok(matches.remove(0)),
        n => Err(anyhow!("'{}' is ambiguous ({} matches); use a longer prefix", input, n)),
    }
}

/// Parse a playback time: plain milliseconds, `MM:SS` or `HH:MM:SS`, with
/// optional `.mmm` fraction on the seconds.
pub(crate) fn parse_time(input: &str) -> Result<u64> {
    let input = input.trim();
    if let Ok(ms) = input.parse::<u64>() {
        return Ok(ms);
    }

    let (clock, millis) = match input.split_once(['.', ',']) {
        Some((clock, frac)) => {
            let digits: String = frac.chars().chain("000".chars()).take(3).collect();
            (clock, digits.parse::<u64>().map_err(|_| anyhow!("Invalid time: {}", input))?)
        }
        None => (input, 0),
    };

    let parts = clock
        .split(':')
        .map(|p| p.parse::<u64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| anyhow!("Invalid time: {}", input))?;

    let seconds = match parts.as_slice() {
        [m, s] => m * 60 + s,
        [h, m, s] => h * 3600 + m * 60 + s,
        _ => bail!("Invalid time: {} (use ms, MM:SS or HH:MM:SS)", input),
    };
    Ok(seconds * 1000 + millis)
}

/// Build the orchestrator, surfacing library errors through anyhow.
pub(crate) fn open_orchestrator(settings: crate::config::Settings) -> Result<Orchestrator> {
    Ok(Orchestrator::new(settings)?)
}
