//! Summarize command implementation.

use super::{open_orchestrator, resolve_fingerprint};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the summarize command.
pub async fn run_summarize(fingerprint: &str, settings: Settings) -> Result<()> {
    let orchestrator = open_orchestrator(settings)?;
    let fp = resolve_fingerprint(&orchestrator, fingerprint).await?;

    let spinner = Output::spinner("Summarizing...");
    let summary = orchestrator.summarize(&fp).await;
    spinner.finish_and_clear();

    println!("{}", summary?);
    Ok(())
}
