//! Evict command implementation.

use super::{open_orchestrator, resolve_fingerprint};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the evict command.
pub async fn run_evict(fingerprint: &str, settings: Settings) -> Result<()> {
    let orchestrator = open_orchestrator(settings)?;
    let fp = resolve_fingerprint(&orchestrator, fingerprint).await?;

    if orchestrator.evict(&fp).await? {
        Output::success(&format!("Evicted {}", fp));
    } else {
        Output::warning(&format!("{} was not in the index", fp));
    }

    Ok(())
}
