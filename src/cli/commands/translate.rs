//! Translate command implementation.

use super::{open_orchestrator, resolve_fingerprint};
use crate::cli::{content_preview, Output};
use crate::config::{Settings, TranslationBackend};
use crate::hashing::TranslationTarget;
use crate::translation::TranslationItem;
use anyhow::Result;

/// Run the translate command.
pub async fn run_translate(
    fingerprint: Option<&str>,
    adhoc: Option<&str>,
    backend: Option<&str>,
    only_missing: bool,
    concurrency: Option<usize>,
    mut settings: Settings,
) -> Result<()> {
    let backend: TranslationBackend = match backend {
        Some(name) => name.parse().map_err(anyhow::Error::msg)?,
        None => settings.translation.backend,
    };
    if let Some(n) = concurrency {
        settings.translation.concurrency = n;
    }

    let orchestrator = open_orchestrator(settings)?;

    if let Some(text) = adhoc {
        let outcome = orchestrator
            .translate(
                &TranslationTarget::AdHoc,
                Some(vec![TranslationItem::new(0, text)]),
                backend,
                false,
                |_, _| {},
            )
            .await?;
        match outcome.entries.get(&0).filter(|e| !e.is_empty()) {
            Some(entry) => println!("{}", entry.text),
            None => {
                Output::error("Translation failed after all retries.");
                anyhow::bail!("translation failed");
            }
        }
        return Ok(());
    }

    let input = fingerprint.ok_or_else(|| anyhow::anyhow!("A fingerprint or --adhoc is required"))?;
    let fp = resolve_fingerprint(&orchestrator, input).await?;
    let pending = orchestrator
        .pending_translation_count(&fp, backend, only_missing)
        .await?;
    if pending == 0 {
        Output::success("Nothing to translate; every subtitle already has a translation.");
        return Ok(());
    }

    let pb = Output::progress_bar(pending as u64, &format!("Translating with {}", backend));
    let outcome = orchestrator
        .translate(
            &TranslationTarget::Cached(fp.clone()),
            None,
            backend,
            only_missing,
            |done, text| {
                pb.set_position(done as u64);
                pb.set_message(content_preview(text, 40));
            },
        )
        .await;
    pb.finish_and_clear();
    let outcome = outcome?;

    if outcome.entries.is_empty() {
        Output::success("Nothing to translate; every subtitle already has a translation.");
        return Ok(());
    }

    let succeeded = outcome.entries.len() - outcome.failed.len();
    Output::success(&format!("Translated {} subtitles with {}", succeeded, backend));
    if !outcome.failed.is_empty() {
        Output::warning(&format!(
            "{} subtitles failed. Run again with --only-missing to retry them.",
            outcome.failed.len()
        ));
    }

    Ok(())
}
