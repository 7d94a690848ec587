//! Bounded-concurrency batch translation.

use super::{TranslationItem, Translator};
use crate::config::TranslationSettings;
use crate::retry::RetryPolicy;
use crate::transcript::TranslationEntry;
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, instrument, warn};

/// Result of one batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    /// One entry per input item, keyed by the item's index. Items that
    /// exhausted their retries carry empty text.
    pub entries: BTreeMap<usize, TranslationEntry>,
    /// Indices whose translation failed, ascending.
    pub failed: Vec<usize>,
}

impl BatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Executes translation items against one backend.
#[derive(Debug, Clone)]
pub struct TranslationBatchEngine {
    concurrency: usize,
    policy: RetryPolicy,
}

impl TranslationBatchEngine {
    pub fn new(concurrency: usize, policy: RetryPolicy) -> Self {
        Self {
            concurrency: concurrency.max(1),
            policy,
        }
    }

    pub fn from_settings(settings: &TranslationSettings) -> Self {
        Self::new(
            settings.concurrency,
            RetryPolicy {
                max_attempts: settings.max_attempts,
                base_delay: settings.base_delay(),
                timeout: settings.request_timeout(),
            },
        )
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Translate every item.
    ///
    /// Items are dispatched in input order with at most `concurrency`
    /// requests in flight and may complete in any order. `on_progress`
    /// receives the running completion count and the item's translated text
    /// after every item, whether it succeeded or failed. A failing item never
    /// aborts the batch.
    #[instrument(skip_all, fields(items = items.len(), translator = %translator.tag()))]
    pub async fn translate<P>(
        &self,
        items: Vec<TranslationItem>,
        translator: &dyn Translator,
        on_progress: P,
    ) -> BatchOutcome
    where
        P: Fn(usize, &str) + Send + Sync,
    {
        let tag = translator.tag();
        let total = items.len();
        let completed = AtomicUsize::new(0);
        info!("Translating {} items with {} (concurrency {})", total, tag, self.concurrency);

        let results: Vec<(usize, Option<String>)> = stream::iter(items)
            .map(|item| {
                let completed = &completed;
                let on_progress = &on_progress;
                async move {
                    let result = self.translate_one(&item, translator).await;
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    on_progress(done, result.as_deref().unwrap_or(""));
                    (item.index, result)
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut outcome = BatchOutcome::default();
        for (index, result) in results {
            if result.is_none() {
                outcome.failed.push(index);
            }
            outcome
                .entries
                .insert(index, TranslationEntry::new(result.unwrap_or_default(), tag.clone()));
        }
        outcome.failed.sort_unstable();

        info!(
            "Translated {}/{} items ({} failed)",
            total - outcome.failed.len(),
            total,
            outcome.failed.len()
        );
        outcome
    }

    /// Translate one item with retries; `None` once attempts are exhausted.
    async fn translate_one(&self, item: &TranslationItem, translator: &dyn Translator) -> Option<String> {
        if item.text.trim().is_empty() {
            return Some(String::new());
        }

        let label = format!("Translation of item {}", item.index);
        match self
            .policy
            .run(&label, |_| translator.translate(&item.text))
            .await
        {
            Ok(text) => {
                debug!("Item {} translated", item.index);
                Some(text.trim().to_string())
            }
            Err(e) => {
                warn!("Item {} failed permanently: {}", item.index, e);
                None
            }
        }
    }
}
