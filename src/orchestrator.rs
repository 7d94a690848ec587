//! Pipeline orchestrator for Tekst.
//!
//! Coordinates hashing, the on-disk cache, transcription and translation
//! behind the operations an embedding application calls: `select`,
//! `transcribe`, `translate` and `evict`.

use crate::assist::Assistant;
use crate::cache::{CacheLookup, CacheStore, MediaIndex, MediaIndexEntry, INDEX_FILE_NAME, SUBTITLE_DIR_NAME};
use crate::config::{Credentials, Settings, TranscriptionBackend, TranslationBackend};
use crate::error::{Result, TekstError};
use crate::hashing::{hash_file, Fingerprint, TranslationTarget};
use crate::timeline::TranscriptTimeline;
use crate::transcript::{Subtitle, TranscriptRecord, Word};
use crate::transcription::TranscriptionOrchestrator;
use crate::translation::{create_translator, BatchOutcome, TranslationBatchEngine, TranslationItem, Translator};
use serde::Serialize;
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

/// Result of selecting a media file.
#[derive(Debug, Clone, Serialize)]
pub struct SelectResult {
    pub fingerprint: Fingerprint,
    /// The cached transcript, if this content was processed before.
    pub cached: Option<TranscriptRecord>,
}

/// Summary of one processed file.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub fingerprint: Fingerprint,
    #[serde(flatten)]
    pub entry: MediaIndexEntry,
    /// `None` when the cached record is missing or unusable.
    pub subtitles: Option<usize>,
    pub translated: usize,
    pub translator: Option<String>,
}

/// What is playing at one instant.
#[derive(Debug, Clone, Serialize)]
pub struct PlaybackPosition {
    pub time_ms: u64,
    pub subtitle_index: Option<usize>,
    pub subtitle: Option<Subtitle>,
    pub word: Option<Word>,
    pub translation: Option<String>,
}

/// The main orchestrator for the Tekst pipeline.
pub struct Orchestrator {
    settings: Settings,
    credentials: Credentials,
    store: CacheStore,
    index: Mutex<MediaIndex>,
    transcription: TranscriptionOrchestrator,
    engine: TranslationBatchEngine,
}

impl Orchestrator {
    /// Create an orchestrator rooted at the configured data directory.
    pub fn new(settings: Settings) -> Result<Self> {
        let credentials = Credentials::resolve(&settings.credentials);
        let transcription =
            TranscriptionOrchestrator::from_settings(&settings.transcription, &credentials);
        Self::with_components(settings, credentials, transcription)
    }

    /// Create an orchestrator with a custom transcription registry.
    pub fn with_components(
        settings: Settings,
        credentials: Credentials,
        transcription: TranscriptionOrchestrator,
    ) -> Result<Self> {
        let data_dir = settings.data_dir();
        std::fs::create_dir_all(&data_dir)?;

        let store = CacheStore::new(data_dir.join(SUBTITLE_DIR_NAME))?;
        let index = MediaIndex::open(data_dir.join(INDEX_FILE_NAME))?;
        let engine = TranslationBatchEngine::from_settings(&settings.translation);

        Ok(Self {
            settings,
            credentials,
            store,
            index: Mutex::new(index),
            transcription,
            engine,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Re-read the media index from disk.
    pub async fn reload(&self) -> Result<()> {
        self.index.lock().await.reload()
    }

    /// Fingerprint `path` and return the cached transcript, if any.
    ///
    /// Reselecting known content from a new path updates the stored path.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn select(&self, path: &Path) -> Result<SelectResult> {
        let fingerprint = hash_file(path).await?;
        let source_path = path.to_string_lossy().into_owned();

        let mut index = self.index.lock().await;
        let mut cached = self.load_locked(&mut index, &fingerprint)?;

        if let Some(record) = cached.as_mut() {
            if record.source_path != source_path {
                info!("Content {} moved to {}", fingerprint, source_path);
                record.source_path = source_path.clone();
                self.store.put(&fingerprint, record)?;
                index.set(
                    fingerprint.clone(),
                    MediaIndexEntry::new(source_path, CacheStore::locator(&fingerprint)),
                )?;
            }
        }

        Ok(SelectResult { fingerprint, cached })
    }

    /// Transcribe `path` and cache the result under `fingerprint`.
    ///
    /// `fingerprint` is the one returned by [`select`](Self::select) for the
    /// same file. Nothing is written unless transcription succeeds.
    #[instrument(skip(self), fields(path = %path.display(), fp = %fingerprint))]
    pub async fn transcribe(
        &self,
        path: &Path,
        fingerprint: &Fingerprint,
        backend: TranscriptionBackend,
    ) -> Result<TranscriptRecord> {
        let record = self.transcription.request(path, backend).await?;

        self.store.put(fingerprint, &record)?;
        self.index.lock().await.set(
            fingerprint.clone(),
            MediaIndexEntry::new(record.source_path.clone(), CacheStore::locator(fingerprint)),
        )?;

        info!("Cached transcript {} ({} subtitles)", fingerprint, record.subtitles.len());
        Ok(record)
    }

    /// Select `path` and transcribe it unless a cached transcript exists.
    ///
    /// Returns the fingerprint, the record and whether it came from cache.
    pub async fn process(
        &self,
        path: &Path,
        backend: TranscriptionBackend,
        force: bool,
    ) -> Result<(Fingerprint, TranscriptRecord, bool)> {
        let selected = self.select(path).await?;
        match selected.cached {
            Some(record) if !force => Ok((selected.fingerprint, record, true)),
            _ => {
                let record = self.transcribe(path, &selected.fingerprint, backend).await?;
                Ok((selected.fingerprint, record, false))
            }
        }
    }

    /// Translate with the configured adapter for `backend`.
    ///
    /// See [`translate_with`](Self::translate_with).
    pub async fn translate<P>(
        &self,
        target: &TranslationTarget,
        items: Option<Vec<TranslationItem>>,
        backend: TranslationBackend,
        only_missing: bool,
        on_progress: P,
    ) -> Result<BatchOutcome>
    where
        P: Fn(usize, &str) + Send + Sync,
    {
        let translator = create_translator(backend, &self.settings.translation, &self.credentials)?;
        self.translate_with(target, items, translator.as_ref(), only_missing, on_progress)
            .await
    }

    /// Translate items and, for a cached target, merge them into the record.
    ///
    /// For a cached target `items` defaults to every subtitle; with
    /// `only_missing` only items lacking a non-empty entry from the same
    /// translator are sent. Ad-hoc targets need explicit items and are never
    /// persisted.
    #[instrument(skip(self, items, translator, on_progress), fields(translator = %translator.tag()))]
    pub async fn translate_with<P>(
        &self,
        target: &TranslationTarget,
        items: Option<Vec<TranslationItem>>,
        translator: &dyn Translator,
        only_missing: bool,
        on_progress: P,
    ) -> Result<BatchOutcome>
    where
        P: Fn(usize, &str) + Send + Sync,
    {
        let fingerprint = match target {
            TranslationTarget::AdHoc => {
                let items = items.filter(|i| !i.is_empty()).ok_or_else(|| {
                    TekstError::InvalidInput("Ad-hoc translation needs at least one item".into())
                })?;
                return Ok(self.engine.translate(items, translator, on_progress).await);
            }
            TranslationTarget::Cached(fp) => fp,
        };

        let record = self.require(fingerprint).await?;
        let items = batch_items(&record, items, &translator.tag(), only_missing)?;

        if items.is_empty() {
            info!("Nothing left to translate for {}", fingerprint);
            return Ok(BatchOutcome::default());
        }

        let outcome = self.engine.translate(items, translator, on_progress).await;

        // The batch may have run for a while; merge into the latest copy.
        let mut record = self.require(fingerprint).await?;
        record.apply_translations(outcome.entries.clone());
        self.store.put(fingerprint, &record)?;
        info!(
            "Stored {} translations for {} ({} failed)",
            outcome.entries.len(),
            fingerprint,
            outcome.failed.len()
        );
        Ok(outcome)
    }

    /// Number of subtitles a cached-target [`translate`](Self::translate)
    /// with these arguments would send.
    pub async fn pending_translation_count(
        &self,
        fingerprint: &Fingerprint,
        backend: TranslationBackend,
        only_missing: bool,
    ) -> Result<usize> {
        let translator = create_translator(backend, &self.settings.translation, &self.credentials)?;
        let record = self.require(fingerprint).await?;
        Ok(batch_items(&record, None, &translator.tag(), only_missing)?.len())
    }

    /// Remove content from the index and the cache.
    #[instrument(skip(self), fields(fp = %fingerprint))]
    pub async fn evict(&self, fingerprint: &Fingerprint) -> Result<bool> {
        let mut index = self.index.lock().await;
        let existed = index.delete(fingerprint)?;
        self.store.delete(fingerprint)?;
        Ok(existed)
    }

    /// Load a cached transcript, self-healing the index if it is unusable.
    pub async fn load(&self, fingerprint: &Fingerprint) -> Result<Option<TranscriptRecord>> {
        let mut index = self.index.lock().await;
        self.load_locked(&mut index, fingerprint)
    }

    /// Like [`load`](Self::load) but absence is an error.
    pub async fn require(&self, fingerprint: &Fingerprint) -> Result<TranscriptRecord> {
        self.load(fingerprint)
            .await?
            .ok_or_else(|| TekstError::NotFound(format!("No cached transcript for {}", fingerprint)))
    }

    /// Every processed file, in fingerprint order.
    pub async fn list(&self) -> Result<Vec<HistoryEntry>> {
        let index = self.index.lock().await;
        let mut history = Vec::with_capacity(index.len());
        for (fingerprint, entry) in index.entries() {
            let record = self.store.get(fingerprint)?;
            history.push(HistoryEntry {
                fingerprint: fingerprint.clone(),
                entry: entry.clone(),
                subtitles: record.as_ref().map(|r| r.subtitles.len()),
                translated: record.as_ref().map(|r| r.translated_count()).unwrap_or(0),
                translator: record.as_ref().and_then(|r| r.translator_tag().map(String::from)),
            });
        }
        Ok(history)
    }

    /// Find the subtitle and word active at `time_ms`.
    pub async fn locate(&self, fingerprint: &Fingerprint, time_ms: u64) -> Result<PlaybackPosition> {
        let record = self.require(fingerprint).await?;
        let position = TranscriptTimeline::build(&record).locate(time_ms);

        Ok(PlaybackPosition {
            time_ms,
            subtitle_index: position.subtitle,
            subtitle: position.subtitle.map(|i| record.subtitles[i].clone()),
            word: position
                .word
                .map(|(s, w)| record.subtitles[s].words[w].clone()),
            translation: position
                .subtitle
                .and_then(|i| record.translations.get(&i))
                .filter(|t| !t.is_empty())
                .map(|t| t.text.clone()),
        })
    }

    /// Summarize a cached transcript in the configured target language.
    pub async fn summarize(&self, fingerprint: &Fingerprint) -> Result<String> {
        let assistant = Assistant::from_settings(&self.settings, &self.credentials)?;
        let record = self.require(fingerprint).await?;
        assistant
            .summarize(&record, &self.settings.translation.target_language_name)
            .await
    }

    fn load_locked(
        &self,
        index: &mut MediaIndex,
        fingerprint: &Fingerprint,
    ) -> Result<Option<TranscriptRecord>> {
        if !index.contains(fingerprint) {
            return Ok(None);
        }

        match self.store.lookup(fingerprint)? {
            CacheLookup::Hit(record) => Ok(Some(record)),
            CacheLookup::Missing => {
                warn!("Cached record for {} is missing; dropping index entry", fingerprint);
                index.delete(fingerprint)?;
                Ok(None)
            }
            CacheLookup::Corrupt(reason) => {
                warn!("Cached record for {} is corrupt ({}); dropping it", fingerprint, reason);
                index.delete(fingerprint)?;
                self.store.delete(fingerprint)?;
                Ok(None)
            }
        }
    }
}

/// Items for a cached-target batch: the given ones (range-checked) or every
/// subtitle, narrowed to the untranslated ones with `only_missing`.
fn batch_items(
    record: &TranscriptRecord,
    items: Option<Vec<TranslationItem>>,
    tag: &str,
    only_missing: bool,
) -> Result<Vec<TranslationItem>> {
    let items = match items {
        Some(items) => {
            if let Some(bad) = items.iter().find(|i| i.index >= record.subtitles.len()) {
                return Err(TekstError::InvalidInput(format!(
                    "Subtitle index {} out of range (transcript has {})",
                    bad.index,
                    record.subtitles.len()
                )));
            }
            items
        }
        None => record
            .subtitles
            .iter()
            .map(|s| TranslationItem::new(s.index, s.text.clone()))
            .collect(),
    };
    Ok(if only_missing {
        pending_items(record, items, tag)
    } else {
        items
    })
}

/// Keep items that still need a translation from translator `tag`.
fn pending_items(record: &TranscriptRecord, items: Vec<TranslationItem>, tag: &str) -> Vec<TranslationItem> {
    if record.translator_tag().is_some_and(|existing| existing != tag) {
        return items;
    }
    items
        .into_iter()
        .filter(|item| record.translations.get(&item.index).map_or(true, |t| t.is_empty()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcription::{RawTranscript, RawUtterance, RawWord, Transcriber};
    use crate::transcript::TranslationEntry;
    use async_trait::async_trait;
    use std::collections::{BTreeMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FakeTranscriber {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Transcriber for FakeTranscriber {
        async fn transcribe(&self, _media_path: &Path) -> Result<RawTranscript> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(RawTranscript {
                utterances: vec![
                    RawUtterance {
                        speaker: Some("A".into()),
                        start_ms: Some(0),
                        end_ms: Some(2000),
                        text: "hello world".into(),
                        words: vec![
                            RawWord { text: "hello".into(), start_ms: Some(0), end_ms: Some(900) },
                            RawWord { text: "world".into(), start_ms: Some(1000), end_ms: Some(2000) },
                        ],
                    },
                    RawUtterance {
                        speaker: Some("B".into()),
                        start_ms: Some(2500),
                        end_ms: Some(5000),
                        text: "second line".into(),
                        words: Vec::new(),
                    },
                ],
                timing_approximate: false,
            })
        }

        fn backend(&self) -> TranscriptionBackend {
            TranscriptionBackend::Whisper
        }
    }

    /// Prefixes text, failing on chosen inputs.
    struct FakeTranslator {
        tag: String,
        fail_on: HashSet<String>,
        seen: std::sync::Mutex<Vec<String>>,
    }

    impl FakeTranslator {
        fn new(tag: &str) -> Self {
            Self {
                tag: tag.to_string(),
                fail_on: HashSet::new(),
                seen: std::sync::Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Translator for FakeTranslator {
        async fn translate(&self, text: &str) -> Result<String> {
            self.seen.lock().unwrap().push(text.to_string());
            if self.fail_on.contains(text) {
                return Err(TekstError::AuthenticationFailed("rejected".into()));
            }
            Ok(format!("[{}] {}", self.tag, text))
        }

        fn tag(&self) -> String {
            self.tag.clone()
        }
    }

    struct Fixture {
        dir: tempfile::TempDir,
        orchestrator: Orchestrator,
        transcriber: Arc<FakeTranscriber>,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.general.data_dir = dir.path().join("data").to_string_lossy().into_owned();
        settings.translation.base_delay_ms = 1;

        let transcriber = Arc::new(FakeTranscriber { calls: AtomicUsize::new(0) });
        let mut transcription = TranscriptionOrchestrator::new();
        transcription.register(transcriber.clone());

        let orchestrator =
            Orchestrator::with_components(settings, Credentials::new(None, None), transcription).unwrap();
        Fixture { dir, orchestrator, transcriber }
    }

    fn media(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[tokio::test]
    async fn test_end_to_end_cache_by_content() {
        let f = fixture();
        let first = media(&f.dir, "talk.wav", b"five seconds of audio");

        let selected = f.orchestrator.select(&first).await.unwrap();
        assert!(selected.cached.is_none());

        let record = f
            .orchestrator
            .transcribe(&first, &selected.fingerprint, TranscriptionBackend::Whisper)
            .await
            .unwrap();
        assert!(!record.subtitles.is_empty());

        let moved = media(&f.dir, "renamed.mp3", b"five seconds of audio");
        let again = f.orchestrator.select(&moved).await.unwrap();
        assert_eq!(again.fingerprint, selected.fingerprint);

        let cached = again.cached.unwrap();
        assert_eq!(cached.source_path, moved.to_string_lossy());
        assert_eq!(cached.subtitles, record.subtitles);
        assert_eq!(cached.translations, record.translations);

        let history = f.orchestrator.list().await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].entry.source_path, moved.to_string_lossy());
        assert_eq!(f.transcriber.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_corrupt_record_self_heals() {
        let f = fixture();
        let path = media(&f.dir, "talk.wav", b"audio bytes");
        let (fp, _, _) = f
            .orchestrator
            .process(&path, TranscriptionBackend::Whisper, false)
            .await
            .unwrap();

        std::fs::write(f.orchestrator.store().path_for(&fp), b"{\"subtitles\": 5}").unwrap();

        let selected = f.orchestrator.select(&path).await.unwrap();
        assert!(selected.cached.is_none());
        assert!(f.orchestrator.list().await.unwrap().is_empty());

        // The index on disk agrees.
        f.orchestrator.reload().await.unwrap();
        assert!(f.orchestrator.load(&fp).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_record_self_heals() {
        let f = fixture();
        let path = media(&f.dir, "talk.wav", b"audio bytes");
        let (fp, _, _) = f
            .orchestrator
            .process(&path, TranscriptionBackend::Whisper, false)
            .await
            .unwrap();

        std::fs::remove_file(f.orchestrator.store().path_for(&fp)).unwrap();

        assert!(f.orchestrator.load(&fp).await.unwrap().is_none());
        assert!(f.orchestrator.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_process_uses_cache() {
        let f = fixture();
        let path = media(&f.dir, "talk.wav", b"audio bytes");

        let (_, _, cached) = f.orchestrator.process(&path, TranscriptionBackend::Whisper, false).await.unwrap();
        assert!(!cached);
        let (_, _, cached) = f.orchestrator.process(&path, TranscriptionBackend::Whisper, false).await.unwrap();
        assert!(cached);
        let (_, _, cached) = f.orchestrator.process(&path, TranscriptionBackend::Whisper, true).await.unwrap();
        assert!(!cached);
        assert_eq!(f.transcriber.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_transcription_caches_nothing() {
        let f = fixture();
        let path = media(&f.dir, "talk.wav", b"audio bytes");
        let selected = f.orchestrator.select(&path).await.unwrap();

        let err = f
            .orchestrator
            .transcribe(&path, &selected.fingerprint, TranscriptionBackend::AssemblyAi)
            .await
            .unwrap_err();
        assert!(matches!(err, TekstError::Config(_)));
        assert!(f.orchestrator.list().await.unwrap().is_empty());
        assert!(!f.orchestrator.store().path_for(&selected.fingerprint).exists());
    }

    #[tokio::test]
    async fn test_evict() {
        let f = fixture();
        let path = media(&f.dir, "talk.wav", b"audio bytes");
        let (fp, _, _) = f.orchestrator.process(&path, TranscriptionBackend::Whisper, false).await.unwrap();

        assert!(f.orchestrator.evict(&fp).await.unwrap());
        assert!(!f.orchestrator.store().path_for(&fp).exists());
        assert!(f.orchestrator.select(&path).await.unwrap().cached.is_none());
        assert!(!f.orchestrator.evict(&fp).await.unwrap());
    }

    #[tokio::test]
    async fn test_translate_persists_into_record() {
        let f = fixture();
        let path = media(&f.dir, "talk.wav", b"audio bytes");
        let (fp, _, _) = f.orchestrator.process(&path, TranscriptionBackend::Whisper, false).await.unwrap();
        let translator = FakeTranslator::new("fake:a");
        let progress = AtomicUsize::new(0);

        let outcome = f
            .orchestrator
            .translate_with(&TranslationTarget::Cached(fp.clone()), None, &translator, false, |_, _| {
                progress.fetch_add(1, Ordering::SeqCst);
            })
            .await
            .unwrap();
        assert_eq!(outcome.entries.len(), 2);
        assert_eq!(progress.load(Ordering::SeqCst), 2);

        let record = f.orchestrator.load(&fp).await.unwrap().unwrap();
        assert_eq!(record.translations[&0].text, "[fake:a] hello world");
        assert_eq!(record.translator_tag(), Some("fake:a"));
    }

    #[tokio::test]
    async fn test_only_missing_retries_failed_items() {
        let f = fixture();
        let path = media(&f.dir, "talk.wav", b"audio bytes");
        let (fp, _, _) = f.orchestrator.process(&path, TranscriptionBackend::Whisper, false).await.unwrap();
        let target = TranslationTarget::Cached(fp.clone());

        let mut flaky = FakeTranslator::new("fake:a");
        flaky.fail_on.insert("second line".to_string());
        let outcome = f.orchestrator.translate_with(&target, None, &flaky, false, |_, _| {}).await.unwrap();
        assert_eq!(outcome.failed, vec![1]);

        let steady = FakeTranslator::new("fake:a");
        let outcome = f.orchestrator.translate_with(&target, None, &steady, true, |_, _| {}).await.unwrap();
        assert_eq!(outcome.entries.keys().copied().collect::<Vec<_>>(), vec![1]);
        assert_eq!(*steady.seen.lock().unwrap(), vec!["second line".to_string()]);

        let record = f.orchestrator.load(&fp).await.unwrap().unwrap();
        assert_eq!(record.translated_count(), 2);
    }

    #[tokio::test]
    async fn test_pending_translation_count() {
        let f = fixture();
        let path = media(&f.dir, "talk.wav", b"audio bytes");
        let (fp, _, _) = f.orchestrator.process(&path, TranscriptionBackend::Whisper, false).await.unwrap();
        let google = TranslationBackend::Google;
        assert_eq!(f.orchestrator.pending_translation_count(&fp, google, true).await.unwrap(), 2);

        let mut record = f.orchestrator.load(&fp).await.unwrap().unwrap();
        record.apply_translations(BTreeMap::from([(0, TranslationEntry::new("hallo", "google"))]));
        f.orchestrator.store().put(&fp, &record).unwrap();

        assert_eq!(f.orchestrator.pending_translation_count(&fp, google, true).await.unwrap(), 1);
        assert_eq!(f.orchestrator.pending_translation_count(&fp, google, false).await.unwrap(), 2);
        assert_eq!(
            f.orchestrator
                .pending_translation_count(&fp, TranslationBackend::Ollama, true)
                .await
                .unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn test_new_translator_replaces_old_translations() {
        let f = fixture();
        let path = media(&f.dir, "talk.wav", b"audio bytes");
        let (fp, _, _) = f.orchestrator.process(&path, TranscriptionBackend::Whisper, false).await.unwrap();
        let target = TranslationTarget::Cached(fp.clone());

        f.orchestrator
            .translate_with(&target, None, &FakeTranslator::new("fake:a"), false, |_, _| {})
            .await
            .unwrap();
        let only_first = vec![TranslationItem::new(0, "hello world")];
        f.orchestrator
            .translate_with(&target, Some(only_first), &FakeTranslator::new("fake:b"), false, |_, _| {})
            .await
            .unwrap();

        let record = f.orchestrator.load(&fp).await.unwrap().unwrap();
        let expected: BTreeMap<usize, TranslationEntry> =
            [(0, TranslationEntry::new("[fake:b] hello world", "fake:b"))].into_iter().collect();
        assert_eq!(record.translations, expected);
    }

    #[tokio::test]
    async fn test_failing_translator_keeps_previous_translations() {
        let f = fixture();
        let path = media(&f.dir, "talk.wav", b"audio bytes");
        let (fp, _, _) = f.orchestrator.process(&path, TranscriptionBackend::Whisper, false).await.unwrap();
        let target = TranslationTarget::Cached(fp.clone());

        f.orchestrator
            .translate_with(&target, None, &FakeTranslator::new("fake:a"), false, |_, _| {})
            .await
            .unwrap();
        let before = f.orchestrator.load(&fp).await.unwrap().unwrap().translations;

        let mut dead = FakeTranslator::new("fake:b");
        dead.fail_on.extend(["hello world".to_string(), "second line".to_string()]);
        let outcome = f.orchestrator.translate_with(&target, None, &dead, false, |_, _| {}).await.unwrap();
        assert_eq!(outcome.failed, vec![0, 1]);

        let record = f.orchestrator.load(&fp).await.unwrap().unwrap();
        assert_eq!(record.translations, before);
        assert_eq!(record.translated_count(), 2);
    }

    #[tokio::test]
    async fn test_adhoc_translation_is_not_persisted() {
        let f = fixture();
        let translator = FakeTranslator::new("fake:a");
        let outcome = f
            .orchestrator
            .translate_with(
                &TranslationTarget::AdHoc,
                Some(vec![TranslationItem::new(0, "word")]),
                &translator,
                false,
                |_, _| {},
            )
            .await
            .unwrap();
        assert_eq!(outcome.entries[&0].text, "[fake:a] word");
        assert!(f.orchestrator.list().await.unwrap().is_empty());

        let err = f
            .orchestrator
            .translate_with(&TranslationTarget::AdHoc, None, &translator, false, |_, _| {})
            .await
            .unwrap_err();
        assert!(matches!(err, TekstError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_translate_rejects_unknown_or_out_of_range() {
        let f = fixture();
        let translator = FakeTranslator::new("fake:a");
        let unknown = TranslationTarget::Cached(Fingerprint::of_bytes(b"never seen"));
        let err = f.orchestrator.translate_with(&unknown, None, &translator, false, |_, _| {}).await.unwrap_err();
        assert!(matches!(err, TekstError::NotFound(_)));

        let path = media(&f.dir, "talk.wav", b"audio bytes");
        let (fp, _, _) = f.orchestrator.process(&path, TranscriptionBackend::Whisper, false).await.unwrap();
        let items = Some(vec![TranslationItem::new(9, "nope")]);
        let err = f
            .orchestrator
            .translate_with(&TranslationTarget::Cached(fp), items, &translator, false, |_, _| {})
            .await
            .unwrap_err();
        assert!(matches!(err, TekstError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_translate_without_key_fails_fast() {
        let f = fixture();
        let err = f
            .orchestrator
            .translate(
                &TranslationTarget::AdHoc,
                Some(vec![TranslationItem::new(0, "word")]),
                TranslationBackend::SiliconCloud,
                false,
                |_, _| {},
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TekstError::Config(_)));
    }

    #[tokio::test]
    async fn test_locate() {
        let f = fixture();
        let path = media(&f.dir, "talk.wav", b"audio bytes");
        let (fp, _, _) = f.orchestrator.process(&path, TranscriptionBackend::Whisper, false).await.unwrap();

        let at = f.orchestrator.locate(&fp, 1200).await.unwrap();
        assert_eq!(at.subtitle_index, Some(0));
        assert_eq!(at.word.map(|w| w.text), Some("world".to_string()));

        let gap = f.orchestrator.locate(&fp, 2200).await.unwrap();
        assert!(gap.subtitle.is_none());
    }
}
