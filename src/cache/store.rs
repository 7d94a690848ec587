//! Subtitle cache: one JSON record per content fingerprint.

use super::write_atomic;
use crate::error::{Result, TekstError};
use crate::hashing::Fingerprint;
use crate::transcript::{validate_record, TranscriptRecord};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, warn};

/// Outcome of reading a cache file.
#[derive(Debug)]
pub enum CacheLookup {
    Hit(TranscriptRecord),
    Missing,
    /// The file exists but cannot be used; carries the reason.
    Corrupt(String),
}

impl CacheLookup {
    pub fn into_record(self) -> Option<TranscriptRecord> {
        match self {
            CacheLookup::Hit(record) => Some(record),
            CacheLookup::Missing | CacheLookup::Corrupt(_) => None,
        }
    }
}

/// Filesystem-backed store of [`TranscriptRecord`]s.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    /// Open (creating if needed) the cache directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name used for a fingerprint, as recorded in the media index.
    pub fn locator(fp: &Fingerprint) -> String {
        format!("{}.json", fp)
    }

    pub fn path_for(&self, fp: &Fingerprint) -> PathBuf {
        self.dir.join(Self::locator(fp))
    }

    /// Read a record. Unreadable or invalid content is reported as corrupt.
    #[instrument(skip(self), fields(fp = %fp))]
    pub fn lookup(&self, fp: &Fingerprint) -> Result<CacheLookup> {
        let path = self.path_for(fp);
        let content = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No cached record");
                return Ok(CacheLookup::Missing);
            }
            Err(e) => return Err(e.into()),
        };

        let mut record: TranscriptRecord = match serde_json::from_slice(&content) {
            Ok(record) => record,
            Err(e) => {
                warn!("Cached record is unparsable: {}", e);
                return Ok(CacheLookup::Corrupt(e.to_string()));
            }
        };
        record.renumber();

        if let Err(e) = validate_record(&record) {
            warn!("Cached record fails validation: {}", e);
            return Ok(CacheLookup::Corrupt(e.to_string()));
        }

        Ok(CacheLookup::Hit(record))
    }

    /// Read a record, treating corrupt content as absent.
    pub fn get(&self, fp: &Fingerprint) -> Result<Option<TranscriptRecord>> {
        Ok(self.lookup(fp)?.into_record())
    }

    /// Validate and persist a record.
    ///
    /// An invalid record is rejected before anything touches the disk, so a
    /// previously cached value stays intact.
    #[instrument(skip(self, record), fields(fp = %fp, subtitles = record.subtitles.len()))]
    pub fn put(&self, fp: &Fingerprint, record: &TranscriptRecord) -> Result<()> {
        validate_record(record)?;
        let bytes = serde_json::to_vec_pretty(record)?;
        write_atomic(&self.path_for(fp), &bytes)?;
        debug!("Cached record ({} bytes)", bytes.len());
        Ok(())
    }

    /// Remove a record. Removing a missing record succeeds.
    pub fn delete(&self, fp: &Fingerprint) -> Result<()> {
        match std::fs::remove_file(self.path_for(fp)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TekstError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{Subtitle, TranslationEntry, Word};

    fn fp(seed: &str) -> Fingerprint {
        Fingerprint::of_bytes(seed.as_bytes())
    }

    fn sample_record() -> TranscriptRecord {
        let mut record = TranscriptRecord::new(
            vec![
                Subtitle::new(
                    Some("A".into()),
                    0,
                    1200,
                    "Good morning",
                    vec![Word::new("Good", 0, 500), Word::new("morning", 500, 1200)],
                ),
                Subtitle::new(Some("B".into()), 1300, 2000, "Hi", vec![Word::new("Hi", 1300, 2000)]),
            ],
            "/podcasts/ep1.mp3",
        );
        record.translations.insert(1, TranslationEntry::new("嗨", "google"));
        record
    }

    #[test]
    fn test_put_get_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("subtitles")).unwrap();
        let record = sample_record();

        store.put(&fp("a"), &record).unwrap();
        assert_eq!(store.get(&fp("a")).unwrap(), Some(record));
    }

    #[test]
    fn test_missing_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path()).unwrap();
        assert!(matches!(store.lookup(&fp("nothing")).unwrap(), CacheLookup::Missing));
        assert_eq!(store.get(&fp("nothing")).unwrap(), None);
    }

    #[test]
    fn test_corrupt_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path()).unwrap();

        std::fs::write(store.path_for(&fp("bad")), "{ not json").unwrap();
        assert!(matches!(store.lookup(&fp("bad")).unwrap(), CacheLookup::Corrupt(_)));

        std::fs::write(store.path_for(&fp("bad")), r#"{"subtitles": 5, "file_path": "x"}"#).unwrap();
        assert_eq!(store.get(&fp("bad")).unwrap(), None);

        std::fs::write(
            store.path_for(&fp("bad")),
            r#"{"subtitles": [{"start_time": 900, "end_time": 100, "text": "x", "words": []}], "file_path": "x"}"#,
        )
        .unwrap();
        assert_eq!(store.get(&fp("bad")).unwrap(), None);
    }

    #[test]
    fn test_reads_original_layout() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path()).unwrap();
        std::fs::write(
            store.path_for(&fp("legacy")),
            r#"{
                "subtitles": [
                    {"speaker": "A", "start_time": 0, "end_time": 800, "text": "Hello",
                     "words": [{"text": "Hello", "start": 0, "end": 800}]}
                ],
                "translations": {"0": {"text": "你好", "translator": "silicon_cloud"}},
                "file_path": "/old/path.mp3"
            }"#,
        )
        .unwrap();

        let record = store.get(&fp("legacy")).unwrap().unwrap();
        assert_eq!(record.subtitles[0].speaker.as_deref(), Some("A"));
        assert_eq!(record.translations[&0].translator_tag, "silicon_cloud");
        assert!(!record.timing_approximate);
    }

    #[test]
    fn test_invalid_put_keeps_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path()).unwrap();
        let good = sample_record();
        store.put(&fp("a"), &good).unwrap();

        let mut bad = good.clone();
        bad.subtitles[0].words[1].end_time_ms = 99_999;
        assert!(matches!(store.put(&fp("a"), &bad), Err(TekstError::Validation(_))));

        assert_eq!(store.get(&fp("a")).unwrap(), Some(good));
    }

    #[test]
    fn test_delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path()).unwrap();
        store.put(&fp("a"), &sample_record()).unwrap();

        store.delete(&fp("a")).unwrap();
        store.delete(&fp("a")).unwrap();
        assert_eq!(store.get(&fp("a")).unwrap(), None);
    }
}
