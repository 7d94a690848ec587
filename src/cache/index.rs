//! The media index: which content has been processed, and where it lives.

use super::write_atomic;
use crate::error::Result;
use crate::hashing::Fingerprint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One processed media file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaIndexEntry {
    /// Last path the content was selected from.
    #[serde(alias = "file_path")]
    pub source_path: String,
    /// File name of the cached record inside the subtitle directory.
    #[serde(alias = "subtitle_file")]
    pub cache_locator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl MediaIndexEntry {
    pub fn new(source_path: impl Into<String>, cache_locator: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            cache_locator: cache_locator.into(),
            updated_at: Some(Utc::now()),
        }
    }
}

/// In-memory mirror of the index file with an explicit load/persist lifecycle.
#[derive(Debug)]
pub struct MediaIndex {
    path: PathBuf,
    entries: BTreeMap<Fingerprint, MediaIndexEntry>,
}

impl MediaIndex {
    /// Open the index at `path`, starting empty when the file is absent.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = Self::load(&path)?;
        debug!("Loaded media index with {} entries", entries.len());
        Ok(Self { path, entries })
    }

    /// Read the index file.
    ///
    /// Keys that are not fingerprints (for example digests from an older
    /// scheme) are skipped with a warning; the remaining entries load. A file
    /// that is not a JSON object at all is moved aside to `<name>.corrupt` and
    /// an empty index is returned.
    pub fn load(path: &Path) -> Result<BTreeMap<Fingerprint, MediaIndexEntry>> {
        let content = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };

        let raw: BTreeMap<String, serde_json::Value> = match serde_json::from_slice(&content) {
            Ok(raw) => raw,
            Err(e) => {
                let aside = path.with_extension("json.corrupt");
                warn!(
                    "Media index {} is unparsable ({}), moving it to {}",
                    path.display(),
                    e,
                    aside.display()
                );
                std::fs::rename(path, &aside)?;
                return Ok(BTreeMap::new());
            }
        };

        let mut entries = BTreeMap::new();
        for (key, value) in raw {
            let fp = match key.parse::<Fingerprint>() {
                Ok(fp) => fp,
                Err(_) => {
                    warn!("Skipping media index key {}: not a fingerprint", key);
                    continue;
                }
            };
            match serde_json::from_value::<MediaIndexEntry>(value) {
                Ok(entry) => {
                    entries.insert(fp, entry);
                }
                Err(e) => warn!("Skipping media index entry {}: {}", key, e),
            }
        }
        Ok(entries)
    }

    /// Discard in-memory state and re-read the file.
    pub fn reload(&mut self) -> Result<()> {
        self.entries = Self::load(&self.path)?;
        Ok(())
    }

    /// Persist the current state.
    pub fn save(&self) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(&self.entries)?;
        write_atomic(&self.path, &bytes)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, fp: &Fingerprint) -> Option<&MediaIndexEntry> {
        self.entries.get(fp)
    }

    pub fn contains(&self, fp: &Fingerprint) -> bool {
        self.entries.contains_key(fp)
    }

    /// Insert or replace an entry and persist.
    pub fn set(&mut self, fp: Fingerprint, entry: MediaIndexEntry) -> Result<()> {
        self.entries.insert(fp, entry);
        self.save()
    }

    /// Remove an entry and persist. Returns whether it existed.
    pub fn delete(&mut self, fp: &Fingerprint) -> Result<bool> {
        if self.entries.remove(fp).is_some() {
            info!("Removed {} from media index", fp);
            self.save()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = (&Fingerprint, &MediaIndexEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
