//! On-disk state: the media index and the per-fingerprint subtitle cache.
//!
//! Both live under the data directory and are written through a temp file
//! plus rename, so a crash never leaves a half-written file behind. A single
//! process per data directory is assumed.

mod index;
mod store;

pub use index::{MediaIndex, MediaIndexEntry};
pub use store::{CacheLookup, CacheStore};

use crate::error::Result;
use std::io::Write;
use std::path::Path;

/// File name of the media index inside the data directory.
pub const INDEX_FILE_NAME: &str = "audio_index.json";

/// Directory of cached records inside the data directory.
pub const SUBTITLE_DIR_NAME: &str = "subtitles";

/// Replace `path` with `bytes` atomically.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
