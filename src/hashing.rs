//! Content fingerprints.
//!
//! A media file is identified by the SHA-256 digest of its bytes, never by its
//! path. The file is streamed through the hasher in fixed-size blocks.

use crate::error::{Result, TekstError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::io::AsyncReadExt;
use tracing::{debug, instrument};

const READ_BLOCK_SIZE: usize = 64 * 1024;

/// Reserved value naming translations that belong to no cached transcript.
pub const AD_HOC_SENTINEL: &str = "adhoc";

/// Hex-encoded SHA-256 digest of a file's full content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Length of the hex digest.
    pub const LEN: usize = 64;

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Digest an in-memory buffer.
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(bytes)))
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Fingerprint {
    type Err = TekstError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        if s.len() == Self::LEN && s.bytes().all(|b| b.is_ascii_hexdigit()) {
            Ok(Self(s))
        } else {
            Err(TekstError::InvalidInput(format!("not a fingerprint: {}", s)))
        }
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = TekstError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Fingerprint> for String {
    fn from(fp: Fingerprint) -> Self {
        fp.0
    }
}

/// Where translation results should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationTarget {
    /// Write back into the cached record for this content.
    Cached(Fingerprint),
    /// One-off lookup, never persisted.
    AdHoc,
}

impl std::str::FromStr for TranslationTarget {
    type Err = TekstError;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case(AD_HOC_SENTINEL) {
            Ok(TranslationTarget::AdHoc)
        } else {
            Ok(TranslationTarget::Cached(s.parse()?))
        }
    }
}

/// Compute the fingerprint of a file by streaming its content.
#[instrument(fields(path = %path.display()))]
pub async fn hash_file(path: &Path) -> Result<Fingerprint> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; READ_BLOCK_SIZE];
    let mut total: u64 = 0;

    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        total += n as u64;
    }

    let fp = Fingerprint(hex::encode(hasher.finalize()));
    debug!("Hashed {} bytes -> {}", total, fp);
    Ok(fp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_hash_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.mp3");
        std::fs::write(&path, b"some audio bytes").unwrap();

        let first = hash_file(&path).await.unwrap();
        let second = hash_file(&path).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first, Fingerprint::of_bytes(b"some audio bytes"));
        assert_eq!(first.as_str().len(), Fingerprint::LEN);
    }

    #[tokio::test]
    async fn test_hash_ignores_path() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.wav");
        let b = dir.path().join("nested-b.wav");
        std::fs::write(&a, b"same").unwrap();
        std::fs::write(&b, b"same").unwrap();
        assert_eq!(hash_file(&a).await.unwrap(), hash_file(&b).await.unwrap());

        std::fs::write(&b, b"different").unwrap();
        assert_ne!(hash_file(&a).await.unwrap(), hash_file(&b).await.unwrap());
    }

    #[tokio::test]
    async fn test_hash_spans_multiple_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.flac");
        let data: Vec<u8> = (0..(READ_BLOCK_SIZE * 3 + 17)).map(|i| (i % 251) as u8).collect();
        std::fs::File::create(&path).unwrap().write_all(&data).unwrap();

        assert_eq!(hash_file(&path).await.unwrap(), Fingerprint::of_bytes(&data));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let err = hash_file(Path::new("/definitely/not/here.mp3")).await.unwrap_err();
        assert!(matches!(err, TekstError::Io(_)));
    }

    #[test]
    fn test_known_digest() {
        assert_eq!(
            Fingerprint::of_bytes(b"").as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_translation_target_parsing() {
        assert_eq!("adhoc".parse::<TranslationTarget>().unwrap(), TranslationTarget::AdHoc);
        let fp = Fingerprint::of_bytes(b"x");
        assert_eq!(
            fp.as_str().parse::<TranslationTarget>().unwrap(),
            TranslationTarget::Cached(fp)
        );
        assert!("not-hex".parse::<TranslationTarget>().is_err());
    }
}
