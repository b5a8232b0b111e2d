//! Attachment blob storage.
//!
//! The engine stores only a `storage_key` per attachment; bytes live behind
//! this interface. The default implementation writes to a local directory
//! rooted at `STORAGE_ROOT`.

use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use tokio::fs;
use util::config;

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores the bytes under `key`, creating parent directories as needed.
    async fn put(&self, key: &str, bytes: &[u8]) -> io::Result<()>;

    /// Retrieves the bytes stored under `key`.
    async fn get(&self, key: &str) -> io::Result<Vec<u8>>;
}

/// Local-filesystem blob store rooted at `STORAGE_ROOT`.
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new() -> Self {
        Self {
            root: PathBuf::from(config::storage_root()),
        }
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl Default for LocalBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> io::Result<()> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, bytes).await
    }

    async fn get(&self, key: &str) -> io::Result<Vec<u8>> {
        fs::read(self.path_for(key)).await
    }
}

/// Allocates a storage key for a new attachment: a random prefix plus the
/// sanitized original filename, so keys never collide and stay readable.
pub fn allocate_key(filename: &str) -> String {
    let safe: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}/{safe}", uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::with_root(dir.path());

        let key = allocate_key("report.pdf");
        store.put(&key, b"hello").await.unwrap();
        assert_eq!(store.get(&key).await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn get_of_unknown_key_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::with_root(dir.path());
        assert!(store.get("nope/missing.bin").await.is_err());
    }

    #[test]
    fn allocate_key_sanitizes_the_filename() {
        let key = allocate_key("../../etc/passwd");
        assert!(!key[33..].contains('/'), "filename segment must not traverse: {key}");
        assert!(key.ends_with("passwd"));
    }
}
