//! Directory-backed blob store.
//!
//! Every file lives directly in the root directory as `{identifier}{extension}`.
//! The directory is created on first write. Lookups list the directory on every
//! call; nothing is cached.

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, instrument};

use super::{BlobStore, ByteStream, StoredFile, is_valid_key, resolve_prefix, split_name};
use crate::errors::{Error, Result};

#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, file: &StoredFile) -> PathBuf {
        self.root.join(file.file_name())
    }

    /// Names of all regular files in the root. A missing root is treated as empty.
    async fn list_names(&self) -> Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }
        Ok(names)
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    #[instrument(skip(self, bytes), fields(size_bytes = bytes.len()), err)]
    async fn put(&self, id: &str, extension: &str, bytes: Bytes) -> Result<StoredFile> {
        tokio::fs::create_dir_all(&self.root).await?;

        let file = StoredFile {
            id: id.to_string(),
            extension: extension.to_string(),
            size_bytes: bytes.len() as u64,
        };

        // create_new: an identifier that already exists is never overwritten
        let mut handle = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.path_for(&file))
            .await?;
        handle.write_all(&bytes).await?;
        handle.flush().await?;

        debug!(path = %self.path_for(&file).display(), "Stored file");
        Ok(file)
    }

    #[instrument(skip(self), err(level = "debug"))]
    async fn find(&self, prefix: &str) -> Result<StoredFile> {
        if !is_valid_key(prefix) {
            return Err(Error::not_found(prefix));
        }

        let names = self.list_names().await?;
        let name = resolve_prefix(prefix, names.iter().map(String::as_str)).ok_or_else(|| Error::not_found(prefix))?;

        let metadata = tokio::fs::metadata(self.root.join(name)).await?;
        let (id, extension) = split_name(name);

        Ok(StoredFile {
            id: id.to_string(),
            extension: extension.to_string(),
            size_bytes: metadata.len(),
        })
    }

    async fn read(&self, file: &StoredFile) -> Result<Bytes> {
        match tokio::fs::read(self.path_for(file)).await {
            Ok(bytes) => Ok(Bytes::from(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::not_found(&file.id)),
            Err(e) => Err(e.into()),
        }
    }

    async fn open(&self, file: &StoredFile) -> Result<ByteStream> {
        let handle = match tokio::fs::File::open(self.path_for(file)).await {
            Ok(handle) => handle,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(Error::not_found(&file.id)),
            Err(e) => return Err(e.into()),
        };
        Ok(ReaderStream::new(handle).boxed())
    }

    async fn exists(&self, id: &str) -> Result<bool> {
        let names = self.list_names().await?;
        Ok(names.iter().any(|name| split_name(name).0 == id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_creates_root_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("uploads");
        let store = FsBlobStore::new(&root);

        assert!(!root.exists());
        store.put("abc", ".pdf", Bytes::from_static(b"%PDF")).await.unwrap();

        assert!(root.join("abc.pdf").is_file());
        assert_eq!(std::fs::read(root.join("abc.pdf")).unwrap(), b"%PDF");
    }

    #[tokio::test]
    async fn test_find_in_missing_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path().join("never-created"));

        let err = store.find("abc").await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
        assert!(!store.exists("abc").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_ignores_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("abc-dir")).unwrap();
        let store = FsBlobStore::new(dir.path());

        assert!(matches!(store.find("abc").await.unwrap_err(), Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_find_picks_up_files_written_externally() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("manual.pdf"), b"12345").unwrap();
        let store = FsBlobStore::new(dir.path());

        let file = store.find("manual").await.unwrap();
        assert_eq!(file.extension, ".pdf");
        assert_eq!(file.size_bytes, 5);
    }

    #[tokio::test]
    async fn test_traversal_keys_never_reach_disk() {
        let dir = tempfile::tempdir().unwrap();
        let inner = dir.path().join("uploads");
        std::fs::create_dir(&inner).unwrap();
        std::fs::write(dir.path().join("secret.txt"), b"nope").unwrap();
        let store = FsBlobStore::new(&inner);

        for key in ["../secret", "..", "/etc/passwd", ""] {
            assert!(matches!(store.find(key).await.unwrap_err(), Error::NotFound { .. }), "key {key:?}");
        }
    }
}
