//! Blob storage for uploaded files.
//!
//! A [`BlobStore`] maps identifiers to file bytes. Stored names are
//! `{identifier}{extension}` (e.g. `0b5c…e1.pdf`), and lookups are by identifier
//! prefix, since callers only ever hold the identifier and not the extension.
//!
//! Two backends are provided:
//!
//! - [`filesystem::FsBlobStore`]: one flat directory, no sidecar files
//! - [`in_memory::MemoryBlobStore`]: a concurrent map, lost on restart
//!
//! Both share the prefix resolution rules in [`resolve_prefix`], so lookup is
//! deterministic regardless of backend or directory listing order.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use std::path::Path;

use crate::errors::Result;

pub mod filesystem;
pub mod identifier;
pub mod in_memory;

#[cfg(test)]
mod tests;

pub use filesystem::FsBlobStore;
pub use in_memory::MemoryBlobStore;

/// Longest extension (without the dot) that is kept from an uploaded filename.
const MAX_EXTENSION_LEN: usize = 16;

/// Longest lookup key accepted. Identifiers are 36 characters.
const MAX_KEY_LEN: usize = 64;

/// Stream of file chunks, used for downloads.
pub type ByteStream = BoxStream<'static, std::io::Result<Bytes>>;

/// A file held by a [`BlobStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Identifier assigned at upload time
    pub id: String,
    /// Original extension including the leading dot, or empty
    pub extension: String,
    /// Size of the stored content in bytes
    pub size_bytes: u64,
}

impl StoredFile {
    /// Name the file is stored under and delivered as.
    pub fn file_name(&self) -> String {
        format!("{}{}", self.id, self.extension)
    }
}

/// Identifier-addressed file storage.
///
/// Implementations never overwrite: `put` for an identifier that is already
/// stored fails instead of replacing the existing content.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `{id}{extension}`.
    async fn put(&self, id: &str, extension: &str, bytes: Bytes) -> Result<StoredFile>;

    /// Resolve an identifier (or identifier prefix) to a stored file.
    ///
    /// # Errors
    /// - `NotFound` if the key is invalid or nothing matches
    async fn find(&self, prefix: &str) -> Result<StoredFile>;

    /// Read the full content of a stored file.
    async fn read(&self, file: &StoredFile) -> Result<Bytes>;

    /// Open a stored file as a chunk stream.
    async fn open(&self, file: &StoredFile) -> Result<ByteStream>;

    /// Whether a file with exactly this identifier is stored.
    async fn exists(&self, id: &str) -> Result<bool>;
}

/// Whether `key` is acceptable as a lookup key.
///
/// Keys are non-empty and limited to ASCII alphanumerics and `-`, which rules
/// out path separators and dots before anything touches the store.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && key.len() <= MAX_KEY_LEN && key.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

/// Extension to store an upload under, derived from its original filename.
///
/// Returns the extension with its leading dot (`".pdf"`), or an empty string if
/// the filename has none or it is not a short alphanumeric run.
pub fn extension_from_filename(file_name: Option<&str>) -> String {
    let Some(ext) = file_name.and_then(|name| Path::new(name).extension()).and_then(|ext| ext.to_str()) else {
        return String::new();
    };

    if ext.is_empty() || ext.len() > MAX_EXTENSION_LEN || !ext.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return String::new();
    }

    format!(".{ext}")
}

/// Split a stored name into identifier and extension.
pub(crate) fn split_name(name: &str) -> (&str, &str) {
    match name.find('.') {
        Some(idx) => name.split_at(idx),
        None => (name, ""),
    }
}

/// Pick the stored name a prefix lookup resolves to.
///
/// A name whose identifier part equals `prefix` exactly wins. Otherwise the
/// lexicographically smallest name starting with `prefix` wins, so the result
/// never depends on listing order.
pub(crate) fn resolve_prefix<'a, I>(prefix: &str, names: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<&'a str> = None;

    for name in names {
        if !name.starts_with(prefix) {
            continue;
        }

        if split_name(name).0 == prefix {
            return Some(name);
        }

        if best.is_none_or(|current| name < current) {
            best = Some(name);
        }
    }

    best
}
