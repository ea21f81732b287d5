//! In-memory blob store.
//!
//! Suitable for tests and throwaway deployments. Files are lost on restart.

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::{DashMap, mapref::entry::Entry};
use futures::StreamExt;
use std::sync::Arc;

use super::{BlobStore, ByteStream, StoredFile, is_valid_key, resolve_prefix};
use crate::errors::{Error, Result};

#[derive(Debug, Clone)]
struct MemoryEntry {
    extension: String,
    bytes: Bytes,
}

/// In-memory implementation of [`BlobStore`], keyed by identifier.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    files: Arc<DashMap<String, MemoryEntry>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, id: &str, extension: &str, bytes: Bytes) -> Result<StoredFile> {
        let file = StoredFile {
            id: id.to_string(),
            extension: extension.to_string(),
            size_bytes: bytes.len() as u64,
        };

        match self.files.entry(id.to_string()) {
            Entry::Occupied(_) => Err(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("file {id} already stored"),
            )
            .into()),
            Entry::Vacant(slot) => {
                slot.insert(MemoryEntry {
                    extension: extension.to_string(),
                    bytes,
                });
                Ok(file)
            }
        }
    }

    async fn find(&self, prefix: &str) -> Result<StoredFile> {
        if !is_valid_key(prefix) {
            return Err(Error::not_found(prefix));
        }

        let names: Vec<String> = self
            .files
            .iter()
            .map(|entry| format!("{}{}", entry.key(), entry.value().extension))
            .collect();
        let name = resolve_prefix(prefix, names.iter().map(String::as_str)).ok_or_else(|| Error::not_found(prefix))?;
        let (id, _) = super::split_name(name);

        let entry = self.files.get(id).ok_or_else(|| Error::not_found(prefix))?;
        Ok(StoredFile {
            id: id.to_string(),
            extension: entry.extension.clone(),
            size_bytes: entry.bytes.len() as u64,
        })
    }

    async fn read(&self, file: &StoredFile) -> Result<Bytes> {
        self.files
            .get(&file.id)
            .map(|entry| entry.bytes.clone())
            .ok_or_else(|| Error::not_found(&file.id))
    }

    async fn open(&self, file: &StoredFile) -> Result<ByteStream> {
        let bytes = self.read(file).await?;
        Ok(futures::stream::once(async move { Ok(bytes) }).boxed())
    }

    async fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.files.contains_key(id))
    }
}
