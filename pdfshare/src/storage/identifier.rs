//! Identifier allocation for new uploads.
//!
//! Identifiers are random UUIDv4 strings. The random space alone makes
//! collisions practically impossible, but allocation still re-checks the store
//! and draws again if the candidate is taken.

use anyhow::anyhow;
use tracing::warn;
use uuid::Uuid;

use super::BlobStore;
use crate::errors::{Error, Result};

/// How many candidates are tried before allocation gives up.
pub const MAX_ATTEMPTS: usize = 5;

/// Allocate a fresh identifier that is not yet present in `store`.
pub async fn allocate(store: &dyn BlobStore) -> Result<String> {
    allocate_with(store, || Uuid::new_v4().to_string()).await
}

/// Allocate using a custom candidate source.
pub async fn allocate_with<F>(store: &dyn BlobStore, mut candidate: F) -> Result<String>
where
    F: FnMut() -> String + Send,
{
    for attempt in 1..=MAX_ATTEMPTS {
        let id = candidate();
        if !store.exists(&id).await? {
            return Ok(id);
        }
        warn!(file_id = %id, attempt, "Identifier collision, drawing a new one");
    }

    Err(Error::Other(anyhow!("could not allocate a unique file identifier after {MAX_ATTEMPTS} attempts")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBlobStore;
    use bytes::Bytes;

    #[tokio::test]
    async fn test_allocate_returns_uuid() {
        let store = MemoryBlobStore::new();
        let id = allocate(&store).await.unwrap();

        let parsed = Uuid::parse_str(&id).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
        assert_eq!(id, parsed.to_string());
    }

    #[tokio::test]
    async fn test_allocate_retries_on_collision() {
        let store = MemoryBlobStore::new();
        store.put("taken", ".pdf", Bytes::from_static(b"x")).await.unwrap();

        let mut candidates = vec!["fresh".to_string(), "taken".to_string()];
        let id = allocate_with(&store, || candidates.pop().unwrap()).await.unwrap();

        assert_eq!(id, "fresh");
    }

    #[tokio::test]
    async fn test_allocate_gives_up_after_max_attempts() {
        let store = MemoryBlobStore::new();
        store.put("taken", "", Bytes::from_static(b"x")).await.unwrap();

        let mut calls = 0;
        let result = allocate_with(&store, || {
            calls += 1;
            "taken".to_string()
        })
        .await;

        assert!(matches!(result, Err(Error::Other(_))));
        assert_eq!(calls, MAX_ATTEMPTS);
    }
}
