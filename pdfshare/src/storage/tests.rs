use bytes::Bytes;
use futures::TryStreamExt;
use tempfile::TempDir;

use crate::errors::Error;
use crate::storage::{BlobStore, FsBlobStore, MemoryBlobStore};

fn fs_store() -> (TempDir, FsBlobStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = FsBlobStore::new(dir.path().join("uploads"));
    (dir, store)
}

async fn run_test_put_then_find<S: BlobStore>(store: &S) {
    let stored = store.put("abc123", ".pdf", Bytes::from_static(b"hello")).await.unwrap();
    assert_eq!(stored.file_name(), "abc123.pdf");
    assert_eq!(stored.size_bytes, 5);

    let found = store.find("abc123").await.unwrap();
    assert_eq!(found, stored);
}

async fn run_test_find_by_prefix<S: BlobStore>(store: &S) {
    store.put("abc123", ".pdf", Bytes::from_static(b"hello")).await.unwrap();

    let found = store.find("abc").await.unwrap();
    assert_eq!(found.id, "abc123");
    assert_eq!(found.extension, ".pdf");
}

async fn run_test_find_unknown<S: BlobStore>(store: &S) {
    store.put("abc123", ".pdf", Bytes::from_static(b"hello")).await.unwrap();

    let err = store.find("zzz").await.unwrap_err();
    assert!(matches!(err, Error::NotFound { ref id } if id == "zzz"));
}

async fn run_test_find_rejects_invalid_keys<S: BlobStore>(store: &S) {
    store.put("abc123", ".pdf", Bytes::from_static(b"hello")).await.unwrap();

    for key in ["", "abc123.pdf", "../abc123", "abc/123"] {
        assert!(matches!(store.find(key).await.unwrap_err(), Error::NotFound { .. }), "key {key:?}");
    }
}

async fn run_test_shared_prefix_is_deterministic<S: BlobStore>(store: &S) {
    store.put("abc2", ".pdf", Bytes::from_static(b"two")).await.unwrap();
    store.put("abc1", ".pdf", Bytes::from_static(b"one")).await.unwrap();
    store.put("abc", ".txt", Bytes::from_static(b"exact")).await.unwrap();

    // Exact identifier wins over longer names sharing the prefix
    assert_eq!(store.find("abc").await.unwrap().id, "abc");
    // Otherwise the smallest matching name wins
    assert_eq!(store.find("ab").await.unwrap().id, "abc");
    assert_eq!(store.find("abc2").await.unwrap().id, "abc2");
}

async fn run_test_read_and_open_return_content<S: BlobStore>(store: &S) {
    let content = Bytes::from(vec![7u8; 200_000]);
    let stored = store.put("big", ".bin", content.clone()).await.unwrap();

    assert_eq!(store.read(&stored).await.unwrap(), content);

    let chunks: Vec<Bytes> = store.open(&stored).await.unwrap().try_collect().await.unwrap();
    let streamed: Vec<u8> = chunks.into_iter().flatten().collect();
    assert_eq!(streamed, content.to_vec());
}

async fn run_test_put_never_overwrites<S: BlobStore>(store: &S) {
    store.put("dup", ".pdf", Bytes::from_static(b"first")).await.unwrap();

    let err = store.put("dup", ".pdf", Bytes::from_static(b"second")).await.unwrap_err();
    assert!(matches!(err, Error::Storage(_)));

    let found = store.find("dup").await.unwrap();
    assert_eq!(store.read(&found).await.unwrap(), Bytes::from_static(b"first"));
}

async fn run_test_exists_is_exact<S: BlobStore>(store: &S) {
    store.put("abc123", "", Bytes::from_static(b"x")).await.unwrap();

    assert!(store.exists("abc123").await.unwrap());
    assert!(!store.exists("abc").await.unwrap());
    assert!(!store.exists("abc1234").await.unwrap());
}

async fn run_test_empty_file<S: BlobStore>(store: &S) {
    let stored = store.put("empty", ".pdf", Bytes::new()).await.unwrap();
    assert_eq!(stored.size_bytes, 0);
    assert!(store.read(&store.find("empty").await.unwrap()).await.unwrap().is_empty());
}

macro_rules! backend_tests {
    ($($name:ident),* $(,)?) => {
        mod filesystem {
            use super::*;
            $(
                #[tokio::test]
                async fn $name() {
                    let (_dir, store) = fs_store();
                    super::$name(&store).await;
                }
            )*
        }

        mod in_memory {
            use super::*;
            $(
                #[tokio::test]
                async fn $name() {
                    let store = MemoryBlobStore::new();
                    super::$name(&store).await;
                }
            )*
        }
    };
}

backend_tests!(
    run_test_put_then_find,
    run_test_find_by_prefix,
    run_test_find_unknown,
    run_test_find_rejects_invalid_keys,
    run_test_shared_prefix_is_deterministic,
    run_test_read_and_open_return_content,
    run_test_put_never_overwrites,
    run_test_exists_is_exact,
    run_test_empty_file,
);
