//! HTTP request handlers.
//!
//! # Handler Modules
//!
//! - [`files`]: Upload and download of stored files
//! - [`preview`]: Plain-text preview of a stored PDF
//! - [`qrcode`]: QR code for a stored file's download link
//! - [`config`]: Client configuration retrieval
//! - [`static_assets`]: The embedded browser client
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Result`], whose error type converts to an HTTP
//! status code and a plain-text message.

pub mod config;
pub mod files;
pub mod preview;
pub mod qrcode;
pub mod static_assets;

use crate::AppState;
use crate::errors::{Error, Result};
use crate::storage::StoredFile;

/// Resolve a path identifier to a stored file, counting misses per route.
pub(crate) async fn resolve(state: &AppState, id: &str, route: &'static str) -> Result<StoredFile> {
    match state.store.find(id).await {
        Err(e @ Error::NotFound { .. }) => {
            crate::metrics::record_lookup_miss(route);
            Err(e)
        }
        other => other,
    }
}

/// Await a blocking task, treating a panic inside it as `on_panic`.
pub(crate) async fn join_blocking<T>(task: tokio::task::JoinHandle<Result<T>>, on_panic: impl FnOnce() -> Error) -> Result<T> {
    match task.await {
        Ok(result) => result,
        Err(e) if e.is_panic() => Err(on_panic()),
        Err(e) => Err(Error::Other(e.into())),
    }
}
