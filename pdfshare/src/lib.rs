//! # pdfshare: PDF upload and sharing service
//!
//! `pdfshare` accepts a PDF upload, stores it under a freshly allocated identifier, and hands
//! back a download link. The link can be shared as a QR code so that a second device can fetch
//! the file, and the stored document's text can be previewed without downloading it.
//!
//! ## Architecture
//!
//! The HTTP layer is built on [Axum](https://github.com/tokio-rs/axum). Uploaded bytes live in a
//! [`storage::BlobStore`]: a flat directory on disk by default, or process memory. The store never
//! overwrites, and every lookup resolves identifiers (or identifier prefixes) the same way, so
//! download, preview and QR generation always agree on which file an identifier names.
//!
//! ### Routes
//!
//! | Method | Path | Purpose |
//! |--------|------|---------|
//! | `POST` | `/upload` | Store the multipart field `pdf`, respond with `{"downloadUrl": "/download/{id}"}` |
//! | `GET` | `/download/{id}` | Stream the stored file back as an attachment |
//! | `GET` | `/preview/{id}` | Extracted text of the stored PDF in a `<pre>` block |
//! | `GET` | `/qrcode/{id}` | `<img>` element holding a QR code of the absolute download URL |
//! | `GET` | `/config` | Public base URL for the browser client |
//! | `GET` | `/healthz` | Liveness probe |
//! | `GET` | `/docs` | API reference |
//!
//! Anything else is served from the embedded browser client (see [`static_assets`]).
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use pdfshare::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = pdfshare::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     pdfshare::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config)?;
//!     app.serve(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.
pub mod api;
pub mod config;
pub mod errors;
mod metrics;
mod openapi;
pub mod pdf;
pub mod qr;
mod static_assets;
pub mod storage;
pub mod telemetry;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use crate::config::{CorsOrigin, StorageConfig};
use crate::openapi::ApiDoc;
use crate::storage::{BlobStore, FsBlobStore, MemoryBlobStore};
use axum::extract::DefaultBodyLimit;
use axum::http::{self, HeaderValue};
use axum::{
    Router,
    routing::{get, post},
};
use bon::Builder;
pub use config::Config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

/// Multipart framing (boundaries, part headers, other small fields) allowed on top of the file
/// size limit before the request body itself is cut off.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Application state shared across all request handlers.
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .config(config)
///     .store(Arc::new(MemoryBlobStore::new()))
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn BlobStore>,
}

/// Create the blob store selected by `config.storage`.
pub fn build_store(config: &Config) -> Arc<dyn BlobStore> {
    match &config.storage {
        StorageConfig::Filesystem { path } => {
            info!(path = %path.display(), "Using filesystem storage");
            Arc::new(FsBlobStore::new(path.clone()))
        }
        StorageConfig::Memory => {
            info!("Using in-memory storage; uploads are lost on restart");
            Arc::new(MemoryBlobStore::new())
        }
    }
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let allow_origin = if config.cors.allowed_origins.contains(&CorsOrigin::Wildcard) {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &config.cors.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                origins.push(url.origin().ascii_serialization().parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([http::Method::GET, http::Method::POST])
        .expose_headers([http::header::CONTENT_DISPOSITION]);

    if let Some(max_age) = config.cors.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router with all endpoints and middleware.
///
/// This function constructs the complete Axum router with:
/// - File routes (upload, download, preview, QR code)
/// - Client configuration and health routes
/// - OpenAPI document and rendered reference
/// - Embedded client assets as the fallback
/// - Optional Prometheus metrics
/// - CORS configuration
/// - Tracing middleware
///
/// # Errors
///
/// Returns an error if CORS configuration is invalid.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let body_limit = usize::try_from(state.config.limits.max_upload_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let cors_layer = create_cors_layer(&state.config)?;
    let enable_metrics = state.config.enable_metrics;

    let mut router = Router::new()
        .route(
            "/upload",
            post(api::handlers::files::upload_file).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/download/{id}", get(api::handlers::files::download_file))
        .route("/preview/{id}", get(api::handlers::preview::preview_file))
        .route("/qrcode/{id}", get(api::handlers::qrcode::qrcode_for_file))
        .route("/config", get(api::handlers::config::get_config))
        .route("/healthz", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { axum::Json(ApiDoc::openapi()) }))
        .with_state(state)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .fallback(api::handlers::static_assets::serve_embedded_asset)
        .layer(cors_layer);

    // Add Prometheus metrics if enabled
    if enable_metrics {
        let (prometheus_layer, metric_handle) = metrics::prometheus();
        router = router
            .route("/internal/metrics", get(move || std::future::ready(metric_handle.render())))
            .layer(prometheus_layer);
    }

    // Add tracing layer
    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// The HTTP application: configuration plus a fully built router.
///
/// # Lifecycle
///
/// 1. **Initialize**: [`Application::new`] creates the blob store and builds the router
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts handling requests
/// 3. **Shutdown**: When the shutdown signal resolves, in-flight requests finish and telemetry is flushed
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Create a new application instance with the configured blob store
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let store = build_store(&config);
        Self::with_store(config, store)
    }

    /// Create a new application instance over an existing blob store
    pub fn with_store(config: Config, store: Arc<dyn BlobStore>) -> anyhow::Result<Self> {
        debug!("Starting pdfshare with configuration: {:#?}", config);

        let app_state = AppState::builder().config(config.clone()).store(store).build();
        let router = build_router(app_state)?;

        Ok(Self { router, config })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "pdfshare listening on http://{}, sharing links under {}",
            bind_addr, self.config.public_url
        );

        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::api::models::files::UploadResponse;
    use crate::test_utils::{create_test_app, create_test_app_with_config, create_test_config, pdf_form, sample_pdf};
    use axum::http::StatusCode;
    use url::Url;

    #[tokio::test]
    async fn test_healthz() {
        let (server, _store) = create_test_app();

        let response = server.get("/healthz").await;
        response.assert_status_ok();
        response.assert_text("OK");
    }

    #[tokio::test]
    async fn test_openapi_json_endpoint() {
        let (server, _store) = create_test_app();

        let response = server.get("/api-docs/openapi.json").await;
        response.assert_status_ok();

        let content = response.text();
        assert!(content.contains("\"openapi\""));
        assert!(content.contains("/qrcode/{id}"));
    }

    #[tokio::test]
    async fn test_docs_page() {
        let (server, _store) = create_test_app();

        let response = server.get("/docs").await;
        response.assert_status_ok();
        assert!(response.text().contains("<html"));
    }

    #[tokio::test]
    async fn test_metrics_endpoint_disabled_by_default() {
        let (server, _store) = create_test_app();

        // Falls through to the asset fallback
        let response = server.get("/internal/metrics").await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_metrics_endpoint_counts_uploads() {
        let mut config = create_test_config();
        config.enable_metrics = true;
        let (server, _store) = create_test_app_with_config(config);

        server.post("/upload").multipart(pdf_form(b"abc".to_vec(), "a.pdf")).await.assert_status_ok();
        server.get("/download/ffffffff").await.assert_status(StatusCode::NOT_FOUND);

        let response = server.get("/internal/metrics").await;
        response.assert_status_ok();

        let text = response.text();
        assert!(text.contains("pdfshare_uploads_total"));
        assert!(text.contains("pdfshare_lookup_misses_total"));
    }

    #[tokio::test]
    async fn test_cors_wildcard_allows_any_origin() {
        let (server, _store) = create_test_app();

        let response = server.get("/config").add_header("origin", "https://elsewhere.example").await;
        response.assert_status_ok();
        assert_eq!(response.header("access-control-allow-origin"), "*");
    }

    #[tokio::test]
    async fn test_cors_specific_origin() {
        let mut config = create_test_config();
        config.cors.allowed_origins = vec![CorsOrigin::Url(Url::parse("https://app.example.com").unwrap())];
        let (server, _store) = create_test_app_with_config(config);

        let allowed = server.get("/config").add_header("origin", "https://app.example.com").await;
        assert_eq!(allowed.header("access-control-allow-origin"), "https://app.example.com");

        let denied = server.get("/config").add_header("origin", "https://evil.example").await;
        assert!(denied.headers().get("access-control-allow-origin").is_none());
    }

    #[test_log::test(tokio::test)]
    async fn test_full_flow_on_filesystem_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = create_test_config();
        config.storage = StorageConfig::Filesystem {
            path: dir.path().join("uploads"),
        };

        let server = Application::new(config).unwrap().into_test_server();
        let pdf = sample_pdf(&[&["stored", "on", "disk"]]);

        let body: UploadResponse = server.post("/upload").multipart(pdf_form(pdf.clone(), "disk.pdf")).await.json();
        let id = body.download_url.trim_start_matches("/download/").to_string();

        assert!(dir.path().join("uploads").join(format!("{id}.pdf")).is_file());

        let download = server.get(&body.download_url).await;
        assert_eq!(download.as_bytes().as_ref(), pdf.as_slice());

        let preview = server.get(&format!("/preview/{id}")).await;
        preview.assert_text("<pre>stored on disk</pre>");

        server.get(&format!("/qrcode/{id}")).await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_concurrent_uploads_get_distinct_identifiers() {
        let (server, store) = create_test_app();

        let uploads = (0..16).map(|i| {
            let server = &server;
            async move {
                let body: UploadResponse = server
                    .post("/upload")
                    .multipart(pdf_form(format!("file {i}").into_bytes(), "a.pdf"))
                    .await
                    .json();
                body.download_url
            }
        });

        let mut urls = futures::future::join_all(uploads).await;
        urls.sort();
        urls.dedup();

        assert_eq!(urls.len(), 16);
        assert_eq!(store.len(), 16);
    }
}
