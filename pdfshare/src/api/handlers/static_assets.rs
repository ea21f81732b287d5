//! HTTP handler for the embedded browser client.

use axum::{
    body::Body,
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use tracing::{debug, instrument};

use crate::static_assets::Assets;

/// Serve an embedded client file, `index.html` for `/`.
///
/// Unknown paths are a plain 404: the client is a single page with no
/// client-side routes to fall back for.
#[instrument]
pub async fn serve_embedded_asset(uri: Uri) -> Response {
    let mut path = uri.path().trim_start_matches('/');

    if path.is_empty() {
        path = "index.html";
    }

    let Some(content) = Assets::get(path) else {
        debug!(path, "No embedded asset");
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    };

    let mime = mime_guess::from_path(path).first_or_octet_stream();

    (
        [
            (header::CONTENT_TYPE, mime.as_ref().to_string()),
            (header::CACHE_CONTROL, "no-cache".to_string()),
        ],
        Body::from(content.data.into_owned()),
    )
        .into_response()
}
