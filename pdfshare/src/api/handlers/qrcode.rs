use axum::{
    extract::{Path, State},
    response::Html,
};
use tracing::{debug, instrument};

use super::{join_blocking, resolve};
use crate::AppState;
use crate::errors::{Error, Result};
use crate::qr;

#[utoipa::path(
    get,
    path = "/qrcode/{id}",
    tag = "qrcode",
    summary = "QR code for download link",
    description = "Render a QR code encoding the absolute download URL of a stored file, as an `<img>` element with an inline PNG.",
    responses(
        (status = 200, description = "Image fragment", content_type = "text/html", body = String),
        (status = 404, description = "File not found"),
        (status = 500, description = "Failed to generate QR code")
    ),
    params(
        ("id" = String, Path, description = "Identifier (or identifier prefix) of the file")
    )
)]
#[instrument(skip_all, fields(id = %id))]
pub async fn qrcode_for_file(State(state): State<AppState>, Path(id): Path<String>) -> Result<Html<String>> {
    let file = resolve(&state, &id, "qrcode").await?;
    let url = state.config.download_url(&file.id);
    debug!(%url, "Encoding download link");

    let data_url = join_blocking(tokio::task::spawn_blocking(move || qr::data_url(&url)), || Error::Encoding {
        message: "QR rendering aborted".to_string(),
    })
    .await?;

    Ok(Html(qr::img_fragment(&data_url)))
}
