use axum::{
    extract::{Path, State},
    response::Html,
};
use tracing::{info, instrument};

use super::{join_blocking, resolve};
use crate::AppState;
use crate::errors::{Error, Result};
use crate::pdf;

#[utoipa::path(
    get,
    path = "/preview/{id}",
    tag = "preview",
    summary = "Preview file text",
    description = "Extract the text of a stored PDF. Pages appear in order, separated by a blank line, wrapped in a `<pre>` element.",
    responses(
        (status = 200, description = "Extracted text", content_type = "text/html", body = String),
        (status = 404, description = "File not found"),
        (status = 500, description = "Stored file is not a readable PDF")
    ),
    params(
        ("id" = String, Path, description = "Identifier (or identifier prefix) of the file")
    )
)]
#[instrument(skip_all, fields(id = %id))]
pub async fn preview_file(State(state): State<AppState>, Path(id): Path<String>) -> Result<Html<String>> {
    let file = resolve(&state, &id, "preview").await?;
    let content = state.store.read(&file).await?;

    let text = join_blocking(tokio::task::spawn_blocking(move || pdf::extract_text(&content)), || Error::Parse {
        message: "text extraction aborted".to_string(),
    })
    .await?;

    info!(file_id = %file.id, chars = text.len(), "Generated preview");

    Ok(Html(format!("<pre>{}</pre>", html_escape::encode_text(&text))))
}
