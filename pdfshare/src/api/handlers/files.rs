use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, State, multipart::MultipartError},
    http::{StatusCode, header},
    response::Response,
};
use bytes::BytesMut;
use tracing::{debug, info, instrument};

use super::resolve;
use crate::AppState;
use crate::api::models::files::{UPLOAD_FIELD, UploadResponse};
use crate::errors::{Error, Result};
use crate::storage::{extension_from_filename, identifier};

fn multipart_error(e: MultipartError) -> Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge { message: e.body_text() }
    } else {
        Error::BadRequest {
            message: format!("Failed to parse multipart data: {}", e.body_text()),
        }
    }
}

#[utoipa::path(
    post,
    path = "/upload",
    tag = "files",
    summary = "Upload file",
    description = "Upload a PDF in the multipart field `pdf`. The content type is advisory: bytes are stored as-is.",
    request_body(
        content_type = "multipart/form-data",
        description = "Multipart form with a single file field named `pdf`"
    ),
    responses(
        (status = 200, description = "File stored", body = UploadResponse),
        (status = 400, description = "No file uploaded"),
        (status = 413, description = "File exceeds the upload limit"),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument(skip_all)]
pub async fn upload_file(State(state): State<AppState>, mut multipart: Multipart) -> Result<Json<UploadResponse>> {
    let max_upload_bytes = state.config.limits.max_upload_bytes;
    let mut upload = None;

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            // Ignore unknown fields
            continue;
        }
        if field.file_name().is_none() {
            debug!("Ignoring upload field without a filename");
            continue;
        }

        let extension = extension_from_filename(field.file_name());
        debug!(filename = ?field.file_name(), extension = %extension, "Receiving upload");

        let mut content = BytesMut::new();
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            // Check size limit incrementally to fail fast
            if (content.len() + chunk.len()) as u64 > max_upload_bytes {
                return Err(Error::PayloadTooLarge {
                    message: format!(
                        "File size exceeds maximum allowed size of {} bytes ({} MB)",
                        max_upload_bytes,
                        max_upload_bytes / (1024 * 1024)
                    ),
                });
            }
            content.extend_from_slice(&chunk);
        }

        upload = Some((extension, content.freeze()));
        break;
    }

    let (extension, content) = upload.ok_or(Error::NoFile)?;

    let id = identifier::allocate(state.store.as_ref()).await?;
    let stored = state.store.put(&id, &extension, content).await?;

    crate::metrics::record_upload(stored.size_bytes);
    info!(file_id = %stored.id, size_bytes = stored.size_bytes, "File uploaded");

    Ok(Json(UploadResponse::for_file(&stored.id)))
}

#[utoipa::path(
    get,
    path = "/download/{id}",
    tag = "files",
    summary = "Download file",
    description = "Stream a stored file back as an attachment under its stored name.",
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 404, description = "File not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("id" = String, Path, description = "Identifier (or identifier prefix) of the file")
    )
)]
#[instrument(skip_all, fields(id = %id))]
pub async fn download_file(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let file = resolve(&state, &id, "download").await?;
    let stream = state.store.open(&file).await?;

    let file_name = file.file_name();
    let mime = mime_guess::from_path(&file_name).first_or_octet_stream();

    Response::builder()
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CONTENT_LENGTH, file.size_bytes)
        .header(header::CONTENT_DISPOSITION, format!("attachment; filename=\"{file_name}\""))
        .body(Body::from_stream(stream))
        .map_err(|e| Error::Other(e.into()))
}
