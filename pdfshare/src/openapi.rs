//! OpenAPI documentation, served at `/api-docs/openapi.json` and rendered at `/docs`.

use utoipa::OpenApi;

use crate::api;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "pdfshare",
        description = "Upload a PDF, share it through a download link or QR code, and preview its text."
    ),
    paths(
        api::handlers::files::upload_file,
        api::handlers::files::download_file,
        api::handlers::preview::preview_file,
        api::handlers::qrcode::qrcode_for_file,
        api::handlers::config::get_config,
    ),
    components(schemas(api::models::files::UploadResponse, api::models::config::ClientConfig)),
    tags(
        (name = "files", description = "Store uploaded files and download them by identifier."),
        (name = "preview", description = "Plain-text preview of stored PDFs."),
        (name = "qrcode", description = "QR codes for sharing download links with another device."),
        (name = "config", description = "Client configuration.")
    )
)]
pub struct ApiDoc;
