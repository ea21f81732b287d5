use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Multipart field the uploaded file is read from.
pub const UPLOAD_FIELD: &str = "pdf";

/// Response to a successful upload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// Server-relative download path, `/download/{id}`
    #[serde(rename = "downloadUrl")]
    #[schema(example = "/download/0b5c6f3a-1d2e-4f50-9a7b-8c9d0e1f2a3b")]
    pub download_url: String,
}

impl UploadResponse {
    pub fn for_file(id: &str) -> Self {
        Self {
            download_url: download_path(id),
        }
    }
}

/// Server-relative download path for a stored file.
pub fn download_path(id: &str) -> String {
    format!("/download/{id}")
}
