use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Upload request carried no `pdf` file field
    #[error("No file uploaded")]
    NoFile,

    /// Identifier does not resolve to a stored file
    #[error("File with ID {id} not found")]
    NotFound { id: String },

    /// Stored bytes are not a readable PDF, or text extraction failed
    #[error("Failed to parse PDF: {message}")]
    Parse { message: String },

    /// QR code generation failed
    #[error("Failed to encode QR code: {message}")]
    Encoding { message: String },

    /// Malformed request, e.g. a broken multipart body
    #[error("{message}")]
    BadRequest { message: String },

    /// Upload exceeded the configured size limit
    #[error("{message}")]
    PayloadTooLarge { message: String },

    /// Blob store I/O failure
    #[error(transparent)]
    Storage(#[from] std::io::Error),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn not_found(id: impl Into<String>) -> Self {
        Error::NotFound { id: id.into() }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::NoFile | Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Error::Parse { .. } | Error::Encoding { .. } | Error::Storage(_) | Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::NoFile => "No file uploaded".to_string(),
            Error::NotFound { .. } => "File not found".to_string(),
            Error::Parse { message } => format!("Failed to parse PDF: {message}"),
            Error::Encoding { .. } => "Failed to generate QR code".to_string(),
            Error::BadRequest { message } | Error::PayloadTooLarge { message } => message.clone(),
            Error::Storage(_) | Error::Other(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::Storage(_) | Error::Other(_) | Error::Encoding { .. } => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Parse { .. } => {
                tracing::warn!("PDF decode error: {}", self);
            }
            Error::NoFile | Error::NotFound { .. } | Error::BadRequest { .. } | Error::PayloadTooLarge { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        (self.status_code(), self.user_message()).into_response()
    }
}

/// Type alias for handler results
pub type Result<T> = std::result::Result<T, Error>;
