//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for all endpoints
//! - **[`models`]**: Request/response data structures
//!
//! # API Structure
//!
//! - **Upload** (`POST /upload`): store a file, get its download path
//! - **Delivery** (`GET /download/{id}`, `/preview/{id}`, `/qrcode/{id}`): fetch, read or share a stored file
//! - **Client config** (`GET /config`): settings the browser client needs
//!
//! The OpenAPI document is served at `/api-docs/openapi.json` and rendered at `/docs`.

pub mod handlers;
pub mod models;
