//! Request/response data structures.

pub mod config;
pub mod files;
