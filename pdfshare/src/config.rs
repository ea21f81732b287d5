//! Application configuration management.
//!
//! Configuration is loaded from an optional YAML file with environment variable overrides. The
//! configuration file path defaults to `config.yaml` but can be specified via `-f` flag or the
//! `PDFSHARE_CONFIG` environment variable. A missing file is not an error: every field has a
//! default.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `PDFSHARE_` override YAML values
//! 3. **PORT / PUBLIC_URL** - Bare variables, as set by most hosting platforms
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `PDFSHARE_STORAGE__PATH=/data/uploads` sets the `storage.path` field.
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! # Listen port and the address clients reach the server at
//! PORT=8080
//! PUBLIC_URL="https://files.example.com"
//!
//! # Keep uploads in memory instead of on disk
//! PDFSHARE_STORAGE__BACKEND=memory
//!
//! # Raise the upload limit to 200 MiB
//! PDFSHARE_LIMITS__MAX_UPLOAD_BYTES=209715200
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "PDFSHARE_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// All fields have defaults, so an empty or missing config file yields a runnable server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Base URL clients reach this server at. Download links encoded in QR codes
    /// are built from it, so it must be reachable from the scanning device.
    pub public_url: Url,
    /// Where uploaded files are kept
    pub storage: StorageConfig,
    /// Upload limits
    pub limits: LimitsConfig,
    /// CORS settings for browser clients served from another origin
    pub cors: CorsConfig,
    /// Enable Prometheus metrics endpoint at `/internal/metrics`
    pub enable_metrics: bool,
    /// Enable OpenTelemetry OTLP export for distributed tracing
    pub enable_otel_export: bool,
}

/// Blob storage backend selection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "backend", rename_all = "lowercase", deny_unknown_fields)]
pub enum StorageConfig {
    /// Flat directory on local disk, created on first upload
    Filesystem {
        #[serde(default = "default_storage_path")]
        path: PathBuf,
    },
    /// Process memory; contents are lost on restart
    Memory,
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("./uploads")
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Filesystem {
            path: default_storage_path(),
        }
    }
}

/// Upload limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Maximum size of a single uploaded file in bytes.
    /// Default: 50MB
    pub max_upload_bytes: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: 50 * 1024 * 1024, // 50MB
        }
    }
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins for CORS requests
    pub allowed_origins: Vec<CorsOrigin>,
    /// Cache preflight requests for this many seconds
    pub max_age: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![CorsOrigin::Wildcard],
            max_age: Some(3600), // Cache preflight for 1 hour
        }
    }
}

/// CORS origin specification.
///
/// Can be either a wildcard (`*`) to allow all origins, or a specific URL.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CorsOrigin {
    /// Allow all origins (`*`)
    #[serde(deserialize_with = "parse_wildcard", serialize_with = "serialize_wildcard")]
    Wildcard,
    /// Specific origin URL (e.g., `https://app.example.com`)
    #[serde(deserialize_with = "parse_url")]
    Url(Url),
}

fn parse_wildcard<'de, D>(deserializer: D) -> Result<(), D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    if s == "*" {
        Ok(())
    } else {
        Err(serde::de::Error::custom("Expected '*'"))
    }
}

fn serialize_wildcard<S>(serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str("*")
}

fn parse_url<'de, D>(deserializer: D) -> Result<Url, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    Url::parse(&s).map_err(serde::de::Error::custom)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            public_url: Url::parse("http://localhost:3001").expect("default public_url is a valid URL"),
            storage: StorageConfig::default(),
            limits: LimitsConfig::default(),
            cors: CorsConfig::default(),
            enable_metrics: false,
            enable_otel_export: false,
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(figment::Error::from)?;
        Ok(config)
    }

    /// Validate the configuration for consistency
    pub fn validate(&self) -> Result<(), String> {
        if !matches!(self.public_url.scheme(), "http" | "https") {
            return Err(format!(
                "Config validation: public_url must be an http(s) URL, got scheme '{}'",
                self.public_url.scheme()
            ));
        }

        if self.public_url.cannot_be_a_base() || self.public_url.host().is_none() {
            return Err(format!("Config validation: public_url '{}' has no host", self.public_url));
        }

        if self.limits.max_upload_bytes == 0 {
            return Err("Config validation: limits.max_upload_bytes cannot be 0".to_string());
        }

        if let StorageConfig::Filesystem { path } = &self.storage
            && path.as_os_str().is_empty()
        {
            return Err("Config validation: storage.path cannot be empty".to_string());
        }

        if self.cors.allowed_origins.is_empty() {
            return Err("Config validation: CORS allowed_origins cannot be empty. Add at least one allowed origin.".to_string());
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can still override specific values
            .merge(Env::prefixed("PDFSHARE_").split("__").ignore(&["CONFIG"]))
            // Bare PORT and PUBLIC_URL, as injected by hosting platforms
            .merge(Env::raw().only(&["PORT", "PUBLIC_URL"]))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Absolute download link for a stored file, as encoded in QR codes.
    pub fn download_url(&self, id: &str) -> String {
        format!("{}/download/{}", self.public_url.as_str().trim_end_matches('/'), id)
    }
}
