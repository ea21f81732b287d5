use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Settings the browser client needs from the server.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClientConfig {
    /// Base URL download links are shared under, without a trailing slash
    #[schema(example = "https://files.example.com")]
    pub public_url: String,
}
