use axum::{Json, extract::State};
use tracing::instrument;

use crate::AppState;
use crate::api::models::config::ClientConfig;

#[utoipa::path(
    get,
    path = "/config",
    tag = "config",
    summary = "Get client configuration",
    description = "Settings the browser client needs, such as the public base URL download links are shared under.",
    responses(
        (status = 200, description = "Client configuration", body = ClientConfig)
    )
)]
#[instrument(skip_all)]
pub async fn get_config(State(state): State<AppState>) -> Json<ClientConfig> {
    Json(ClientConfig {
        public_url: state.config.public_url.as_str().trim_end_matches('/').to_string(),
    })
}
