use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::info;

use crate::app::errors;
use crate::app::services::AppServices;

/// POST /admin/reload - re-read the bundle from its source.
///
/// On failure the previously loaded bundle keeps serving.
pub async fn reload(Extension(services): Extension<Arc<AppServices>>) -> Response {
    let store = services.store.clone();
    match tokio::task::spawn_blocking(move || store.reload()).await {
        Ok(Ok(serving)) => {
            info!(version = %serving.version(), "bundle reloaded via admin endpoint");
            (
                StatusCode::OK,
                Json(json!({
                    "status": "reloaded",
                    "version": serving.version().to_string(),
                    "variant": serving.bundle().variant_name(),
                })),
            )
                .into_response()
        }
        Ok(Err(e)) => errors::load_error_to_response(&e),
        Err(e) => errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "reload_failed", e.to_string()),
    }
}
