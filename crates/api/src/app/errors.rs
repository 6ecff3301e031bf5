use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use noshow_core::{ArtifactLoadError, PredictionError, ValidationError};

pub fn prediction_error_to_response(err: PredictionError) -> Response {
    match err {
        PredictionError::Validation(e) => validation_error(&e),
        PredictionError::ServiceUnavailable(reason) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", reason)
        }
    }
}

pub fn load_error_to_response(err: &ArtifactLoadError) -> Response {
    json_error(StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", err.to_string())
}

pub fn validation_error(err: &ValidationError) -> Response {
    (
        StatusCode::BAD_REQUEST,
        axum::Json(json!({
            "error": "validation_error",
            "field": err.field,
            "message": err.to_string(),
        })),
    )
        .into_response()
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
