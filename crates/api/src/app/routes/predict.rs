use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value as JsonValue;
use tracing::debug;

use noshow_core::RawAppointment;

use crate::app::dto::PredictionResponse;
use crate::app::errors;
use crate::app::services::AppServices;

/// POST /predict/no-show
pub async fn predict_no_show(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<JsonValue>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_json", rejection.body_text());
        }
    };

    // Field-level problems are reported by the codec; this only rejects non-objects.
    let raw: RawAppointment = match serde_json::from_value(body) {
        Ok(raw) => raw,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_request", e.to_string()),
    };

    match services.predictor.predict(&raw) {
        Ok(result) => {
            debug!(
                route = result.route.as_str(),
                lead_days = result.lead_days,
                probability = result.probability,
                "scored appointment"
            );
            (StatusCode::OK, Json(PredictionResponse::from(result))).into_response()
        }
        Err(e) => errors::prediction_error_to_response(e),
    }
}
