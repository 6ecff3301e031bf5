use std::sync::Arc;

use axum::{Json, extract::Extension, response::IntoResponse};
use serde_json::json;

use crate::app::dto::{BundleInfo, HealthResponse, ModelsLoaded};
use crate::app::services::AppServices;

/// Liveness plus readiness: the service answers even without a bundle.
pub async fn health(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    let bundle = services.store.ensure_loaded().map(|serving| BundleInfo {
        version: serving.version().to_string(),
        variant: serving.bundle().variant_name(),
        horizons: serving.bundle().horizons().iter().map(|h| h.as_str()).collect(),
        created_at: serving.persisted().created_at.to_rfc3339(),
    });

    Json(HealthResponse {
        status: if bundle.is_some() { "ok" } else { "degraded" },
        service: "noshow-api",
        models_loaded: ModelsLoaded {
            operations: bundle.is_some(),
        },
        bundle,
        risk_threshold: services.predictor.policy().threshold(),
    })
}

pub async fn metrics(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    let snapshot = services.metrics.snapshot();
    Json(json!({
        "predictions_total": snapshot.predictions_total(),
        "counters": snapshot,
    }))
}
