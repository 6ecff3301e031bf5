//! HTTP application wiring (Axum router + shared services).
//!
//! - `services.rs`: the artifact store and prediction service shared by handlers
//! - `routes/`: HTTP handlers, one file per area
//! - `dto.rs`: response bodies
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{
    Extension, Router,
    routing::{get, post},
};
use tower::ServiceBuilder;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::{AppServices, build_services};

/// Build the full HTTP router (used by `main.rs` and the black-box tests).
pub fn build_app(services: Arc<AppServices>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .route("/metrics", get(routes::system::metrics))
        .route("/predict/no-show", post(routes::predict::predict_no_show))
        .route("/admin/reload", post(routes::admin::reload))
        .layer(ServiceBuilder::new().layer(Extension(services)))
}
