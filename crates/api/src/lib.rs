//! HTTP API: no-show risk prediction over the loaded artifact bundle.

pub mod app;
pub mod config;

pub use config::ServiceConfig;
