//! Serving configuration, read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use tracing::warn;

use noshow_ai::RiskPolicy;

pub const DEFAULT_BUNDLE_PATH: &str = "models/no_show_model.json";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8085";

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Local path of the bundle blob.
    pub bundle_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub risk_policy: RiskPolicy,
    /// Directory mirroring remote model storage; sync is skipped when unset.
    pub model_mirror: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Invalid values fall back to their
    /// defaults with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bundle_path = value("NOSHOW_BUNDLE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BUNDLE_PATH));

        let default_addr = SocketAddr::from(([0, 0, 0, 0], 8085));
        let bind_addr = match value("NOSHOW_BIND_ADDR") {
            None => default_addr,
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                warn!(value = %raw, "invalid NOSHOW_BIND_ADDR ({e}); using {DEFAULT_BIND_ADDR}");
                default_addr
            }),
        };

        let risk_policy = match value("NOSHOW_RISK_THRESHOLD") {
            None => RiskPolicy::default(),
            Some(raw) => match raw.parse::<f64>() {
                Ok(threshold) => RiskPolicy::new(threshold).unwrap_or_else(|e| {
                    warn!(value = %raw, "{e}; using default threshold");
                    RiskPolicy::default()
                }),
                Err(e) => {
                    warn!(value = %raw, "invalid NOSHOW_RISK_THRESHOLD ({e}); using default threshold");
                    RiskPolicy::default()
                }
            },
        };

        Self {
            bundle_path,
            bind_addr,
            risk_policy,
            model_mirror: value("NOSHOW_MODEL_MIRROR").map(PathBuf::from),
        }
    }
}
