use serde::Serialize;

use noshow_ai::{PredictionResult, RiskLevel};

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub no_show_probability: f64,
    pub risk_level: RiskLevel,
}

impl From<PredictionResult> for PredictionResponse {
    fn from(result: PredictionResult) -> Self {
        Self {
            no_show_probability: result.probability,
            risk_level: result.risk_level,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ModelsLoaded {
    pub operations: bool,
}

#[derive(Debug, Serialize)]
pub struct BundleInfo {
    pub version: String,
    pub variant: &'static str,
    pub horizons: Vec<&'static str>,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub models_loaded: ModelsLoaded,
    pub bundle: Option<BundleInfo>,
    pub risk_threshold: f64,
}
