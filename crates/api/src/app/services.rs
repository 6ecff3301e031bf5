use std::sync::Arc;

use noshow_ai::{PredictionService, RiskPolicy};
use noshow_infra::ArtifactStore;
use noshow_observability::ServingMetrics;

use crate::config::ServiceConfig;

pub type Predictor = PredictionService<Arc<ArtifactStore>>;

/// Everything the handlers share. Built once at startup.
pub struct AppServices {
    pub store: Arc<ArtifactStore>,
    pub predictor: Predictor,
    pub metrics: Arc<ServingMetrics>,
}

impl AppServices {
    pub fn new(store: Arc<ArtifactStore>, policy: RiskPolicy) -> Self {
        let metrics = Arc::new(ServingMetrics::new());
        let predictor = PredictionService::new(store.clone())
            .with_policy(policy)
            .with_metrics(metrics.clone());
        Self {
            store,
            predictor,
            metrics,
        }
    }
}

/// Wire services from configuration and attempt the initial bundle load.
///
/// A failed load leaves the service running but not ready.
pub fn build_services(config: &ServiceConfig) -> AppServices {
    let store = Arc::new(ArtifactStore::new(&config.bundle_path));
    store.ensure_loaded();
    AppServices::new(store, config.risk_policy)
}
