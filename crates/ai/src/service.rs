//! Serving entry point: encode → route → score → classify.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use noshow_core::{PredictionError, RawAppointment};
use noshow_features::FeatureCodec;
use noshow_observability::ServingMetrics;

use crate::artifact::ModelArtifact;
use crate::bundle::{ArtifactBundle, PersistedBundle};
use crate::result::{PredictionResult, RiskPolicy};
use crate::router::{self, Route};

/// A loaded bundle together with the codec built from its vocabulary.
///
/// Immutable; shared across requests behind an `Arc`.
#[derive(Debug)]
pub struct ServingBundle {
    persisted: PersistedBundle,
    codec: FeatureCodec,
}

impl ServingBundle {
    pub fn new(persisted: PersistedBundle) -> Self {
        let codec = FeatureCodec::new(persisted.bundle.vocabulary());
        Self { persisted, codec }
    }

    /// Wrap a freshly built bundle (tests, inspection tools).
    pub fn from_bundle(bundle: ArtifactBundle) -> Self {
        Self::new(PersistedBundle::new(bundle))
    }

    pub fn bundle(&self) -> &ArtifactBundle {
        &self.persisted.bundle
    }

    pub fn persisted(&self) -> &PersistedBundle {
        &self.persisted
    }

    pub fn version(&self) -> Uuid {
        self.persisted.version
    }

    pub fn codec(&self) -> &FeatureCodec {
        &self.codec
    }
}

/// Source of the currently loaded bundle.
pub trait BundleProvider: Send + Sync {
    /// `None` while no usable bundle has been loaded.
    fn current(&self) -> Option<Arc<ServingBundle>>;
}

impl<P: BundleProvider + ?Sized> BundleProvider for Arc<P> {
    fn current(&self) -> Option<Arc<ServingBundle>> {
        (**self).current()
    }
}

/// Provider that always serves the same bundle.
#[derive(Debug, Clone)]
pub struct FixedBundle(Arc<ServingBundle>);

impl FixedBundle {
    pub fn new(bundle: ArtifactBundle) -> Self {
        Self(Arc::new(ServingBundle::from_bundle(bundle)))
    }
}

impl From<ServingBundle> for FixedBundle {
    fn from(bundle: ServingBundle) -> Self {
        Self(Arc::new(bundle))
    }
}

impl BundleProvider for FixedBundle {
    fn current(&self) -> Option<Arc<ServingBundle>> {
        Some(self.0.clone())
    }
}

/// Stateless predictor over whatever bundle `P` currently holds.
pub struct PredictionService<P> {
    provider: P,
    policy: RiskPolicy,
    metrics: Arc<ServingMetrics>,
}

impl<P: BundleProvider> PredictionService<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            policy: RiskPolicy::default(),
            metrics: Arc::new(ServingMetrics::new()),
        }
    }

    pub fn with_policy(mut self, policy: RiskPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<ServingMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn policy(&self) -> RiskPolicy {
        self.policy
    }

    pub fn metrics(&self) -> &Arc<ServingMetrics> {
        &self.metrics
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn is_ready(&self) -> bool {
        self.provider.current().is_some()
    }

    /// Predict the no-show risk of one appointment.
    ///
    /// Touches no shared state besides counters; safe to call concurrently.
    pub fn predict(&self, raw: &RawAppointment) -> Result<PredictionResult, PredictionError> {
        let Some(serving) = self.provider.current() else {
            self.metrics.unavailable.incr();
            return Err(PredictionError::unavailable("no model bundle is loaded"));
        };

        let encoded = serving.codec().encode(raw).inspect_err(|e| {
            self.metrics.validation_failures.incr();
            debug!(field = e.field, "rejected prediction input: {e}");
        })?;

        if !encoded.neighbourhood_known {
            self.metrics.unknown_neighbourhoods.incr();
            debug!("neighbourhood not in bundle vocabulary; encoded as unknown");
        }

        let selected = router::select(serving.bundle(), encoded.lead_days).inspect_err(|e| {
            self.metrics.unavailable.incr();
            warn!(lead_days = encoded.lead_days, "{e}");
        })?;

        match selected.route {
            Route::Legacy => self.metrics.predictions_legacy.incr(),
            Route::SameDay => self.metrics.predictions_same_day.incr(),
            Route::Future => self.metrics.predictions_future.incr(),
        }

        let probability = selected.artifact.score(&encoded.vector);
        Ok(PredictionResult {
            probability,
            risk_level: self.policy.classify(probability),
            route: selected.route,
            lead_days: encoded.lead_days,
            neighbourhood_known: encoded.neighbourhood_known,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::Artifact;
    use crate::result::RiskLevel;
    use noshow_features::NeighbourhoodVocabulary;
    use serde_json::json;

    struct NotLoaded;

    impl BundleProvider for NotLoaded {
        fn current(&self) -> Option<Arc<ServingBundle>> {
            None
        }
    }

    fn record(neighbourhood: &str, appointment: &str) -> RawAppointment {
        serde_json::from_value(json!({
            "gender": "F",
            "age": 30,
            "neighbourhood": neighbourhood,
            "scholarship": 0,
            "hipertension": 0,
            "diabetes": 0,
            "alcoholism": 0,
            "handcap": 0,
            "sms_received": 0,
            "scheduledday": "2025-11-01",
            "appointmentday": appointment,
        }))
        .unwrap()
    }

    fn dual_service() -> PredictionService<FixedBundle> {
        PredictionService::new(FixedBundle::new(ArtifactBundle::DualHorizon {
            same_day: Some(Artifact::constant("same_day", 0.2)),
            future: Some(Artifact::constant("future", 0.8)),
            vocabulary: NeighbourhoodVocabulary::fit(["CENTRO"]),
        }))
    }

    #[test]
    fn same_day_request_uses_same_day_artifact() {
        let svc = dual_service();
        let r = svc.predict(&record("CENTRO", "2025-11-01")).unwrap();
        assert_eq!(r.route, Route::SameDay);
        assert_eq!(r.lead_days, 0);
        assert!((r.probability - 0.2).abs() < 1e-9);
        assert_eq!(r.risk_level, RiskLevel::Low);
        assert!(r.neighbourhood_known);
    }

    #[test]
    fn future_request_uses_future_artifact() {
        let svc = dual_service();
        let r = svc.predict(&record("CENTRO", "2025-11-21")).unwrap();
        assert_eq!(r.route, Route::Future);
        assert_eq!(r.lead_days, 20);
        assert_eq!(r.risk_level, RiskLevel::High);
        assert_eq!(svc.metrics().snapshot().predictions_future, 1);
    }

    #[test]
    fn unseen_neighbourhood_succeeds_and_is_counted() {
        let svc = dual_service();
        let r = svc.predict(&record("ILHA DO FRADE", "2025-11-01")).unwrap();
        assert!(!r.neighbourhood_known);
        assert_eq!(svc.metrics().snapshot().unknown_neighbourhoods, 1);
    }

    #[test]
    fn legacy_bundle_answers_both_horizons() {
        let svc = PredictionService::new(FixedBundle::new(ArtifactBundle::Legacy {
            artifact: Artifact::constant("legacy", 0.6),
        }));
        for day in ["2025-11-01", "2025-11-21"] {
            let r = svc.predict(&record("CENTRO", day)).unwrap();
            assert_eq!(r.route, Route::Legacy);
            assert!(!r.neighbourhood_known);
        }
        assert_eq!(svc.metrics().snapshot().predictions_legacy, 2);
    }

    #[test]
    fn no_bundle_is_unavailable() {
        let svc = PredictionService::new(NotLoaded);
        assert!(!svc.is_ready());
        let err = svc.predict(&record("CENTRO", "2025-11-01")).unwrap_err();
        assert!(matches!(err, PredictionError::ServiceUnavailable(_)));
        assert_eq!(svc.metrics().snapshot().unavailable, 1);
    }

    #[test]
    fn missing_horizon_is_unavailable_not_a_panic() {
        let svc = PredictionService::new(FixedBundle::new(ArtifactBundle::DualHorizon {
            same_day: None,
            future: Some(Artifact::constant("future", 0.8)),
            vocabulary: NeighbourhoodVocabulary::empty(),
        }));
        assert!(matches!(
            svc.predict(&record("CENTRO", "2025-11-01")),
            Err(PredictionError::ServiceUnavailable(_))
        ));
        assert!(svc.predict(&record("CENTRO", "2025-11-02")).is_ok());
    }

    #[test]
    fn invalid_input_is_validation_error() {
        let svc = dual_service();
        let mut raw = record("CENTRO", "2025-11-01");
        raw.gender = Some(json!("unknown"));
        let err = svc.predict(&raw).unwrap_err();
        match err {
            PredictionError::Validation(e) => assert_eq!(e.field, "gender"),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(svc.metrics().snapshot().validation_failures, 1);
    }

    #[test]
    fn configured_threshold_applies() {
        let svc = dual_service().with_policy(RiskPolicy::new(0.1).unwrap());
        let r = svc.predict(&record("CENTRO", "2025-11-01")).unwrap();
        assert_eq!(r.risk_level, RiskLevel::High);
    }

    #[test]
    fn concurrent_predictions_agree() {
        let svc = Arc::new(dual_service());
        let expected = svc.predict(&record("CENTRO", "2025-11-05")).unwrap();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let svc = svc.clone();
                std::thread::spawn(move || svc.predict(&record("CENTRO", "2025-11-05")).unwrap())
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), expected);
        }
    }
}
