//! Reference probes: same-day vs 20-day lead, with and without an SMS reminder.

use serde::Serialize;
use serde_json::json;

use noshow_ai::{BundleProvider, PredictionService, RiskLevel};
use noshow_core::{PredictionError, RawAppointment};

#[derive(Debug, Clone, Serialize)]
pub struct ProbeOutcome {
    pub probe: &'static str,
    pub lead_days: u32,
    pub sms_received: bool,
    /// Artifact that answered, or `None` when the bundle lacks that horizon.
    pub route: Option<&'static str>,
    pub no_show_probability: Option<f64>,
    pub risk_level: Option<RiskLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

const SCHEDULED: &str = "2025-11-01";

const PROBES: [(&str, &str, bool); 4] = [
    ("same_day_no_sms", "2025-11-01", false),
    ("same_day_sms", "2025-11-01", true),
    ("future_20d_no_sms", "2025-11-21", false),
    ("future_20d_sms", "2025-11-21", true),
];

fn probe_record(appointment_day: &str, sms: bool) -> RawAppointment {
    RawAppointment {
        gender: Some(json!("F")),
        age: Some(json!(30)),
        neighbourhood: Some(json!("CENTRO")),
        scholarship: Some(json!(0)),
        hypertension: Some(json!(0)),
        diabetes: Some(json!(0)),
        alcoholism: Some(json!(0)),
        handicap: Some(json!(0)),
        sms_received: Some(json!(u8::from(sms))),
        scheduled_day: Some(json!(SCHEDULED)),
        appointment_day: Some(json!(appointment_day)),
    }
}

pub fn run_probes<P: BundleProvider>(service: &PredictionService<P>) -> Vec<ProbeOutcome> {
    PROBES
        .iter()
        .map(|&(probe, appointment_day, sms)| {
            let lead_days = if appointment_day == SCHEDULED { 0 } else { 20 };
            match service.predict(&probe_record(appointment_day, sms)) {
                Ok(result) => ProbeOutcome {
                    probe,
                    lead_days: result.lead_days,
                    sms_received: sms,
                    route: Some(result.route.as_str()),
                    no_show_probability: Some(result.probability),
                    risk_level: Some(result.risk_level),
                    error: None,
                },
                Err(e) => ProbeOutcome {
                    probe,
                    lead_days,
                    sms_received: sms,
                    route: None,
                    no_show_probability: None,
                    risk_level: None,
                    error: Some(match e {
                        PredictionError::ServiceUnavailable(reason) => reason,
                        other => other.to_string(),
                    }),
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use noshow_ai::{Artifact, ArtifactBundle, FixedBundle};
    use noshow_features::NeighbourhoodVocabulary;

    #[test]
    fn probes_report_the_answering_artifact() {
        let service = PredictionService::new(FixedBundle::new(ArtifactBundle::DualHorizon {
            same_day: Some(Artifact::constant("same_day", 0.1)),
            future: Some(Artifact::constant("future", 0.7)),
            vocabulary: NeighbourhoodVocabulary::fit(["CENTRO"]),
        }));

        let outcomes = run_probes(&service);
        assert_eq!(outcomes.len(), 4);
        assert_eq!(outcomes[0].route, Some("same_day"));
        assert_eq!(outcomes[0].lead_days, 0);
        assert_eq!(outcomes[2].route, Some("future"));
        assert_eq!(outcomes[2].lead_days, 20);
        assert_eq!(outcomes[3].risk_level, Some(RiskLevel::High));
    }

    #[test]
    fn missing_horizon_is_reported_not_fatal() {
        let service = PredictionService::new(FixedBundle::new(ArtifactBundle::DualHorizon {
            same_day: None,
            future: Some(Artifact::constant("future", 0.7)),
            vocabulary: NeighbourhoodVocabulary::empty(),
        }));

        let outcomes = run_probes(&service);
        assert!(outcomes[0].route.is_none());
        assert!(outcomes[0].error.is_some());
        assert_eq!(outcomes[2].route, Some("future"));
    }
}
