use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::router::Route;

/// Default decision threshold for [`RiskLevel::High`].
pub const DEFAULT_RISK_THRESHOLD: f64 = 0.5;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::High => "High",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("risk threshold must be a finite number in [0, 1], got {0}")]
pub struct InvalidThreshold(pub f64);

/// Maps a probability to a risk level: `High` iff `probability > threshold`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RiskPolicy {
    threshold: f64,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_RISK_THRESHOLD,
        }
    }
}

impl RiskPolicy {
    pub fn new(threshold: f64) -> Result<Self, InvalidThreshold> {
        if threshold.is_finite() && (0.0..=1.0).contains(&threshold) {
            Ok(Self { threshold })
        } else {
            Err(InvalidThreshold(threshold))
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn classify(&self, probability: f64) -> RiskLevel {
        if probability > self.threshold {
            RiskLevel::High
        } else {
            RiskLevel::Low
        }
    }
}

/// Outcome of one prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// No-show probability in `[0, 1]`.
    pub probability: f64,
    pub risk_level: RiskLevel,
    pub route: Route,
    pub lead_days: u32,
    pub neighbourhood_known: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_is_low() {
        let policy = RiskPolicy::default();
        assert_eq!(policy.classify(0.5), RiskLevel::Low);
        assert_eq!(policy.classify(0.500_000_1), RiskLevel::High);
        assert_eq!(policy.classify(0.0), RiskLevel::Low);
        assert_eq!(policy.classify(1.0), RiskLevel::High);
    }

    #[test]
    fn custom_threshold() {
        let policy = RiskPolicy::new(0.3).unwrap();
        assert_eq!(policy.classify(0.31), RiskLevel::High);
        assert_eq!(policy.classify(0.3), RiskLevel::Low);
    }

    #[test]
    fn invalid_threshold_rejected() {
        assert!(RiskPolicy::new(f64::NAN).is_err());
        assert!(RiskPolicy::new(1.5).is_err());
        assert!(RiskPolicy::new(-0.1).is_err());
    }

    #[test]
    fn risk_level_serializes_as_title_case() {
        assert_eq!(serde_json::to_value(RiskLevel::High).unwrap(), serde_json::json!("High"));
        assert_eq!(serde_json::to_value(RiskLevel::Low).unwrap(), serde_json::json!("Low"));
    }
}
