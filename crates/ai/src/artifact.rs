//! Trained classifiers, consumed only through their scoring interface.

use serde::{Deserialize, Serialize};

use noshow_features::{FEATURE_COUNT, FeatureVector, schema_names};

/// Opaque binary classifier.
pub trait ModelArtifact: Send + Sync {
    /// Probability of the positive class (a no-show), in `[0, 1]`.
    fn score(&self, features: &FeatureVector) -> f64;
}

/// Standardised logistic model over the full feature vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub means: [f64; FEATURE_COUNT],
    pub scales: [f64; FEATURE_COUNT],
    pub weights: [f64; FEATURE_COUNT],
    pub bias: f64,
}

impl LogisticModel {
    /// Model that ignores its input and always answers `probability`.
    pub fn constant(probability: f64) -> Self {
        Self {
            means: [0.0; FEATURE_COUNT],
            scales: [1.0; FEATURE_COUNT],
            weights: [0.0; FEATURE_COUNT],
            bias: logit(probability),
        }
    }

    /// Raw margin before the sigmoid.
    pub fn margin(&self, x: &[f64]) -> f64 {
        let mut z = self.bias;
        for i in 0..FEATURE_COUNT {
            z += self.weights[i] * (x[i] - self.means[i]) / self.scales[i];
        }
        z
    }

    pub fn is_finite(&self) -> bool {
        self.bias.is_finite()
            && self
                .means
                .iter()
                .chain(self.scales.iter())
                .chain(self.weights.iter())
                .all(|v| v.is_finite())
            && self.scales.iter().all(|s| *s > 0.0)
    }
}

/// A trained, persistable artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    /// Which horizon (or `legacy`) the artifact was trained for.
    pub name: String,
    /// Feature names, in the order the model consumed them.
    pub schema: Vec<String>,
    pub model: LogisticModel,
    #[serde(default)]
    pub trained_rows: usize,
    #[serde(default)]
    pub best_round: usize,
    #[serde(default)]
    pub validation_loss: Option<f64>,
}

impl Artifact {
    pub fn new(name: impl Into<String>, model: LogisticModel) -> Self {
        Self {
            name: name.into(),
            schema: schema_names(),
            model,
            trained_rows: 0,
            best_round: 0,
            validation_loss: None,
        }
    }

    /// Artifact answering a fixed probability; the base-rate model.
    pub fn constant(name: impl Into<String>, probability: f64) -> Self {
        Self::new(name, LogisticModel::constant(probability))
    }

    /// Whether the artifact was trained on the current feature layout.
    pub fn matches_schema(&self) -> bool {
        self.schema == schema_names()
    }
}

impl ModelArtifact for Artifact {
    fn score(&self, features: &FeatureVector) -> f64 {
        sigmoid(self.model.margin(features.as_slice())).clamp(0.0, 1.0)
    }
}

pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Inverse sigmoid, with the input clamped away from 0 and 1.
pub fn logit(p: f64) -> f64 {
    let p = p.clamp(1e-12, 1.0 - 1e-12);
    (p / (1.0 - p)).ln()
}

#[cfg(test)]
mod tests {
    use super::*;
    use noshow_features::FeatureField;

    #[test]
    fn constant_artifact_ignores_input() {
        let a = Artifact::constant("same_day", 0.2);
        let x = FeatureVector::from_fn(|f| f.index() as f64);
        let y = x.with(FeatureField::Age, 90.0);
        assert!((a.score(&x) - 0.2).abs() < 1e-9);
        assert_eq!(a.score(&x), a.score(&y));
    }

    #[test]
    fn weights_move_score_in_their_direction() {
        let mut model = LogisticModel::constant(0.5);
        model.weights[FeatureField::SmsReceived.index()] = -1.0;
        let a = Artifact::new("future", model);

        let without = FeatureVector::from_fn(|_| 0.0);
        let with = without.with(FeatureField::SmsReceived, 1.0);
        assert!(a.score(&with) < a.score(&without));
    }

    #[test]
    fn new_artifact_carries_current_schema() {
        let a = Artifact::constant("legacy", 0.3);
        assert!(a.matches_schema());
        let mut stale = a.clone();
        stale.schema.pop();
        assert!(!stale.matches_schema());
    }

    #[test]
    fn logit_inverts_sigmoid() {
        for p in [0.01, 0.25, 0.5, 0.9] {
            assert!((sigmoid(logit(p)) - p).abs() < 1e-12);
        }
        assert!(logit(0.0).is_finite());
        assert!(logit(1.0).is_finite());
    }
}
