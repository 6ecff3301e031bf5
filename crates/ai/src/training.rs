//! Classifier training: seeded holdout split, gradient descent, early stopping.
//!
//! Model:
//! - Standardise every feature with the training rows' mean/std.
//! - Start from the base rate (zero weights, bias = logit(positive rate)).
//! - Full-batch gradient descent on L2-penalised log loss.
//! - After each round evaluate held-out log loss; stop once it has not
//!   improved for `patience` rounds and keep the best round's weights.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use noshow_features::{FEATURE_COUNT, FeatureVector};

use crate::artifact::{Artifact, LogisticModel, logit, sigmoid};
use crate::early_stopping::EarlyStopping;

/// Hyper-parameters for one classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainParams {
    pub learning_rate: f64,
    pub max_rounds: usize,
    pub patience: usize,
    pub l2: f64,
    /// Share of rows held out for early stopping.
    pub validation_fraction: f64,
    pub seed: u64,
}

impl Default for TrainParams {
    fn default() -> Self {
        Self {
            learning_rate: 0.5,
            max_rounds: 300,
            patience: 5,
            l2: 1e-4,
            validation_fraction: 0.2,
            seed: 42,
        }
    }
}

impl TrainParams {
    pub fn validate(&self) -> Result<(), TrainError> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(TrainError::InvalidParams(
                "learning_rate must be a finite positive number".to_string(),
            ));
        }
        if !(self.l2.is_finite() && self.l2 >= 0.0) {
            return Err(TrainError::InvalidParams(
                "l2 must be a finite non-negative number".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.validation_fraction) {
            return Err(TrainError::InvalidParams(
                "validation_fraction must be in [0, 1)".to_string(),
            ));
        }
        if self.max_rounds == 0 {
            return Err(TrainError::InvalidParams("max_rounds must be >= 1".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrainError {
    #[error("no training rows")]
    EmptyDataset,

    #[error("{features} feature rows but {labels} labels")]
    LengthMismatch { features: usize, labels: usize },

    #[error("invalid training parameters: {0}")]
    InvalidParams(String),
}

/// Statistics for one trained artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    pub rows: usize,
    pub train_rows: usize,
    pub validation_rows: usize,
    pub positive_rate: f64,
    pub rounds_run: usize,
    pub best_round: usize,
    pub best_validation_loss: f64,
}

/// Train one artifact named `name` on `(features, labels)`.
pub fn fit(
    name: &str,
    features: &[FeatureVector],
    labels: &[bool],
    params: &TrainParams,
) -> Result<(Artifact, FitReport), TrainError> {
    params.validate()?;
    if features.len() != labels.len() {
        return Err(TrainError::LengthMismatch {
            features: features.len(),
            labels: labels.len(),
        });
    }
    if features.is_empty() {
        return Err(TrainError::EmptyDataset);
    }

    let (train_idx, val_idx) = holdout_split(features.len(), params.validation_fraction, params.seed);
    let holdout_rows = val_idx.len();
    // Tiny partitions can end up without a holdout; validate on the training rows then.
    let val_idx = if val_idx.is_empty() { train_idx.clone() } else { val_idx };

    let (means, scales) = standardisation(features, &train_idx);
    let standardise = |idx: &[usize]| -> Vec<[f64; FEATURE_COUNT]> {
        idx.iter()
            .map(|&i| {
                let x = features[i].as_slice();
                let mut z = [0.0; FEATURE_COUNT];
                for j in 0..FEATURE_COUNT {
                    z[j] = (x[j] - means[j]) / scales[j];
                }
                z
            })
            .collect()
    };
    let x_train = standardise(&train_idx);
    let y_train: Vec<f64> = train_idx.iter().map(|&i| target(labels[i])).collect();
    let x_val = standardise(&val_idx);
    let y_val: Vec<f64> = val_idx.iter().map(|&i| target(labels[i])).collect();

    let positive_rate = y_train.iter().sum::<f64>() / y_train.len() as f64;
    let mut weights = [0.0; FEATURE_COUNT];
    let mut bias = logit(positive_rate);

    let mut stopper = EarlyStopping::new(params.patience);
    let mut best = (weights, bias);
    let n = x_train.len() as f64;

    for _ in 0..params.max_rounds {
        let mut grad_w = [0.0; FEATURE_COUNT];
        let mut grad_b = 0.0;
        for (x, y) in x_train.iter().zip(&y_train) {
            let err = sigmoid(margin(&weights, bias, x)) - y;
            for j in 0..FEATURE_COUNT {
                grad_w[j] += err * x[j];
            }
            grad_b += err;
        }
        for j in 0..FEATURE_COUNT {
            weights[j] -= params.learning_rate * (grad_w[j] / n + params.l2 * weights[j]);
        }
        bias -= params.learning_rate * grad_b / n;

        let stop = stopper.should_stop(log_loss(&weights, bias, &x_val, &y_val));
        if stopper.improved_last_round() {
            best = (weights, bias);
        }
        if stop {
            break;
        }
    }

    let (weights, bias) = best;
    let best_validation_loss = stopper
        .best_value()
        .unwrap_or_else(|| log_loss(&weights, bias, &x_val, &y_val));

    let mut artifact = Artifact::new(
        name,
        LogisticModel {
            means,
            scales,
            weights,
            bias,
        },
    );
    artifact.trained_rows = features.len();
    artifact.best_round = stopper.best_round();
    artifact.validation_loss = Some(best_validation_loss);

    let report = FitReport {
        rows: features.len(),
        train_rows: train_idx.len(),
        validation_rows: holdout_rows,
        positive_rate,
        rounds_run: stopper.rounds_seen(),
        best_round: stopper.best_round(),
        best_validation_loss,
    };

    Ok((artifact, report))
}

/// Deterministic shuffled split into `(train, validation)` row indices.
///
/// The validation share is rounded up but always leaves one training row.
pub fn holdout_split(rows: usize, validation_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut idx: Vec<usize> = (0..rows).collect();
    idx.shuffle(&mut StdRng::seed_from_u64(seed));

    let wanted = (rows as f64 * validation_fraction).ceil() as usize;
    let n_val = wanted.min(rows.saturating_sub(1));
    let train = idx.split_off(n_val);
    (train, idx)
}

fn standardisation(
    features: &[FeatureVector],
    rows: &[usize],
) -> ([f64; FEATURE_COUNT], [f64; FEATURE_COUNT]) {
    let n = rows.len() as f64;
    let mut means = [0.0; FEATURE_COUNT];
    for &i in rows {
        for (m, x) in means.iter_mut().zip(features[i].as_slice()) {
            *m += x / n;
        }
    }

    let mut scales = [0.0; FEATURE_COUNT];
    for &i in rows {
        for j in 0..FEATURE_COUNT {
            let d = features[i].as_slice()[j] - means[j];
            scales[j] += d * d / n;
        }
    }
    for s in scales.iter_mut() {
        let std = s.sqrt();
        // Constant columns contribute nothing; avoid dividing by zero.
        *s = if std > 1e-12 { std } else { 1.0 };
    }

    (means, scales)
}

fn target(label: bool) -> f64 {
    if label { 1.0 } else { 0.0 }
}

fn margin(weights: &[f64; FEATURE_COUNT], bias: f64, x: &[f64; FEATURE_COUNT]) -> f64 {
    bias + weights.iter().zip(x).map(|(w, v)| w * v).sum::<f64>()
}

fn log_loss(
    weights: &[f64; FEATURE_COUNT],
    bias: f64,
    xs: &[[f64; FEATURE_COUNT]],
    ys: &[f64],
) -> f64 {
    const EPS: f64 = 1e-15;
    let total: f64 = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| {
            let p = sigmoid(margin(weights, bias, x)).clamp(EPS, 1.0 - EPS);
            -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
        })
        .sum();
    total / xs.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ModelArtifact;
    use noshow_features::FeatureField;

    /// Rows where an SMS makes a no-show much less likely.
    fn sms_dataset(rows: usize) -> (Vec<FeatureVector>, Vec<bool>) {
        let mut features = Vec::with_capacity(rows);
        let mut labels = Vec::with_capacity(rows);
        for i in 0..rows {
            let sms = i % 2 == 0;
            let x = FeatureVector::from_fn(|f| match f {
                FeatureField::SmsReceived => if sms { 1.0 } else { 0.0 },
                FeatureField::Age => 40.0,
                FeatureField::ScheduledYear => 2016.0,
                FeatureField::LeadDays => 7.0,
                _ => 0.0,
            });
            features.push(x);
            // 1 in 10 no-shows with SMS, 6 in 10 without.
            labels.push(if sms { i % 20 == 0 } else { i % 10 < 6 });
        }
        (features, labels)
    }

    #[test]
    fn holdout_split_is_seeded_and_disjoint() {
        let (a_train, a_val) = holdout_split(100, 0.2, 42);
        let (b_train, b_val) = holdout_split(100, 0.2, 42);
        assert_eq!(a_train, b_train);
        assert_eq!(a_val, b_val);
        assert_eq!(a_val.len(), 20);
        assert_eq!(a_train.len(), 80);
        assert!(a_val.iter().all(|i| !a_train.contains(i)));

        let (c_train, _) = holdout_split(100, 0.2, 7);
        assert_ne!(a_train, c_train);
    }

    #[test]
    fn holdout_split_keeps_a_training_row() {
        let (train, val) = holdout_split(1, 0.2, 42);
        assert_eq!(train, vec![0]);
        assert!(val.is_empty());
    }

    #[test]
    fn learns_the_sms_effect() {
        let (features, labels) = sms_dataset(400);
        let (artifact, report) = fit("future", &features, &labels, &TrainParams::default()).unwrap();

        let base = features[1].with(FeatureField::SmsReceived, 0.0);
        let with_sms = base.with(FeatureField::SmsReceived, 1.0);
        assert!(artifact.score(&with_sms) < artifact.score(&base));
        assert_eq!(report.rows, 400);
        assert_eq!(report.validation_rows, 80);
        assert!(report.best_validation_loss < std::f64::consts::LN_2);
        assert_eq!(artifact.validation_loss, Some(report.best_validation_loss));
    }

    #[test]
    fn training_is_deterministic() {
        let (features, labels) = sms_dataset(120);
        let params = TrainParams::default();
        let (a, _) = fit("same_day", &features, &labels, &params).unwrap();
        let (b, _) = fit("same_day", &features, &labels, &params).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn early_stopping_bounds_rounds() {
        let (features, labels) = sms_dataset(200);
        let params = TrainParams {
            max_rounds: 10_000,
            patience: 3,
            ..TrainParams::default()
        };
        let (_, report) = fit("future", &features, &labels, &params).unwrap();
        assert!(report.rounds_run < 10_000);
        assert!(report.rounds_run - report.best_round <= params.patience + 1);
    }

    #[test]
    fn single_row_partition_still_trains() {
        let (features, labels) = sms_dataset(1);
        let (artifact, report) = fit("same_day", &features, &labels, &TrainParams::default()).unwrap();
        assert_eq!(report.validation_rows, 0);
        assert!(artifact.model.is_finite());
    }

    #[test]
    fn rejects_empty_and_mismatched_input() {
        let params = TrainParams::default();
        assert_eq!(fit("x", &[], &[], &params).unwrap_err(), TrainError::EmptyDataset);

        let (features, _) = sms_dataset(3);
        assert!(matches!(
            fit("x", &features, &[true], &params),
            Err(TrainError::LengthMismatch { features: 3, labels: 1 })
        ));
    }

    #[test]
    fn rejects_bad_params() {
        let params = TrainParams {
            validation_fraction: 1.0,
            ..TrainParams::default()
        };
        assert!(matches!(params.validate(), Err(TrainError::InvalidParams(_))));
    }
}
