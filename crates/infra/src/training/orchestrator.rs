use std::collections::BTreeMap;
use std::path::Path;
use std::thread;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use noshow_ai::{Artifact, ArtifactBundle, FitReport, PersistedBundle, TrainError, TrainParams, fit};
use noshow_core::{AppointmentRecord, Horizon, InsufficientDataError, LabeledAppointment, ValidationError};
use noshow_features::{FeatureCodec, FeatureVector, NeighbourhoodVocabulary};

use crate::artifacts::{ArtifactStore, PersistError};
use crate::training::corpus::{CorpusError, read_corpus};

/// What to do when a horizon partition has too little data to train on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyPartitionPolicy {
    /// Fail the whole run.
    #[default]
    Abort,
    /// Emit a bundle without that horizon.
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingMode {
    /// One artifact per horizon.
    #[default]
    Dual,
    /// One undifferentiated artifact over the whole corpus.
    Legacy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub params: TrainParams,
    pub empty_partition: EmptyPartitionPolicy,
    /// Fewest rows a partition needs before a classifier is fitted.
    pub min_partition_rows: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            params: TrainParams::default(),
            empty_partition: EmptyPartitionPolicy::Abort,
            min_partition_rows: 1,
        }
    }
}

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("corpus has no valid rows ({skipped} skipped)")]
    NoValidRows { skipped: usize },

    #[error(transparent)]
    InsufficientData(#[from] InsufficientDataError),

    #[error("training `{artifact}` failed: {source}")]
    Fit {
        artifact: String,
        #[source]
        source: TrainError,
    },

    #[error("training worker for `{0}` panicked")]
    WorkerPanicked(Horizon),

    #[error(transparent)]
    Corpus(#[from] CorpusError),

    #[error(transparent)]
    Persist(#[from] PersistError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PartitionStatus {
    Trained { fit: FitReport },
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionReport {
    /// `same_day`, `future` or `legacy`.
    pub artifact: String,
    pub rows: usize,
    #[serde(flatten)]
    pub status: PartitionStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub mode: TrainingMode,
    pub total_rows: usize,
    pub valid_rows: usize,
    pub skipped_rows: usize,
    /// Skipped rows keyed by the first offending field.
    pub skipped_by_field: BTreeMap<String, usize>,
    pub vocabulary_size: usize,
    pub partitions: Vec<PartitionReport>,
}

#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub bundle: ArtifactBundle,
    pub report: TrainingReport,
}

/// Encoded training rows for one artifact.
#[derive(Debug, Default)]
struct Partition {
    features: Vec<FeatureVector>,
    labels: Vec<bool>,
}

impl Partition {
    fn push(&mut self, features: FeatureVector, label: bool) {
        self.features.push(features);
        self.labels.push(label);
    }

    fn len(&self) -> usize {
        self.labels.len()
    }
}

/// Valid rows plus what was dropped on the way.
struct Prepared {
    records: Vec<(AppointmentRecord, bool)>,
    skipped_by_field: BTreeMap<String, usize>,
    total_rows: usize,
}

impl Prepared {
    fn skipped(&self) -> usize {
        self.skipped_by_field.values().sum()
    }
}

/// Offline batch job: labeled corpus in, artifact bundle out.
///
/// Nothing is written until [`run`](Self::run) persists the finished bundle,
/// so a run can be abandoned at any point before that without side effects.
#[derive(Debug, Clone, Default)]
pub struct TrainingOrchestrator {
    config: TrainingConfig,
}

impl TrainingOrchestrator {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train one artifact per horizon and emit a dual-horizon bundle.
    pub fn train(&self, rows: &[LabeledAppointment]) -> Result<TrainingOutcome, TrainingError> {
        let prepared = self.prepare(rows)?;
        let codec = FeatureCodec::fit(prepared.records.iter().map(|(r, _)| r));

        let mut same_day = Partition::default();
        let mut future = Partition::default();
        for (record, label) in &prepared.records {
            let encoded = codec.encode_record(record);
            match encoded.horizon() {
                Horizon::SameDay => same_day.push(encoded.vector, *label),
                Horizon::Future => future.push(encoded.vector, *label),
            }
        }
        info!(
            vocabulary = codec.vocabulary().len(),
            same_day_rows = same_day.len(),
            future_rows = future.len(),
            "partitioned training corpus"
        );

        let (same_day_result, future_result) = thread::scope(|s| {
            let same_day_worker = s.spawn(|| self.train_horizon(Horizon::SameDay, &same_day));
            let future_worker = s.spawn(|| self.train_horizon(Horizon::Future, &future));
            (
                same_day_worker
                    .join()
                    .unwrap_or(Err(TrainingError::WorkerPanicked(Horizon::SameDay))),
                future_worker
                    .join()
                    .unwrap_or(Err(TrainingError::WorkerPanicked(Horizon::Future))),
            )
        });

        let mut partitions = Vec::with_capacity(2);
        let same_day_artifact = self.settle(Horizon::SameDay, same_day.len(), same_day_result, &mut partitions)?;
        let future_artifact = self.settle(Horizon::Future, future.len(), future_result, &mut partitions)?;

        if same_day_artifact.is_none() && future_artifact.is_none() {
            return Err(InsufficientDataError {
                horizon: Horizon::SameDay,
                rows: same_day.len(),
                required: self.config.min_partition_rows,
            }
            .into());
        }

        let vocabulary: NeighbourhoodVocabulary = codec.vocabulary().clone();
        let report = TrainingReport {
            mode: TrainingMode::Dual,
            total_rows: prepared.total_rows,
            valid_rows: prepared.records.len(),
            skipped_rows: prepared.skipped(),
            skipped_by_field: prepared.skipped_by_field,
            vocabulary_size: vocabulary.len(),
            partitions,
        };
        Ok(TrainingOutcome {
            bundle: ArtifactBundle::DualHorizon {
                same_day: same_day_artifact,
                future: future_artifact,
                vocabulary,
            },
            report,
        })
    }

    /// Train a single artifact over every row and emit a legacy bundle.
    ///
    /// Legacy bundles carry no vocabulary, so neighbourhoods encode as unknown
    /// here exactly as they will at serving time.
    pub fn train_legacy(&self, rows: &[LabeledAppointment]) -> Result<TrainingOutcome, TrainingError> {
        let prepared = self.prepare(rows)?;
        let codec = FeatureCodec::new(NeighbourhoodVocabulary::empty());

        let mut all = Partition::default();
        for (record, label) in &prepared.records {
            all.push(codec.encode_record(record).vector, *label);
        }

        let (artifact, fit_report) = self.fit_artifact("legacy", &all)?;
        let report = TrainingReport {
            mode: TrainingMode::Legacy,
            total_rows: prepared.total_rows,
            valid_rows: prepared.records.len(),
            skipped_rows: prepared.skipped(),
            skipped_by_field: prepared.skipped_by_field,
            vocabulary_size: 0,
            partitions: vec![PartitionReport {
                artifact: "legacy".to_string(),
                rows: all.len(),
                status: PartitionStatus::Trained { fit: fit_report },
            }],
        };
        Ok(TrainingOutcome {
            bundle: ArtifactBundle::Legacy { artifact },
            report,
        })
    }

    /// Read `corpus`, train, and atomically write the bundle to `output`.
    pub fn run(
        &self,
        corpus: &Path,
        output: &Path,
        mode: TrainingMode,
    ) -> Result<(PersistedBundle, TrainingReport), TrainingError> {
        let rows = read_corpus(corpus)?;
        info!(corpus = %corpus.display(), rows = rows.len(), ?mode, "read training corpus");

        let outcome = match mode {
            TrainingMode::Dual => self.train(&rows)?,
            TrainingMode::Legacy => self.train_legacy(&rows)?,
        };

        let persisted = PersistedBundle::new(outcome.bundle);
        ArtifactStore::persist(output, &persisted)?;
        Ok((persisted, outcome.report))
    }

    fn prepare(&self, rows: &[LabeledAppointment]) -> Result<Prepared, TrainingError> {
        let mut records = Vec::with_capacity(rows.len());
        let mut skipped_by_field = BTreeMap::new();

        for (idx, row) in rows.iter().enumerate() {
            match validate_row(row) {
                Ok(valid) => records.push(valid),
                Err(e) => {
                    warn!(row = idx + 1, field = e.field, "skipping invalid training row: {e}");
                    *skipped_by_field.entry(e.field.to_string()).or_insert(0) += 1;
                }
            }
        }

        let prepared = Prepared {
            records,
            skipped_by_field,
            total_rows: rows.len(),
        };
        if prepared.records.is_empty() {
            return Err(TrainingError::NoValidRows {
                skipped: prepared.skipped(),
            });
        }
        Ok(prepared)
    }

    fn train_horizon(&self, horizon: Horizon, partition: &Partition) -> Result<(Artifact, FitReport), TrainingError> {
        let required = self.config.min_partition_rows.max(1);
        if partition.len() < required {
            return Err(InsufficientDataError {
                horizon,
                rows: partition.len(),
                required,
            }
            .into());
        }
        self.fit_artifact(horizon.as_str(), partition)
    }

    fn fit_artifact(&self, name: &str, partition: &Partition) -> Result<(Artifact, FitReport), TrainingError> {
        info!(artifact = name, rows = partition.len(), "training partition");
        let (artifact, report) =
            fit(name, &partition.features, &partition.labels, &self.config.params).map_err(|source| {
                TrainingError::Fit {
                    artifact: name.to_string(),
                    source,
                }
            })?;
        info!(
            artifact = name,
            rows = report.rows,
            train_rows = report.train_rows,
            validation_rows = report.validation_rows,
            rounds = report.rounds_run,
            best_round = report.best_round,
            validation_loss = report.best_validation_loss,
            "trained partition"
        );
        Ok((artifact, report))
    }

    /// Apply the empty-partition policy to one partition's result.
    fn settle(
        &self,
        horizon: Horizon,
        rows: usize,
        result: Result<(Artifact, FitReport), TrainingError>,
        reports: &mut Vec<PartitionReport>,
    ) -> Result<Option<Artifact>, TrainingError> {
        match result {
            Ok((artifact, fit)) => {
                reports.push(PartitionReport {
                    artifact: horizon.as_str().to_string(),
                    rows,
                    status: PartitionStatus::Trained { fit },
                });
                Ok(Some(artifact))
            }
            Err(TrainingError::InsufficientData(e)) if self.config.empty_partition == EmptyPartitionPolicy::Skip => {
                warn!(horizon = %horizon, rows, "{e}; bundle will lack this horizon");
                reports.push(PartitionReport {
                    artifact: horizon.as_str().to_string(),
                    rows,
                    status: PartitionStatus::Skipped { reason: e.to_string() },
                });
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

fn validate_row(row: &LabeledAppointment) -> Result<(AppointmentRecord, bool), ValidationError> {
    let record = AppointmentRecord::try_from(&row.appointment)?;
    let label = row.label()?;
    Ok((record, label))
}
