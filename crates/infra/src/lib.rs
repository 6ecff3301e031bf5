//! Infrastructure layer: bundle storage, artifact sync, corpus reading and
//! the training job.

pub mod artifacts;
pub mod training;

pub use artifacts::{ArtifactStore, ArtifactSync, MirrorSync, NoSync, PersistError, SyncError, SyncOutcome};
pub use training::{
    CorpusError, EmptyPartitionPolicy, PartitionReport, PartitionStatus, TrainingConfig, TrainingError, TrainingMode,
    TrainingOrchestrator, TrainingOutcome, TrainingReport, read_corpus,
};
