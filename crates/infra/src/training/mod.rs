//! Offline training: corpus reading and the per-horizon orchestration.

mod corpus;
mod orchestrator;

pub use corpus::{CorpusError, parse_corpus, read_corpus};
pub use orchestrator::{
    EmptyPartitionPolicy, PartitionReport, PartitionStatus, TrainingConfig, TrainingError, TrainingMode,
    TrainingOrchestrator, TrainingOutcome, TrainingReport,
};
