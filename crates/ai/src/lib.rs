//! `noshow-ai`
//!
//! **Responsibility:** the model side of no-show risk prediction.
//!
//! - [`artifact`]: opaque scorers and their persistable form.
//! - [`training`]: fitting one artifact with early stopping.
//! - [`bundle`]: the legacy / dual-horizon artifact sets and their blob format.
//! - [`router`]: picking the artifact for a request.
//! - [`service`]: the serving pipeline.
//!
//! Nothing here performs I/O; loading and persisting bundles lives in infra.

pub mod artifact;
pub mod bundle;
pub mod early_stopping;
pub mod result;
pub mod router;
pub mod service;
pub mod training;

pub use artifact::{Artifact, LogisticModel, ModelArtifact};
pub use bundle::{ArtifactBundle, BUNDLE_FORMAT_VERSION, PersistedBundle};
pub use early_stopping::EarlyStopping;
pub use result::{DEFAULT_RISK_THRESHOLD, InvalidThreshold, PredictionResult, RiskLevel, RiskPolicy};
pub use router::{Route, Selected, select};
pub use service::{BundleProvider, FixedBundle, PredictionService, ServingBundle};
pub use training::{FitReport, TrainError, TrainParams, fit, holdout_split};
