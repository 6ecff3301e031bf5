//! Artifact bundles and their persisted envelope.
//!
//! A bundle is produced once by training, written as one JSON blob, and loaded
//! read-only at serving start.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use noshow_core::{ArtifactLoadError, Horizon};
use noshow_features::{NeighbourhoodVocabulary, schema_names};

use crate::artifact::Artifact;

/// Version of the persisted envelope layout.
pub const BUNDLE_FORMAT_VERSION: u32 = 1;

/// The set of artifacts a serving process routes between.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactBundle {
    /// A single undifferentiated artifact from a pre-horizon deployment.
    Legacy { artifact: Artifact },
    /// One artifact per horizon plus the vocabulary both were trained with.
    ///
    /// A horizon may be absent when its partition had no data; requests for
    /// it are then answered as unavailable.
    DualHorizon {
        same_day: Option<Artifact>,
        future: Option<Artifact>,
        vocabulary: NeighbourhoodVocabulary,
    },
}

impl ArtifactBundle {
    pub fn variant_name(&self) -> &'static str {
        match self {
            ArtifactBundle::Legacy { .. } => "legacy",
            ArtifactBundle::DualHorizon { .. } => "dual_horizon",
        }
    }

    /// Horizons this bundle can answer for (a legacy bundle answers all).
    pub fn horizons(&self) -> Vec<Horizon> {
        match self {
            ArtifactBundle::Legacy { .. } => Horizon::ALL.to_vec(),
            ArtifactBundle::DualHorizon {
                same_day, future, ..
            } => {
                let mut out = Vec::with_capacity(2);
                if same_day.is_some() {
                    out.push(Horizon::SameDay);
                }
                if future.is_some() {
                    out.push(Horizon::Future);
                }
                out
            }
        }
    }

    /// Vocabulary to serve with. Legacy bundles never carried one.
    pub fn vocabulary(&self) -> NeighbourhoodVocabulary {
        match self {
            ArtifactBundle::Legacy { .. } => NeighbourhoodVocabulary::empty(),
            ArtifactBundle::DualHorizon { vocabulary, .. } => vocabulary.clone(),
        }
    }

    fn artifacts(&self) -> Vec<&Artifact> {
        match self {
            ArtifactBundle::Legacy { artifact } => vec![artifact],
            ArtifactBundle::DualHorizon {
                same_day, future, ..
            } => same_day.iter().chain(future.iter()).collect(),
        }
    }

    /// Structural checks applied on load.
    pub fn validate(&self) -> Result<(), ArtifactLoadError> {
        let artifacts = self.artifacts();
        if artifacts.is_empty() {
            return Err(ArtifactLoadError::NoArtifacts);
        }

        for artifact in artifacts {
            if !artifact.matches_schema() {
                return Err(ArtifactLoadError::SchemaMismatch {
                    artifact: artifact.name.clone(),
                    expected: schema_names(),
                    found: artifact.schema.clone(),
                });
            }
            if !artifact.model.is_finite() {
                return Err(ArtifactLoadError::Corrupt(format!(
                    "artifact `{}` has non-finite or non-positive parameters",
                    artifact.name
                )));
            }
        }

        if let ArtifactBundle::DualHorizon { vocabulary, .. } = self {
            vocabulary.validate().map_err(ArtifactLoadError::Corrupt)?;
        }
        Ok(())
    }
}

/// Bundle plus identity, as written to storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedBundle {
    pub format_version: u32,
    /// Time-ordered identifier of this training run.
    pub version: Uuid,
    pub created_at: DateTime<Utc>,
    pub bundle: ArtifactBundle,
}

impl PersistedBundle {
    pub fn new(bundle: ArtifactBundle) -> Self {
        Self {
            format_version: BUNDLE_FORMAT_VERSION,
            version: Uuid::now_v7(),
            created_at: Utc::now(),
            bundle,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Decode a stored blob.
    ///
    /// Accepts the current envelope, a bare bundle, or a bare artifact from a
    /// single-model deployment (wrapped as [`ArtifactBundle::Legacy`]).
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ArtifactLoadError> {
        let value: JsonValue = serde_json::from_slice(bytes)
            .map_err(|e| ArtifactLoadError::Corrupt(e.to_string()))?;

        let object = value.as_object().ok_or_else(|| {
            ArtifactLoadError::UnrecognizedShape("top-level value is not an object".to_string())
        })?;

        let persisted = if object.contains_key("bundle") {
            let persisted: PersistedBundle = serde_json::from_value(value)
                .map_err(|e| ArtifactLoadError::UnrecognizedShape(e.to_string()))?;
            if persisted.format_version > BUNDLE_FORMAT_VERSION {
                return Err(ArtifactLoadError::UnrecognizedShape(format!(
                    "format version {} is newer than supported {}",
                    persisted.format_version, BUNDLE_FORMAT_VERSION
                )));
            }
            persisted
        } else if object.contains_key("kind") {
            let bundle: ArtifactBundle = serde_json::from_value(value)
                .map_err(|e| ArtifactLoadError::UnrecognizedShape(e.to_string()))?;
            Self::unversioned(bundle)
        } else if object.contains_key("model") {
            let artifact: Artifact = serde_json::from_value(value)
                .map_err(|e| ArtifactLoadError::UnrecognizedShape(e.to_string()))?;
            Self::unversioned(ArtifactBundle::Legacy { artifact })
        } else {
            return Err(ArtifactLoadError::UnrecognizedShape(
                "expected a legacy artifact or a dual-horizon bundle".to_string(),
            ));
        };

        persisted.bundle.validate()?;
        Ok(persisted)
    }

    fn unversioned(bundle: ArtifactBundle) -> Self {
        Self {
            format_version: BUNDLE_FORMAT_VERSION,
            version: Uuid::nil(),
            created_at: DateTime::<Utc>::default(),
            bundle,
        }
    }
}
