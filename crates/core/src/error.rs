//! Error taxonomy shared by serving and training.
//!
//! Each layer owns one failure family:
//! - [`ValidationError`]: client-caused, malformed or missing input.
//! - [`PredictionError`]: what the serving path can return.
//! - [`ArtifactLoadError`]: bundle missing, unreadable or of an unknown shape.
//! - [`InsufficientDataError`]: a training partition had nothing to learn from.

use std::path::PathBuf;

use thiserror::Error;

use crate::horizon::Horizon;

/// What exactly was wrong with an input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// The field was absent (or null).
    Missing,
    /// An enumerated field held a value outside its domain.
    Unrecognized(String),
    /// A date/timestamp field could not be parsed as ISO-8601.
    InvalidDate(String),
    /// A numeric field was outside its permitted range.
    OutOfRange(String),
}

impl core::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ValidationIssue::Missing => f.write_str("is required"),
            ValidationIssue::Unrecognized(v) => write!(f, "has unrecognized value {v:?}"),
            ValidationIssue::InvalidDate(v) => write!(f, "is not an ISO-8601 date: {v:?}"),
            ValidationIssue::OutOfRange(v) => write!(f, "is out of range: {v}"),
        }
    }
}

/// Input validation failure, naming the offending field by its wire name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field `{field}` {issue}")]
pub struct ValidationError {
    pub field: &'static str,
    pub issue: ValidationIssue,
}

impl ValidationError {
    pub fn missing(field: &'static str) -> Self {
        Self {
            field,
            issue: ValidationIssue::Missing,
        }
    }

    pub fn unrecognized(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            issue: ValidationIssue::Unrecognized(value.into()),
        }
    }

    pub fn invalid_date(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            issue: ValidationIssue::InvalidDate(value.into()),
        }
    }

    pub fn out_of_range(field: &'static str, detail: impl Into<String>) -> Self {
        Self {
            field,
            issue: ValidationIssue::OutOfRange(detail.into()),
        }
    }
}

/// Failure of a single prediction call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredictionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No bundle is loaded, or the loaded bundle lacks the requested horizon.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl PredictionError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::ServiceUnavailable(reason.into())
    }
}

/// Failure to obtain a usable artifact bundle.
#[derive(Debug, Error)]
pub enum ArtifactLoadError {
    #[error("artifact bundle not found at {0}")]
    Missing(PathBuf),

    #[error("failed to read artifact bundle: {0}")]
    Io(#[from] std::io::Error),

    #[error("artifact bundle is corrupt: {0}")]
    Corrupt(String),

    /// The blob parsed, but as neither a legacy nor a dual-horizon bundle.
    #[error("artifact bundle matches no recognized shape: {0}")]
    UnrecognizedShape(String),

    /// An artifact was trained against a different feature layout.
    #[error("artifact `{artifact}` was trained on feature schema {found:?}, expected {expected:?}")]
    SchemaMismatch {
        artifact: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("artifact bundle contains no artifacts")]
    NoArtifacts,
}

/// A training partition was empty (or below the configured minimum).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("insufficient data for {horizon} model: {rows} row(s), need at least {required}")]
pub struct InsufficientDataError {
    pub horizon: Horizon,
    pub rows: usize,
    pub required: usize,
}
