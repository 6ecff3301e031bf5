//! `noshow-core`: appointment records, horizons and the error taxonomy.
//!
//! This crate is pure: no I/O, no logging, no model code.

pub mod error;
pub mod horizon;
pub mod record;

pub use error::{
    ArtifactLoadError, InsufficientDataError, PredictionError, ValidationError, ValidationIssue,
};
pub use horizon::{Horizon, lead_days};
pub use record::{AppointmentRecord, Gender, LabeledAppointment, RawAppointment, parse_calendar_date};
