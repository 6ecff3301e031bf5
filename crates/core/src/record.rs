//! Appointment records: the lenient wire shape and its validated form.
//!
//! `RawAppointment` accepts anything JSON can carry so that every problem is
//! reported as a [`ValidationError`] naming the field, never as an opaque
//! deserialization failure.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::ValidationError;

pub const MAX_AGE: u32 = 150;
pub const MAX_HANDICAP_LEVEL: u8 = 4;

/// Appointment as received from a caller or a corpus row.
///
/// Field aliases accept the historical column names of the source dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAppointment {
    #[serde(default, alias = "Gender")]
    pub gender: Option<JsonValue>,
    #[serde(default, alias = "Age")]
    pub age: Option<JsonValue>,
    #[serde(default, alias = "Neighbourhood")]
    pub neighbourhood: Option<JsonValue>,
    #[serde(default, alias = "Scholarship")]
    pub scholarship: Option<JsonValue>,
    #[serde(default, alias = "hipertension", alias = "Hipertension")]
    pub hypertension: Option<JsonValue>,
    #[serde(default, alias = "Diabetes")]
    pub diabetes: Option<JsonValue>,
    #[serde(default, alias = "Alcoholism")]
    pub alcoholism: Option<JsonValue>,
    #[serde(default, alias = "handcap", alias = "Handcap")]
    pub handicap: Option<JsonValue>,
    #[serde(default, alias = "SMS_received")]
    pub sms_received: Option<JsonValue>,
    #[serde(default, alias = "scheduledday", alias = "ScheduledDay")]
    pub scheduled_day: Option<JsonValue>,
    #[serde(default, alias = "appointmentday", alias = "AppointmentDay")]
    pub appointment_day: Option<JsonValue>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Gender {
    /// Model encoding: M→1, F→0.
    pub fn code(&self) -> u8 {
        match self {
            Gender::Male => 1,
            Gender::Female => 0,
        }
    }
}

/// A validated appointment. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentRecord {
    pub gender: Gender,
    pub age: u32,
    pub neighbourhood: String,
    pub scholarship: bool,
    pub hypertension: bool,
    pub diabetes: bool,
    pub alcoholism: bool,
    pub handicap_level: u8,
    pub sms_received: bool,
    /// Booking date with time-of-day discarded.
    pub scheduled_date: NaiveDate,
    /// Appointment date with time-of-day discarded.
    pub appointment_date: NaiveDate,
}

impl TryFrom<&RawAppointment> for AppointmentRecord {
    type Error = ValidationError;

    fn try_from(raw: &RawAppointment) -> Result<Self, Self::Error> {
        Ok(Self {
            gender: parse_gender(raw.gender.as_ref())?,
            age: parse_age(raw.age.as_ref())?,
            neighbourhood: parse_neighbourhood(raw.neighbourhood.as_ref())?,
            scholarship: parse_flag("scholarship", raw.scholarship.as_ref())?,
            hypertension: parse_flag("hypertension", raw.hypertension.as_ref())?,
            diabetes: parse_flag("diabetes", raw.diabetes.as_ref())?,
            alcoholism: parse_flag("alcoholism", raw.alcoholism.as_ref())?,
            handicap_level: parse_handicap(raw.handicap.as_ref())?,
            sms_received: parse_flag("sms_received", raw.sms_received.as_ref())?,
            scheduled_date: parse_date("scheduled_day", raw.scheduled_day.as_ref())?,
            appointment_date: parse_date("appointment_day", raw.appointment_day.as_ref())?,
        })
    }
}

/// A corpus row: an appointment plus its observed outcome.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabeledAppointment {
    #[serde(flatten)]
    pub appointment: RawAppointment,
    #[serde(default, alias = "noshow", alias = "No-show")]
    pub no_show: Option<JsonValue>,
}

impl LabeledAppointment {
    /// Outcome label: `true` when the patient did not show up.
    ///
    /// Accepts `"Yes"`/`"No"`, booleans and `0`/`1`.
    pub fn label(&self) -> Result<bool, ValidationError> {
        const FIELD: &str = "no_show";
        match present(self.no_show.as_ref()).ok_or(ValidationError::missing(FIELD))? {
            JsonValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "yes" | "1" | "true" => Ok(true),
                "no" | "0" | "false" => Ok(false),
                _ => Err(ValidationError::unrecognized(FIELD, s.clone())),
            },
            other => flag_value(FIELD, other),
        }
    }
}

fn present(value: Option<&JsonValue>) -> Option<&JsonValue> {
    value.filter(|v| !v.is_null())
}

fn parse_gender(value: Option<&JsonValue>) -> Result<Gender, ValidationError> {
    const FIELD: &str = "gender";
    let value = present(value).ok_or(ValidationError::missing(FIELD))?;
    let s = value
        .as_str()
        .ok_or_else(|| ValidationError::unrecognized(FIELD, value.to_string()))?;
    match s.trim() {
        "M" | "m" => Ok(Gender::Male),
        "F" | "f" => Ok(Gender::Female),
        other => Err(ValidationError::unrecognized(FIELD, other)),
    }
}

fn parse_age(value: Option<&JsonValue>) -> Result<u32, ValidationError> {
    const FIELD: &str = "age";
    let value = present(value).ok_or(ValidationError::missing(FIELD))?;
    let age = value
        .as_i64()
        .ok_or_else(|| ValidationError::unrecognized(FIELD, value.to_string()))?;
    match u32::try_from(age) {
        Ok(age) if age <= MAX_AGE => Ok(age),
        _ => Err(ValidationError::out_of_range(
            FIELD,
            format!("{age} not in 0..={MAX_AGE}"),
        )),
    }
}

fn parse_neighbourhood(value: Option<&JsonValue>) -> Result<String, ValidationError> {
    const FIELD: &str = "neighbourhood";
    let value = present(value).ok_or(ValidationError::missing(FIELD))?;
    let name = value
        .as_str()
        .ok_or_else(|| ValidationError::unrecognized(FIELD, value.to_string()))?
        .trim();
    if name.is_empty() {
        return Err(ValidationError::missing(FIELD));
    }
    Ok(name.to_string())
}

fn parse_flag(field: &'static str, value: Option<&JsonValue>) -> Result<bool, ValidationError> {
    let value = present(value).ok_or(ValidationError::missing(field))?;
    flag_value(field, value)
}

fn flag_value(field: &'static str, value: &JsonValue) -> Result<bool, ValidationError> {
    match value {
        JsonValue::Bool(b) => Ok(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(ValidationError::unrecognized(field, n.to_string())),
        },
        other => Err(ValidationError::unrecognized(field, other.to_string())),
    }
}

fn parse_handicap(value: Option<&JsonValue>) -> Result<u8, ValidationError> {
    const FIELD: &str = "handicap";
    let value = present(value).ok_or(ValidationError::missing(FIELD))?;
    let level = value
        .as_i64()
        .ok_or_else(|| ValidationError::unrecognized(FIELD, value.to_string()))?;
    match u8::try_from(level) {
        Ok(level) if level <= MAX_HANDICAP_LEVEL => Ok(level),
        _ => Err(ValidationError::out_of_range(
            FIELD,
            format!("{level} not in 0..={MAX_HANDICAP_LEVEL}"),
        )),
    }
}

fn parse_date(field: &'static str, value: Option<&JsonValue>) -> Result<NaiveDate, ValidationError> {
    let value = present(value).ok_or(ValidationError::missing(field))?;
    let s = value
        .as_str()
        .ok_or_else(|| ValidationError::invalid_date(field, value.to_string()))?;
    parse_calendar_date(s).ok_or_else(|| ValidationError::invalid_date(field, s))
}

/// Parse an ISO-8601 date or timestamp and keep only its calendar date.
///
/// Offset-bearing timestamps keep the date as written (local to that offset).
pub fn parse_calendar_date(input: &str) -> Option<NaiveDate> {
    let s = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local().date());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}
