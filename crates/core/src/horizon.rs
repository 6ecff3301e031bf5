//! Lead time and the two operating horizons it partitions appointments into.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Operating regime of a dedicated classifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
    /// Appointment on the day it was booked (`lead_days == 0`).
    SameDay,
    /// Appointment booked at least one day ahead (`lead_days > 0`).
    Future,
}

impl Horizon {
    pub const ALL: [Horizon; 2] = [Horizon::SameDay, Horizon::Future];

    pub fn from_lead_days(lead_days: u32) -> Self {
        if lead_days == 0 {
            Horizon::SameDay
        } else {
            Horizon::Future
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Horizon::SameDay => "same_day",
            Horizon::Future => "future",
        }
    }
}

impl core::fmt::Display for Horizon {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whole days from booking to appointment, clamped at zero.
///
/// Both inputs are calendar dates; time-of-day has already been discarded.
pub fn lead_days(scheduled: NaiveDate, appointment: NaiveDate) -> u32 {
    let days = appointment.signed_duration_since(scheduled).num_days();
    u32::try_from(days.max(0)).unwrap_or(u32::MAX)
}
