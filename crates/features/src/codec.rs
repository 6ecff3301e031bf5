//! Record → [`FeatureVector`] encoding.
//!
//! The codec is the only place derived fields are computed. Training and
//! serving both go through [`FeatureCodec::encode_record`]; the only thing that
//! differs between them is where the vocabulary comes from.

use std::sync::Arc;

use chrono::Datelike;

use noshow_core::{AppointmentRecord, Horizon, RawAppointment, ValidationError, lead_days};

use crate::schema::FeatureField;
use crate::vector::FeatureVector;
use crate::vocabulary::NeighbourhoodVocabulary;

/// Output of a single encode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodedRecord {
    pub vector: FeatureVector,
    pub lead_days: u32,
    /// `false` when the neighbourhood fell back to the unknown code.
    pub neighbourhood_known: bool,
}

impl EncodedRecord {
    pub fn horizon(&self) -> Horizon {
        Horizon::from_lead_days(self.lead_days)
    }
}

/// Encoder bound to one neighbourhood vocabulary.
#[derive(Debug, Clone, Default)]
pub struct FeatureCodec {
    vocabulary: Arc<NeighbourhoodVocabulary>,
}

impl FeatureCodec {
    pub fn new(vocabulary: NeighbourhoodVocabulary) -> Self {
        Self {
            vocabulary: Arc::new(vocabulary),
        }
    }

    /// Fit the vocabulary over every record (all horizons together).
    pub fn fit<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a AppointmentRecord>,
    {
        Self::new(NeighbourhoodVocabulary::fit(
            records.into_iter().map(|r| r.neighbourhood.as_str()),
        ))
    }

    pub fn vocabulary(&self) -> &NeighbourhoodVocabulary {
        &self.vocabulary
    }

    /// Validate and encode a raw record.
    pub fn encode(&self, raw: &RawAppointment) -> Result<EncodedRecord, ValidationError> {
        let record = AppointmentRecord::try_from(raw)?;
        Ok(self.encode_record(&record))
    }

    /// Encode an already validated record. Deterministic and infallible.
    pub fn encode_record(&self, record: &AppointmentRecord) -> EncodedRecord {
        let lead = lead_days(record.scheduled_date, record.appointment_date);
        let neighbourhood = self.vocabulary.code(&record.neighbourhood);
        let scheduled = record.scheduled_date;

        let vector = FeatureVector::from_fn(|field| match field {
            FeatureField::Gender => f64::from(record.gender.code()),
            FeatureField::Age => f64::from(record.age),
            FeatureField::Neighbourhood => {
                f64::from(neighbourhood.unwrap_or(crate::UNKNOWN_NEIGHBOURHOOD_CODE))
            }
            FeatureField::Scholarship => flag(record.scholarship),
            FeatureField::Hypertension => flag(record.hypertension),
            FeatureField::Diabetes => flag(record.diabetes),
            FeatureField::Alcoholism => flag(record.alcoholism),
            FeatureField::HandicapLevel => f64::from(record.handicap_level),
            FeatureField::SmsReceived => flag(record.sms_received),
            FeatureField::ScheduledYear => f64::from(scheduled.year()),
            FeatureField::ScheduledMonth => f64::from(scheduled.month()),
            FeatureField::ScheduledDay => f64::from(scheduled.day()),
            // Monday = 0.
            FeatureField::ScheduledWeekday => f64::from(scheduled.weekday().num_days_from_monday()),
            FeatureField::LeadDays => f64::from(lead),
        });

        EncodedRecord {
            vector,
            lead_days: lead,
            neighbourhood_known: neighbourhood.is_some(),
        }
    }
}

fn flag(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}
