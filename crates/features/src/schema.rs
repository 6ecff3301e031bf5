//! The ordered feature layout shared by training and serving.

/// One column of the model input.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FeatureField {
    Gender,
    Age,
    Neighbourhood,
    Scholarship,
    Hypertension,
    Diabetes,
    Alcoholism,
    HandicapLevel,
    SmsReceived,
    ScheduledYear,
    ScheduledMonth,
    ScheduledDay,
    ScheduledWeekday,
    LeadDays,
}

pub const FEATURE_COUNT: usize = 14;

/// Column order of every [`FeatureVector`](crate::FeatureVector).
///
/// Artifacts record these names at training time and are rejected on load if
/// they differ.
pub const FEATURE_SCHEMA: [FeatureField; FEATURE_COUNT] = [
    FeatureField::Gender,
    FeatureField::Age,
    FeatureField::Neighbourhood,
    FeatureField::Scholarship,
    FeatureField::Hypertension,
    FeatureField::Diabetes,
    FeatureField::Alcoholism,
    FeatureField::HandicapLevel,
    FeatureField::SmsReceived,
    FeatureField::ScheduledYear,
    FeatureField::ScheduledMonth,
    FeatureField::ScheduledDay,
    FeatureField::ScheduledWeekday,
    FeatureField::LeadDays,
];

impl FeatureField {
    pub fn name(&self) -> &'static str {
        match self {
            FeatureField::Gender => "gender",
            FeatureField::Age => "age",
            FeatureField::Neighbourhood => "neighbourhood",
            FeatureField::Scholarship => "scholarship",
            FeatureField::Hypertension => "hypertension",
            FeatureField::Diabetes => "diabetes",
            FeatureField::Alcoholism => "alcoholism",
            FeatureField::HandicapLevel => "handicap_level",
            FeatureField::SmsReceived => "sms_received",
            FeatureField::ScheduledYear => "scheduled_year",
            FeatureField::ScheduledMonth => "scheduled_month",
            FeatureField::ScheduledDay => "scheduled_day",
            FeatureField::ScheduledWeekday => "scheduled_weekday",
            FeatureField::LeadDays => "lead_days",
        }
    }

    /// Position of this field in [`FEATURE_SCHEMA`].
    pub fn index(&self) -> usize {
        FEATURE_SCHEMA
            .iter()
            .position(|f| f == self)
            .unwrap_or(FEATURE_COUNT)
    }
}

/// Schema as owned names, the form stored inside artifacts.
pub fn schema_names() -> Vec<String> {
    FEATURE_SCHEMA.iter().map(|f| f.name().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn schema_has_unique_names_in_contract_order() {
        let names = schema_names();
        assert_eq!(names.len(), FEATURE_COUNT);
        assert_eq!(names.iter().collect::<HashSet<_>>().len(), FEATURE_COUNT);
        assert_eq!(names.first().map(String::as_str), Some("gender"));
        assert_eq!(names.last().map(String::as_str), Some("lead_days"));
    }

    #[test]
    fn index_agrees_with_schema_position() {
        for (i, field) in FEATURE_SCHEMA.iter().enumerate() {
            assert_eq!(field.index(), i);
        }
    }
}
