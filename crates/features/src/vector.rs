//! Fixed-length model input.

use crate::schema::{FEATURE_COUNT, FEATURE_SCHEMA, FeatureField};

/// Ordered numeric features, laid out as [`FEATURE_SCHEMA`].
///
/// There is no constructor taking a bare array: values are always produced
/// per [`FeatureField`], so the order cannot drift from the schema.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    /// Build a vector by asking for each field in schema order.
    pub fn from_fn(mut value: impl FnMut(FeatureField) -> f64) -> Self {
        let mut values = [0.0; FEATURE_COUNT];
        for (slot, field) in values.iter_mut().zip(FEATURE_SCHEMA.iter()) {
            *slot = value(*field);
        }
        Self(values)
    }

    pub fn get(&self, field: FeatureField) -> f64 {
        self.0[field.index()]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        self.0
    }

    /// Copy with a single field replaced.
    pub fn with(mut self, field: FeatureField, value: f64) -> Self {
        self.0[field.index()] = value;
        self
    }
}
