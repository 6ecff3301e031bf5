//! `noshow-features`
//!
//! **Responsibility:** turn appointment records into model input.
//!
//! - The feature layout is defined once, in [`schema`]; vectors can only be
//!   built by walking that definition.
//! - The neighbourhood vocabulary is fitted at training time and travels with
//!   the artifact bundle; serving never re-derives it.

pub mod codec;
pub mod schema;
pub mod vector;
pub mod vocabulary;

pub use codec::{EncodedRecord, FeatureCodec};
pub use schema::{FEATURE_COUNT, FEATURE_SCHEMA, FeatureField, schema_names};
pub use vector::FeatureVector;
pub use vocabulary::{NeighbourhoodVocabulary, UNKNOWN_NEIGHBOURHOOD_CODE};
