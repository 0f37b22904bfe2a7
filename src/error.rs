//! Typed errors raised by criteria validation, extraction, and publishing.

use thiserror::Error;

use crate::table::FeatureId;

/// Structural problems with a criteria set, detected before any store access.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("criteria set is empty")]
    EmptyCriteria,

    #[error("criterion name must not be empty")]
    EmptyName,

    #[error("duplicate criterion name '{name}'")]
    DuplicateName { name: String },

    #[error("criterion '{name}' has lower bound {lower} greater than upper bound {upper}")]
    InvertedRange { name: String, lower: f64, upper: f64 },

    #[error("criterion '{name}' has a non-finite {field}")]
    NonFinite { name: String, field: &'static str },

    #[error("criterion weights sum to {sum}, expected 100")]
    WeightSum { sum: f64 },
}

/// Failures while snapshotting indicator values out of the feature store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractionError {
    #[error("attribute '{attribute}' is not a numeric attribute of the source layer")]
    MissingAttribute { attribute: String },

    #[error("feature {id} has a missing or non-numeric value for '{attribute}'")]
    NonNumeric { id: FeatureId, attribute: String },

    #[error("feature {id} appears more than once in the source layer")]
    DuplicateFeature { id: FeatureId },

    #[error("attribute '{attribute}' does not cover the same features as the other criteria")]
    InconsistentFeatures { attribute: String },

    #[error("feature table columns {found:?} do not follow the criteria order {expected:?}")]
    ColumnOrder { expected: Vec<String>, found: Vec<String> },

    #[error("feature {id} has {found} values, expected {expected}")]
    Width { id: FeatureId, expected: usize, found: usize },

    #[error("feature store failed while reading '{attribute}': {reason}")]
    Store { attribute: String, reason: String },
}

/// A single record that could not be written to the output layer.
/// Collected into the run summary; never aborts the run.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("failed to write '{attribute}' for feature {id}: {reason}")]
pub struct PublishError {
    pub id: FeatureId,
    pub attribute: String,
    pub reason: String,
}

/// Fatal outcome of a pipeline run. No results are published when this is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("invalid criteria: {0}")]
    Validation(#[from] ValidationError),

    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("could not create output layer: {reason}")]
    Output { reason: String },

    #[error("run cancelled before publish")]
    Cancelled,
}
