#![doc = "Multi-criteria suitability scoring for geographic features"]
mod config;
mod criteria;
mod error;
mod pipeline;
mod store;
mod table;

pub mod io;

#[doc(inline)]
pub use config::ScoringConfig;

#[doc(inline)]
pub use criteria::{CriteriaSet, Criterion, Effect, WeightPolicy, EXPECTED_WEIGHT_SUM};

#[doc(inline)]
pub use error::{ExtractionError, PipelineError, PublishError, ValidationError};

#[doc(inline)]
pub use pipeline::{
    aggregate, filter, normalize, normalize_value, rank, run_pipeline, score_table,
    CancelFlag, Normalized, NormalizedColumn, Pipeline, PipelineState, RunOptions, RunSummary,
    ScoredRecord, Scoring, Warning, RANK_ATTRIBUTE, SCORE_ATTRIBUTE,
};

#[doc(inline)]
pub use store::{FeatureStore, FieldKind, FieldValue, Layer, LayerHandle, MemoryStore, DEFAULT_ID_COLUMN};

#[doc(inline)]
pub use table::{FeatureId, FeatureRecord, FeatureTable};
