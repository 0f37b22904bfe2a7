//! The scoring pipeline: Filter -> Normalize -> Aggregate -> Rank -> Publish.
//!
//! Each numeric stage is a plain function over owned or borrowed data so it can be
//! used and tested on its own. [`Pipeline`] sequences them against a
//! [`FeatureStore`](crate::store::FeatureStore) and tracks the run's [`PipelineState`].

mod aggregate;
mod filter;
mod normalize;
mod outcome;
mod rank;
mod run;
mod state;

pub use aggregate::aggregate;
pub use filter::filter;
pub use normalize::{normalize, normalize_value, Normalized, NormalizedColumn};
pub use outcome::{CancelFlag, RunOptions, RunSummary, ScoredRecord, Warning, RANK_ATTRIBUTE, SCORE_ATTRIBUTE};
pub use rank::rank;
pub use run::{run_pipeline, score_table, Pipeline, Scoring};
pub use state::PipelineState;
