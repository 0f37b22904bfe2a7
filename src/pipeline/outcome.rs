use std::{
    fmt,
    sync::{Arc, atomic::{AtomicBool, Ordering}},
};

use crate::{
    criteria::WeightPolicy,
    error::PublishError,
    store::LayerHandle,
    table::FeatureId,
};

/// Default output attribute names.
pub const SCORE_ATTRIBUTE: &str = "score";
pub const RANK_ATTRIBUTE: &str = "rank";

/// Non-fatal conditions observed during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// Weights do not add up to 100; they were used as given.
    WeightSum { sum: f64 },
    /// Every surviving value of a criterion was identical; its normalised column is all zero.
    DegenerateRange { criterion: String, value: f64 },
    /// Range filtering removed every feature.
    EmptyResult { filtered: usize },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::WeightSum { sum } =>
                write!(f, "criterion weights sum to {sum}, not 100; scores use the weights as given"),
            Warning::DegenerateRange { criterion, value } =>
                write!(f, "all remaining values of '{criterion}' equal {value}; it contributes 0 to every score"),
            Warning::EmptyResult { filtered } =>
                write!(f, "all {filtered} features fall outside the criteria ranges; nothing was scored"),
        }
    }
}

/// Final score and rank of one feature.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub id: FeatureId,
    pub score: f64,
    pub rank: u32,
}

/// Cooperative cancellation flag, checked between stages and before publishing.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self { Self::default() }

    pub fn cancel(&self) { self.0.store(true, Ordering::SeqCst) }

    #[inline] pub fn is_cancelled(&self) -> bool { self.0.load(Ordering::SeqCst) }
}

/// Per-run settings.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub weight_policy: WeightPolicy,
    pub score_attribute: String,
    pub rank_attribute: String,
    pub cancel: Option<CancelFlag>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            weight_policy: WeightPolicy::default(),
            score_attribute: SCORE_ATTRIBUTE.into(),
            rank_attribute: RANK_ATTRIBUTE.into(),
            cancel: None,
        }
    }
}

impl RunOptions {
    pub fn with_weight_policy(mut self, policy: WeightPolicy) -> Self {
        self.weight_policy = policy;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn with_attributes(mut self, score: impl Into<String>, rank: impl Into<String>) -> Self {
        self.score_attribute = score.into();
        self.rank_attribute = rank.into();
        self
    }

    #[inline]
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelFlag::is_cancelled)
    }
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Layer holding the published scores and ranks.
    pub output: LayerHandle,
    /// Features whose score and rank were both written.
    pub scored_count: usize,
    /// Features removed by range filtering; present in the output without score or rank.
    pub unranked_count: usize,
    pub warnings: Vec<Warning>,
    /// Features dropped from the output because a write failed.
    pub publish_failures: Vec<PublishError>,
}

impl RunSummary {
    /// True if every scored feature was written.
    #[inline] pub fn is_complete(&self) -> bool { self.publish_failures.is_empty() }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scored={} unranked={} failed={} warnings={}",
            self.scored_count, self.unranked_count, self.publish_failures.len(), self.warnings.len())
    }
}
