use anyhow::Error;
use tracing::{debug, info, warn};

use crate::{
    criteria::CriteriaSet,
    error::{ExtractionError, PipelineError, PublishError},
    store::{FeatureStore, FieldValue, LayerHandle},
    table::{FeatureId, FeatureTable},
};
use super::{
    PipelineState, RunOptions, RunSummary, ScoredRecord, Warning,
    aggregate, filter, normalize, rank,
};

/// Scores and ranks produced from an already-extracted table.
#[derive(Debug, Clone, PartialEq)]
pub struct Scoring {
    /// Surviving records in table order.
    pub records: Vec<ScoredRecord>,
    /// Records removed by range filtering.
    pub unranked: Vec<FeatureId>,
    pub warnings: Vec<Warning>,
}

/// Warnings raised by the numeric stages for a filtered table.
fn stage_warnings(total: usize, normalized: &super::Normalized) -> Vec<Warning> {
    let mut warnings = Vec::new();
    if normalized.is_empty() && total > 0 {
        warnings.push(Warning::EmptyResult { filtered: total });
    }
    warnings.extend(normalized.degenerate().map(|column| Warning::DegenerateRange {
        criterion: column.name().to_string(),
        value: column.min().unwrap_or_default(),
    }));
    warnings
}

/// Run filter, normalise, aggregate and rank over a table without touching any store.
pub fn score_table(table: FeatureTable, criteria: &CriteriaSet) -> Result<Scoring, PipelineError> {
    if !table.matches(criteria) {
        let error = match criteria.iter().find(|c| !table.columns().contains(&c.name)) {
            Some(missing) => ExtractionError::MissingAttribute { attribute: missing.name.clone() },
            None => ExtractionError::ColumnOrder {
                expected: criteria.iter().map(|c| c.name.clone()).collect(),
                found: table.columns().to_vec(),
            },
        };
        return Err(error.into())
    }

    let all: Vec<FeatureId> = table.ids().cloned().collect();
    let total = all.len();

    let filtered = filter(table, criteria);
    let normalized = normalize(&filtered, criteria);
    let scores = aggregate(&normalized, criteria);
    let ranks = rank(&scores);

    let records: Vec<ScoredRecord> = normalized.ids().iter().cloned()
        .zip(scores.into_iter().zip(ranks))
        .map(|(id, (score, rank))| ScoredRecord { id, score, rank })
        .collect();
    let unranked = all.into_iter().filter(|id| filtered.get(id).is_none()).collect();

    Ok(Scoring { records, unranked, warnings: stage_warnings(total, &normalized) })
}

/// Orchestrates one suitability run: validate, extract, filter, normalise,
/// aggregate, rank, publish.
///
/// Each call to [`Pipeline::run`] starts from [`PipelineState::Idle`] with a fresh
/// snapshot of the source layer. Nothing is written to the store before every
/// stage has succeeded; a failure or cancellation leaves the store untouched.
#[derive(Debug, Clone)]
pub struct Pipeline<'a> {
    criteria: &'a CriteriaSet,
    options: RunOptions,
    state: PipelineState,
}

impl<'a> Pipeline<'a> {
    pub fn new(criteria: &'a CriteriaSet) -> Self {
        Self::with_options(criteria, RunOptions::default())
    }

    pub fn with_options(criteria: &'a CriteriaSet, options: RunOptions) -> Self {
        Self { criteria, options, state: PipelineState::Idle }
    }

    /// State reached by the most recent run.
    #[inline] pub fn state(&self) -> PipelineState { self.state }

    #[inline] pub fn options(&self) -> &RunOptions { &self.options }

    /// Run the pipeline over `source`, publishing scores and ranks into a new
    /// derived layer of `store`.
    pub fn run<S: FeatureStore + ?Sized>(&mut self, store: &mut S, source: LayerHandle) -> Result<RunSummary, PipelineError> {
        self.state = PipelineState::Idle;
        info!(source = %source, criteria = self.criteria.len(), "starting suitability run");

        let result = self.execute(store, source);
        if let Err(error) = &result {
            warn!(state = %self.state, %error, "suitability run failed");
            self.state = PipelineState::Error;
        }
        result
    }

    fn advance(&mut self, next: PipelineState) {
        debug_assert_eq!(self.state.next(), Some(next), "invalid pipeline transition");
        self.state = next;
        debug!(state = %next, "pipeline state");
    }

    fn check_cancelled(&self) -> Result<(), PipelineError> {
        if self.options.is_cancelled() { Err(PipelineError::Cancelled) } else { Ok(()) }
    }

    fn execute<S: FeatureStore + ?Sized>(&mut self, store: &mut S, source: LayerHandle) -> Result<RunSummary, PipelineError> {
        let criteria = self.criteria;
        let mut warnings = Vec::new();

        if let Some(sum) = criteria.check_weights(self.options.weight_policy)? {
            warnings.push(Warning::WeightSum { sum });
        }

        self.check_cancelled()?;
        let table = FeatureTable::extract(&*store, source, criteria)?;
        let total = table.len();
        self.advance(PipelineState::Extracted);

        self.check_cancelled()?;
        let filtered = filter(table, criteria);
        let unranked_count = total - filtered.len();
        self.advance(PipelineState::Filtered);

        self.check_cancelled()?;
        let normalized = normalize(&filtered, criteria);
        drop(filtered);
        warnings.extend(stage_warnings(total, &normalized));
        self.advance(PipelineState::Normalized);

        self.check_cancelled()?;
        let scores = aggregate(&normalized, criteria);
        self.advance(PipelineState::Aggregated);

        self.check_cancelled()?;
        let ranks = rank(&scores);
        let scored: Vec<ScoredRecord> = normalized.ids().iter().cloned()
            .zip(scores.into_iter().zip(ranks))
            .map(|(id, (score, rank))| ScoredRecord { id, score, rank })
            .collect();
        self.advance(PipelineState::Ranked);

        for warning in &warnings {
            warn!(%warning, "suitability warning");
        }

        self.check_cancelled()?;
        let (output, scored_count, publish_failures) = self.publish(store, source, scored)?;
        self.advance(PipelineState::Published);

        let summary = RunSummary { output, scored_count, unranked_count, warnings, publish_failures };
        info!(%output, %summary, "suitability run complete");
        Ok(summary)
    }

    /// Write every scored record to a new derived layer. Per-record failures drop
    /// that feature from the output and are collected, never retried.
    fn publish<S: FeatureStore + ?Sized>(
        &self,
        store: &mut S,
        source: LayerHandle,
        scored: Vec<ScoredRecord>,
    ) -> Result<(LayerHandle, usize, Vec<PublishError>), PipelineError> {
        let output = store.create_derived_layer(source)
            .map_err(|e| PipelineError::Output { reason: format!("{e:#}") })?;

        let mut written = 0;
        let mut failures = Vec::new();
        for record in scored {
            match write_record(store, output, &record, &self.options) {
                Ok(()) => written += 1,
                Err((attribute, error)) => {
                    let failure = PublishError { id: record.id, attribute, reason: format!("{error:#}") };
                    warn!(%failure, "dropping feature from output");
                    if let Err(error) = store.discard_feature(output, &failure.id) {
                        warn!(id = %failure.id, error = %format!("{error:#}"), "could not discard feature after failed write");
                    }
                    failures.push(failure);
                }
            }
        }

        Ok((output, written, failures))
    }
}

fn write_record<S: FeatureStore + ?Sized>(
    store: &mut S,
    output: LayerHandle,
    record: &ScoredRecord,
    options: &RunOptions,
) -> Result<(), (String, Error)> {
    store.write_attribute(output, &record.id, &options.score_attribute, FieldValue::Float(record.score))
        .map_err(|e| (options.score_attribute.clone(), e))?;
    store.write_attribute(output, &record.id, &options.rank_attribute, FieldValue::Integer(record.rank))
        .map_err(|e| (options.rank_attribute.clone(), e))
}

/// Run a suitability analysis with default options.
///
/// Equivalent to `Pipeline::new(criteria).run(store, source)`.
pub fn run_pipeline<S: FeatureStore + ?Sized>(criteria: &CriteriaSet, store: &mut S, source: LayerHandle) -> Result<RunSummary, PipelineError> {
    Pipeline::new(criteria).run(store, source)
}
