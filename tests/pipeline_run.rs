// Orchestration: state transitions, failure isolation, cancellation and
// partial publish through a store that rejects some writes.

use anyhow::{Result, bail};
use suitability::{
    io, CancelFlag, CriteriaSet, Criterion, Effect, ExtractionError, FeatureId, FeatureStore,
    FieldValue, LayerHandle, MemoryStore, Pipeline, PipelineError, PipelineState, RunOptions,
    ValidationError, Warning, WeightPolicy,
};

const SITES: &str = "id,noise,dist\na,10,100\nb,40,250\nc,25,900\nd,80,400\n";

fn store() -> (MemoryStore, LayerHandle) {
    let mut store = MemoryStore::new();
    let source = store.add_layer(io::read_layer_csv_string("sites", SITES, Some("id")).unwrap());
    (store, source)
}

fn criteria(noise_weight: f64, dist_weight: f64) -> CriteriaSet {
    CriteriaSet::new(vec![
        Criterion::new("noise", 0.0, 60.0, noise_weight, Effect::Negative),
        Criterion::new("dist", 0.0, 1000.0, dist_weight, Effect::Positive),
    ]).unwrap()
}

/// Store wrapper that rejects writes for selected features, refuses to create
/// an output layer, or trips a cancel flag while values are being read.
struct FlakyStore {
    inner: MemoryStore,
    reject: Vec<FeatureId>,
    reject_attribute: &'static str,
    refuse_output: bool,
    cancel_on_read: Option<CancelFlag>,
}

impl FlakyStore {
    fn new(inner: MemoryStore) -> Self {
        Self { inner, reject: Vec::new(), reject_attribute: "score", refuse_output: false, cancel_on_read: None }
    }
}

impl FeatureStore for FlakyStore {
    fn list_numeric_attribute_names(&self, layer: LayerHandle) -> Result<Vec<String>> {
        self.inner.list_numeric_attribute_names(layer)
    }

    fn get_feature_values(&self, layer: LayerHandle, attribute: &str) -> Result<Vec<(FeatureId, Option<f64>)>> {
        if let Some(cancel) = &self.cancel_on_read {
            cancel.cancel();
        }
        self.inner.get_feature_values(layer, attribute)
    }

    fn create_derived_layer(&mut self, source: LayerHandle) -> Result<LayerHandle> {
        if self.refuse_output { bail!("read-only store") }
        self.inner.create_derived_layer(source)
    }

    fn write_attribute(&mut self, layer: LayerHandle, id: &FeatureId, attribute: &str, value: FieldValue) -> Result<()> {
        if attribute == self.reject_attribute && self.reject.contains(id) { bail!("disk full") }
        self.inner.write_attribute(layer, id, attribute, value)
    }

    fn discard_feature(&mut self, layer: LayerHandle, id: &FeatureId) -> Result<()> {
        self.inner.discard_feature(layer, id)
    }
}

#[test]
fn successful_run_ends_published() {
    let (mut store, source) = store();
    let criteria = criteria(50.0, 50.0);
    let mut pipeline = Pipeline::new(&criteria);
    assert_eq!(pipeline.state(), PipelineState::Idle);

    let summary = pipeline.run(&mut store, source).unwrap();
    assert_eq!(pipeline.state(), PipelineState::Published);
    assert_eq!(store.num_layers(), 2);
    // d has noise 80 > 60
    assert_eq!((summary.scored_count, summary.unranked_count), (3, 1));
    assert!(summary.is_complete());

    let output = store.layer(summary.output).unwrap();
    assert_eq!(output.output_names(), vec!["score", "rank"]);
    assert!(store.layer(source).unwrap().output_names().is_empty());
}

#[test]
fn missing_attribute_fails_without_touching_store() {
    let (mut store, source) = store();
    let criteria = CriteriaSet::new(vec![Criterion::new("slope", 0.0, 10.0, 100.0, Effect::Positive)]).unwrap();
    let mut pipeline = Pipeline::new(&criteria);

    let err = pipeline.run(&mut store, source).unwrap_err();
    assert_eq!(err, PipelineError::Extraction(ExtractionError::MissingAttribute { attribute: "slope".into() }));
    assert_eq!(pipeline.state(), PipelineState::Error);
    assert_eq!(store.num_layers(), 1);
}

#[test]
fn null_indicator_is_an_extraction_error() {
    let mut store = MemoryStore::new();
    let source = store.add_layer(io::read_layer_csv_string("sites", "id,noise\na,1\nb,\n", Some("id")).unwrap());
    let criteria = CriteriaSet::new(vec![Criterion::new("noise", 0.0, 10.0, 100.0, Effect::Positive)]).unwrap();

    let err = Pipeline::new(&criteria).run(&mut store, source).unwrap_err();
    assert!(matches!(err, PipelineError::Extraction(ExtractionError::NonNumeric { .. })), "{err}");
    assert_eq!(store.num_layers(), 1);
}

#[test]
fn strict_weights_reject_before_extraction() {
    let (mut store, source) = store();
    let criteria = criteria(30.0, 30.0);
    let options = RunOptions::default().with_weight_policy(WeightPolicy::Strict);
    let mut pipeline = Pipeline::with_options(&criteria, options);

    let err = pipeline.run(&mut store, source).unwrap_err();
    assert_eq!(err, PipelineError::Validation(ValidationError::WeightSum { sum: 60.0 }));
    assert_eq!(pipeline.state(), PipelineState::Error);
    assert_eq!(store.num_layers(), 1);
}

#[test]
fn advisory_weights_warn_and_keep_raw_weights() {
    let (mut store, source) = store();
    let summary = Pipeline::new(&criteria(30.0, 30.0)).run(&mut store, source).unwrap();

    assert!(summary.warnings.contains(&Warning::WeightSum { sum: 60.0 }));
    let output = store.layer(summary.output).unwrap();
    // a: lowest noise (1.0 * 30) and lowest dist (0.0 * 30)
    assert_eq!(output.output(&"a".into(), "score"), Some(FieldValue::Float(30.0)));
    // c: dist 900 is the maximum among {100, 250, 900}
    let c = output.output(&"c".into(), "score").unwrap().as_f64();
    assert!((c - (30.0 * (40.0 - 25.0) / 30.0 + 30.0)).abs() < 1e-9, "{c}");
}

#[test]
fn cancelled_run_publishes_nothing() {
    let (mut store, source) = store();
    let criteria = criteria(50.0, 50.0);
    let cancel = CancelFlag::new();
    cancel.cancel();

    let mut pipeline = Pipeline::with_options(&criteria, RunOptions::default().with_cancel(cancel));
    assert_eq!(pipeline.run(&mut store, source).unwrap_err(), PipelineError::Cancelled);
    assert_eq!(pipeline.state(), PipelineState::Error);
    assert_eq!(store.num_layers(), 1);
}

#[test]
fn cancel_during_extraction_stops_before_publish() {
    let (inner, source) = store();
    let mut store = FlakyStore::new(inner);
    let cancel = CancelFlag::new();
    store.cancel_on_read = Some(cancel.clone());

    let criteria = criteria(50.0, 50.0);
    let mut pipeline = Pipeline::with_options(&criteria, RunOptions::default().with_cancel(cancel.clone()));
    let err = pipeline.run(&mut store, source).unwrap_err();

    assert!(cancel.is_cancelled());
    assert_eq!(err, PipelineError::Cancelled);
    assert_eq!(pipeline.state(), PipelineState::Error);
    assert_eq!(store.inner.num_layers(), 1);
}

#[test]
fn rescoring_replaces_previous_score_and_rank() {
    let mut store = MemoryStore::new();
    let source = store.add_layer(io::read_layer_csv_string("sites",
        "id,x,score,rank\na,0,7.5,1\nb,10,3.0,2\n", Some("id")).unwrap());
    let criteria = CriteriaSet::new(vec![Criterion::new("x", 0.0, 10.0, 100.0, Effect::Positive)]).unwrap();

    let summary = Pipeline::new(&criteria).run(&mut store, source).unwrap();
    assert!(summary.publish_failures.is_empty(), "{:?}", summary.publish_failures);
    assert_eq!(summary.scored_count, 2);

    let output = store.layer(summary.output).unwrap();
    assert_eq!(output.output(&"a".into(), "score"), Some(FieldValue::Float(0.0)));
    assert_eq!(output.output(&"a".into(), "rank"), Some(FieldValue::Integer(2)));
    assert_eq!(output.output(&"b".into(), "rank"), Some(FieldValue::Integer(1)));
    // source keeps its old values
    assert_eq!(store.layer(source).unwrap().values("score").unwrap()[0].1, Some(7.5));
}

#[test]
fn every_feature_filtered_yields_empty_result_warning() {
    let (mut store, source) = store();
    let criteria = CriteriaSet::new(vec![Criterion::new("noise", 500.0, 600.0, 100.0, Effect::Positive)]).unwrap();

    let summary = Pipeline::new(&criteria).run(&mut store, source).unwrap();
    assert_eq!((summary.scored_count, summary.unranked_count), (0, 4));
    assert!(summary.warnings.contains(&Warning::EmptyResult { filtered: 4 }));

    let output = store.layer(summary.output).unwrap();
    assert_eq!(output.len(), 4);
    assert!(output.output_names().is_empty());
}

#[test]
fn failed_writes_are_collected_and_dropped_from_output() {
    let (inner, source) = store();
    let mut store = FlakyStore::new(inner);
    store.reject = vec!["b".into()];
    store.reject_attribute = "rank";

    let criteria = criteria(50.0, 50.0);
    let mut pipeline = Pipeline::new(&criteria);
    let summary = pipeline.run(&mut store, source).unwrap();

    assert_eq!(pipeline.state(), PipelineState::Published);
    assert_eq!(summary.scored_count, 2);
    assert_eq!(summary.publish_failures.len(), 1);
    let failure = &summary.publish_failures[0];
    assert_eq!((failure.id.as_str(), failure.attribute.as_str()), ("b", "rank"));
    assert!(failure.reason.contains("disk full"));

    let output = store.inner.layer(summary.output).unwrap();
    assert!(output.is_discarded(&"b".into()));
    // the score written before the failed rank is not left behind
    assert_eq!(output.output(&"b".into(), "score"), None);
    assert!(output.output(&"a".into(), "rank").is_some());

    let df = output.to_dataframe().unwrap();
    assert_eq!(df.height(), 3);
}

#[test]
fn output_layer_refused_is_an_error() {
    let (inner, source) = store();
    let mut store = FlakyStore::new(inner);
    store.refuse_output = true;

    let criteria = criteria(50.0, 50.0);
    let mut pipeline = Pipeline::new(&criteria);
    let err = pipeline.run(&mut store, source).unwrap_err();

    assert!(matches!(err, PipelineError::Output { ref reason } if reason.contains("read-only")), "{err}");
    assert_eq!(pipeline.state(), PipelineState::Error);
    assert_eq!(store.inner.num_layers(), 1);
}

#[test]
fn rerun_resets_state_and_creates_fresh_output() {
    let (mut store, source) = store();
    let criteria = criteria(50.0, 50.0);
    let mut pipeline = Pipeline::with_options(&criteria,
        RunOptions::default().with_attributes("suitability", "position"));

    let first = pipeline.run(&mut store, source).unwrap();
    let second = pipeline.run(&mut store, source).unwrap();

    assert_ne!(first.output, second.output);
    assert_eq!(pipeline.state(), PipelineState::Published);
    assert_eq!(store.layer(second.output).unwrap().output_names(), vec!["suitability", "position"]);
    for id in ["a", "b", "c"] {
        let id = FeatureId::new(id);
        assert_eq!(
            store.layer(first.output).unwrap().output(&id, "suitability"),
            store.layer(second.output).unwrap().output(&id, "suitability"),
        );
    }
}
