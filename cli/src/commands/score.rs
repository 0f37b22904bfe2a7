use std::path::PathBuf;

use anyhow::{Context, Result};
use suitability::{MemoryStore, Pipeline, ScoringConfig, WeightPolicy, io};
use tracing::info;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::ScoreArgs) -> Result<()> {
    let out_path: PathBuf = args.output.clone().unwrap_or("./suitability.csv".into());

    let config = ScoringConfig::from_json_file(&args.criteria)?;
    let criteria = config.criteria_set()
        .with_context(|| format!("[score] Invalid criteria in {}", args.criteria.display()))?;

    let mut options = config.run_options();
    if args.strict_weights {
        options.weight_policy = WeightPolicy::Strict;
    }

    let id_column = args.id_column.as_deref().or(config.id_column.as_deref());
    info!(input = %args.input.display(), "loading layer");
    let layer = io::read_layer(&args.input, id_column)?;

    let mut store = MemoryStore::new();
    let source = store.add_layer(layer);

    println!("[score] scoring {} features against {} criteria", store.layer(source)?.len(), criteria.len());
    let summary = Pipeline::with_options(&criteria, options).run(&mut store, source)?;

    for warning in &summary.warnings {
        println!("[score] warning: {warning}");
    }
    for failure in &summary.publish_failures {
        println!("[score] dropped: {failure}");
    }

    println!("[score] writing output to {}", out_path.display());
    io::write_layer(store.layer(summary.output)?, &out_path)?;

    println!("[score] scored {} features, {} outside criteria ranges, {} failed to publish",
        summary.scored_count, summary.unranked_count, summary.publish_failures.len());

    Ok(())
}
