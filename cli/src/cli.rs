use std::path::PathBuf;

/// Suitability analysis CLI (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "suitability", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// List the numeric attributes of a layer that can be used as criteria
    Fields(FieldsArgs),

    /// Score and rank the features of a layer against a criteria file
    Score(ScoreArgs),
}

#[derive(clap::Args, Debug)]
pub struct FieldsArgs {
    /// Input layer (.csv, .parquet or .shp)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,

    /// Attribute identifying features (excluded from the listing)
    #[arg(long)]
    pub id_column: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ScoreArgs {
    /// Input layer (.csv, .parquet or .shp)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,

    /// Criteria configuration (JSON)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub criteria: PathBuf,

    /// Output layer file (.csv or .parquet), defaults to "./suitability.csv"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Attribute identifying features, overrides the criteria file
    #[arg(long)]
    pub id_column: Option<String>,

    /// Reject criteria whose weights do not sum to 100
    #[arg(long)]
    pub strict_weights: bool,
}
