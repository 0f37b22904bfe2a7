//! JSON configuration describing a suitability run.
//!
//! ```json
//! {
//!   "weight_policy": "advisory",
//!   "id_column": "parcel_id",
//!   "criteria": [
//!     { "name": "slope_pct", "lower": 0, "upper": 15, "weight": 40, "effect": "-" },
//!     { "name": "road_km",   "lower": 0, "upper": 5,  "weight": 60, "effect": "negative" }
//!   ]
//! }
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    criteria::{CriteriaSet, Criterion, WeightPolicy},
    error::ValidationError,
    pipeline::{RunOptions, RANK_ATTRIBUTE, SCORE_ATTRIBUTE},
};

fn default_score_attribute() -> String { SCORE_ATTRIBUTE.into() }

fn default_rank_attribute() -> String { RANK_ATTRIBUTE.into() }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub weight_policy: WeightPolicy,
    /// Attribute identifying features in the source layer; row numbers when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_column: Option<String>,
    #[serde(default = "default_score_attribute")]
    pub score_attribute: String,
    #[serde(default = "default_rank_attribute")]
    pub rank_attribute: String,
    pub criteria: Vec<Criterion>,
}

impl ScoringConfig {
    pub fn new(criteria: Vec<Criterion>) -> Self {
        Self {
            weight_policy: WeightPolicy::default(),
            id_column: None,
            score_attribute: default_score_attribute(),
            rank_attribute: default_rank_attribute(),
            criteria,
        }
    }

    /// Parse a configuration from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("[config] Failed to parse scoring configuration")
    }

    /// Read a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("[config] Failed to read {}", path.display()))?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("[config] Failed to parse {}", path.display()))
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("[config] Failed to serialize scoring configuration")
    }

    /// Validate the criteria into a [`CriteriaSet`].
    pub fn criteria_set(&self) -> Result<CriteriaSet, ValidationError> {
        CriteriaSet::new(self.criteria.clone())
    }

    /// Run options carried by this configuration (no cancellation flag).
    pub fn run_options(&self) -> RunOptions {
        RunOptions::default()
            .with_weight_policy(self.weight_policy)
            .with_attributes(&self.score_attribute, &self.rank_attribute)
    }
}
