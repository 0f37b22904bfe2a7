use std::{collections::HashSet, fmt};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use super::Criterion;

/// Weight total the criteria of a set are expected to add up to.
pub const EXPECTED_WEIGHT_SUM: f64 = 100.0;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// How a weight total other than [`EXPECTED_WEIGHT_SUM`] is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightPolicy {
    /// Report a warning and score with the weights as given.
    #[default]
    Advisory,
    /// Reject the criteria set before extraction.
    Strict,
}

/// An ordered, validated, immutable collection of criteria keyed by name.
#[derive(Debug, Clone, PartialEq)]
pub struct CriteriaSet {
    criteria: Vec<Criterion>,
}

impl CriteriaSet {
    /// Validate and wrap a list of criteria.
    ///
    /// Rejects empty sets, empty or duplicate names, non-finite bounds or weights,
    /// and ranges with `lower > upper`. The weight total is *not* checked here,
    /// see [`CriteriaSet::check_weights`].
    pub fn new(criteria: Vec<Criterion>) -> Result<Self, ValidationError> {
        if criteria.is_empty() { return Err(ValidationError::EmptyCriteria) }

        let mut seen = HashSet::with_capacity(criteria.len());
        for criterion in &criteria {
            let name = &criterion.name;
            if name.trim().is_empty() { return Err(ValidationError::EmptyName) }
            if !seen.insert(name.as_str()) {
                return Err(ValidationError::DuplicateName { name: name.clone() })
            }

            for (field, value) in [("lower bound", criterion.lower), ("upper bound", criterion.upper), ("weight", criterion.weight)] {
                if !value.is_finite() {
                    return Err(ValidationError::NonFinite { name: name.clone(), field })
                }
            }

            if criterion.lower > criterion.upper {
                return Err(ValidationError::InvertedRange {
                    name: name.clone(),
                    lower: criterion.lower,
                    upper: criterion.upper,
                })
            }
        }

        Ok(Self { criteria })
    }

    #[inline] pub fn len(&self) -> usize { self.criteria.len() }

    /// Always false for a validated set; provided for API symmetry.
    #[inline] pub fn is_empty(&self) -> bool { self.criteria.is_empty() }

    #[inline] pub fn iter(&self) -> impl Iterator<Item = &Criterion> + '_ { self.criteria.iter() }

    #[inline] pub fn as_slice(&self) -> &[Criterion] { &self.criteria }

    /// Criterion names in set order.
    pub fn names(&self) -> Vec<&str> { self.criteria.iter().map(|c| c.name.as_str()).collect() }

    /// Look up a criterion by name.
    pub fn get(&self, name: &str) -> Option<&Criterion> { self.criteria.iter().find(|c| c.name == name) }

    /// Position of a criterion in set order.
    pub fn position(&self, name: &str) -> Option<usize> { self.criteria.iter().position(|c| c.name == name) }

    /// Sum of all weights.
    pub fn weight_sum(&self) -> f64 { self.criteria.iter().map(|c| c.weight).sum() }

    /// True if the weights add up to [`EXPECTED_WEIGHT_SUM`].
    pub fn weights_balanced(&self) -> bool {
        (self.weight_sum() - EXPECTED_WEIGHT_SUM).abs() <= WEIGHT_SUM_TOLERANCE
    }

    /// Apply the weight policy. Returns the offending sum when unbalanced under
    /// [`WeightPolicy::Advisory`], an error under [`WeightPolicy::Strict`].
    pub fn check_weights(&self, policy: WeightPolicy) -> Result<Option<f64>, ValidationError> {
        if self.weights_balanced() { return Ok(None) }

        let sum = self.weight_sum();
        match policy {
            WeightPolicy::Advisory => Ok(Some(sum)),
            WeightPolicy::Strict => Err(ValidationError::WeightSum { sum }),
        }
    }
}

impl<'a> IntoIterator for &'a CriteriaSet {
    type Item = &'a Criterion;
    type IntoIter = std::slice::Iter<'a, Criterion>;

    fn into_iter(self) -> Self::IntoIter { self.criteria.iter() }
}

impl TryFrom<Vec<Criterion>> for CriteriaSet {
    type Error = ValidationError;

    fn try_from(criteria: Vec<Criterion>) -> Result<Self, Self::Error> { Self::new(criteria) }
}

impl fmt::Display for CriteriaSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CriteriaSet {{")?;
        for (i, criterion) in self.criteria.iter().enumerate() {
            writeln!(f, "  {:2}: {}", i, criterion)?;
        }
        write!(f, "}}")
    }
}
