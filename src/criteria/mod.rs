mod criterion;
mod set;

pub use criterion::{Criterion, Effect};
pub use set::{CriteriaSet, WeightPolicy, EXPECTED_WEIGHT_SUM};
