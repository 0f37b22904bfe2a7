use tracing::debug;

use crate::criteria::CriteriaSet;
use super::Normalized;

/// Weighted sum of normalised values, one score per row:
///
/// ```text
/// score(row) = sum_i normalized_i(row) * weight_i
/// ```
///
/// Weights are used exactly as given, whatever their total.
pub fn aggregate(normalized: &Normalized, criteria: &CriteriaSet) -> Vec<f64> {
    debug_assert_eq!(normalized.columns().len(), criteria.len());

    let mut scores = vec![0.0; normalized.len()];
    for (column, criterion) in normalized.columns().iter().zip(criteria) {
        debug_assert_eq!(column.name(), criterion.name);
        for (score, value) in scores.iter_mut().zip(column.values()) {
            *score += value * criterion.weight;
        }
    }

    debug!(rows = scores.len(), weight_sum = criteria.weight_sum(), "aggregated weighted scores");
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        criteria::{Criterion, Effect},
        pipeline::normalize,
        table::FeatureTable,
    };

    fn scores(criteria: &CriteriaSet, rows: &[Vec<f64>]) -> Vec<f64> {
        let mut table = FeatureTable::new(criteria);
        for (i, row) in rows.iter().enumerate() {
            table.push(i.into(), row.clone()).unwrap();
        }
        aggregate(&normalize(&table, criteria), criteria)
    }

    #[test]
    fn weights_scale_normalized_values() {
        let criteria = CriteriaSet::new(vec![
            Criterion::new("a", 0.0, 10.0, 70.0, Effect::Positive),
            Criterion::new("b", 0.0, 10.0, 30.0, Effect::Negative),
        ]).unwrap();

        let s = scores(&criteria, &[vec![0.0, 0.0], vec![10.0, 10.0], vec![5.0, 5.0]]);
        assert_eq!(s, vec![30.0, 70.0, 50.0]);
    }

    #[test]
    fn weights_not_rescaled_when_unbalanced() {
        let criteria = CriteriaSet::new(vec![Criterion::new("a", 0.0, 10.0, 3.0, Effect::Positive)]).unwrap();
        let s = scores(&criteria, &[vec![0.0], vec![10.0]]);
        assert_eq!(s, vec![0.0, 3.0]);
    }

    #[test]
    fn negative_weight_penalizes() {
        let criteria = CriteriaSet::new(vec![
            Criterion::new("good", 0.0, 10.0, 120.0, Effect::Positive),
            Criterion::new("bad", 0.0, 10.0, -20.0, Effect::Positive),
        ]).unwrap();
        let s = scores(&criteria, &[vec![10.0, 10.0], vec![0.0, 0.0]]);
        assert_eq!(s, vec![100.0, 0.0]);
    }

    #[test]
    fn empty_input_gives_no_scores() {
        let criteria = CriteriaSet::new(vec![Criterion::new("a", 0.0, 10.0, 100.0, Effect::Positive)]).unwrap();
        assert!(scores(&criteria, &[]).is_empty());
    }
}
