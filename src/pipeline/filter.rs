use tracing::debug;

use crate::{criteria::CriteriaSet, table::{FeatureRecord, FeatureTable}};

/// True if every indicator of `record` lies within its criterion's `[lower, upper]`.
#[inline]
pub(crate) fn within_bounds(record: &FeatureRecord, criteria: &CriteriaSet) -> bool {
    criteria.iter().enumerate().all(|(column, criterion)| criterion.contains(record.value(column)))
}

/// Remove every record with an indicator outside its criterion's valid range.
///
/// The range predicates are intersected, so a surviving record satisfies all
/// criteria at once and the result does not depend on criterion order.
/// Filtering everything out yields an empty table, not an error.
pub fn filter(mut table: FeatureTable, criteria: &CriteriaSet) -> FeatureTable {
    debug_assert!(table.matches(criteria), "feature table columns must follow the criteria set");

    let before = table.len();
    table.retain(|record| within_bounds(record, criteria));

    debug!(kept = table.len(), removed = before - table.len(), "applied range filters");
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::{Criterion, Effect};

    fn criteria() -> CriteriaSet {
        CriteriaSet::new(vec![
            Criterion::new("slope", 0.0, 10.0, 50.0, Effect::Negative),
            Criterion::new("access", 2.0, 8.0, 50.0, Effect::Positive),
        ]).unwrap()
    }

    fn table(rows: &[(&str, f64, f64)]) -> FeatureTable {
        let mut table = FeatureTable::new(&criteria());
        for &(id, slope, access) in rows {
            table.push(id.into(), vec![slope, access]).unwrap();
        }
        table
    }

    #[test]
    fn bounds_are_inclusive() {
        let filtered = filter(table(&[("a", 0.0, 2.0), ("b", 10.0, 8.0)]), &criteria());
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn record_must_satisfy_every_criterion() {
        let filtered = filter(table(&[
            ("ok", 5.0, 5.0),
            ("slope_high", 10.5, 5.0),
            ("access_low", 5.0, 1.9),
            ("both", -1.0, 9.0),
        ]), &criteria());

        assert_eq!(filtered.ids().map(|id| id.as_str()).collect::<Vec<_>>(), vec!["ok"]);
    }

    #[test]
    fn everything_filtered_is_empty_not_error() {
        let filtered = filter(table(&[("a", 50.0, 5.0), ("b", 5.0, 50.0)]), &criteria());
        assert!(filtered.is_empty());
    }

    #[test]
    fn filtering_is_idempotent() {
        let once = filter(table(&[("a", 1.0, 3.0), ("b", 11.0, 3.0), ("c", 4.0, 9.0), ("d", 9.0, 7.0)]), &criteria());
        let twice = filter(once.clone(), &criteria());
        assert_eq!(once, twice);
    }
}
