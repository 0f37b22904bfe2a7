//! Min–max normalisation of indicator columns, oriented by effect direction.

use tracing::debug;

use crate::{
    criteria::{CriteriaSet, Effect},
    table::{FeatureId, FeatureTable},
};

/// Rescale `value` from `[min, max]` to `[0, 1]`, so that 1 is always the best value.
///
/// A degenerate range (`max == min`) maps every value to `0.0`. Finite inputs
/// always give a result in `[0, 1]`, even when `max - min` exceeds `f64::MAX`.
#[inline]
pub fn normalize_value(value: f64, min: f64, max: f64, effect: Effect) -> f64 {
    if max == min { return 0.0 }

    let (above_min, below_max, span) = match max - min {
        span if span.is_finite() => (value - min, max - value, span),
        // spread overflows: work on halved operands
        _ => (value / 2.0 - min / 2.0, max / 2.0 - value / 2.0, max / 2.0 - min / 2.0),
    };

    let scaled = match effect {
        Effect::Positive => above_min / span,
        Effect::Negative => below_max / span,
    };
    scaled.clamp(0.0, 1.0)
}

/// One criterion's normalised values, aligned with the rows of the source table.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedColumn {
    name: String,
    effect: Effect,
    range: Option<(f64, f64)>, // (min, max) over surviving rows; None when there are none
    values: Vec<f64>,
}

impl NormalizedColumn {
    #[inline] pub fn name(&self) -> &str { &self.name }

    #[inline] pub fn effect(&self) -> Effect { self.effect }

    /// Observed minimum over the normalised rows.
    #[inline] pub fn min(&self) -> Option<f64> { self.range.map(|(min, _)| min) }

    /// Observed maximum over the normalised rows.
    #[inline] pub fn max(&self) -> Option<f64> { self.range.map(|(_, max)| max) }

    #[inline] pub fn values(&self) -> &[f64] { &self.values }

    /// True if every row held the same raw value.
    #[inline] pub fn is_degenerate(&self) -> bool { self.range.is_some_and(|(min, max)| min == max) }
}

/// Derived normalised columns for a filtered table. Raw values are left untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    ids: Vec<FeatureId>,
    columns: Vec<NormalizedColumn>,
}

impl Normalized {
    #[inline] pub fn ids(&self) -> &[FeatureId] { &self.ids }

    #[inline] pub fn columns(&self) -> &[NormalizedColumn] { &self.columns }

    #[inline] pub fn len(&self) -> usize { self.ids.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.ids.is_empty() }

    /// Look up a column by criterion name.
    pub fn column(&self, name: &str) -> Option<&NormalizedColumn> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Columns whose values were all identical.
    pub fn degenerate(&self) -> impl Iterator<Item = &NormalizedColumn> + '_ {
        self.columns.iter().filter(|column| column.is_degenerate())
    }
}

/// Normalise every criterion column of `table` using the min and max of the rows
/// present in `table`, not the criterion's configured bounds.
pub fn normalize(table: &FeatureTable, criteria: &CriteriaSet) -> Normalized {
    debug_assert!(table.matches(criteria), "feature table columns must follow the criteria set");

    let columns = criteria.iter().enumerate()
        .map(|(column, criterion)| {
            let range = table.column(column).fold(None, |range: Option<(f64, f64)>, v| match range {
                None => Some((v, v)),
                Some((min, max)) => Some((min.min(v), max.max(v))),
            });

            let values = match range {
                Some((min, max)) => table.column(column)
                    .map(|v| normalize_value(v, min, max, criterion.effect))
                    .collect(),
                None => Vec::new(),
            };

            NormalizedColumn { name: criterion.name.clone(), effect: criterion.effect, range, values }
        })
        .collect::<Vec<_>>();

    debug!(rows = table.len(), columns = columns.len(), "normalized indicator columns");
    Normalized { ids: table.ids().cloned().collect(), columns }
}
