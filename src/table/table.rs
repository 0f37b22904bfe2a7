use ahash::AHashMap;

use crate::{criteria::CriteriaSet, error::ExtractionError};
use super::FeatureId;

/// One feature's indicator values, aligned with the owning table's columns.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    id: FeatureId,
    values: Vec<f64>,
}

impl FeatureRecord {
    #[inline] pub fn id(&self) -> &FeatureId { &self.id }

    #[inline] pub fn values(&self) -> &[f64] { &self.values }

    /// Value of the `column`-th indicator.
    #[inline] pub fn value(&self, column: usize) -> f64 { self.values[column] }
}

/// In-memory snapshot of the indicator values of a layer, one column per criterion.
///
/// Rows are kept in store order and indexed by [`FeatureId`]. The table only
/// ever shrinks after construction (see [`FeatureTable::retain`]).
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    columns: Vec<String>,
    records: Vec<FeatureRecord>,
    index: AHashMap<FeatureId, usize>,
}

impl FeatureTable {
    /// Create an empty table whose columns are the criterion names in set order.
    pub fn new(criteria: &CriteriaSet) -> Self {
        Self {
            columns: criteria.iter().map(|c| c.name.clone()).collect(),
            records: Vec::new(),
            index: AHashMap::new(),
        }
    }

    /// Append a record. `values` must hold one finite value per column.
    pub fn push(&mut self, id: FeatureId, values: Vec<f64>) -> Result<(), ExtractionError> {
        if values.len() != self.columns.len() {
            return Err(ExtractionError::Width { id, expected: self.columns.len(), found: values.len() })
        }
        if let Some(column) = values.iter().position(|v| !v.is_finite()) {
            return Err(ExtractionError::NonNumeric { id, attribute: self.columns[column].clone() })
        }
        if self.index.contains_key(&id) {
            return Err(ExtractionError::DuplicateFeature { id })
        }

        self.index.insert(id.clone(), self.records.len());
        self.records.push(FeatureRecord { id, values });
        Ok(())
    }

    #[inline] pub fn len(&self) -> usize { self.records.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.records.is_empty() }

    /// Column names, one per criterion.
    #[inline] pub fn columns(&self) -> &[String] { &self.columns }

    #[inline] pub fn records(&self) -> &[FeatureRecord] { &self.records }

    /// Feature ids in row order.
    pub fn ids(&self) -> impl Iterator<Item = &FeatureId> + '_ { self.records.iter().map(|r| &r.id) }

    /// Look up a record by feature id.
    pub fn get(&self, id: &FeatureId) -> Option<&FeatureRecord> {
        self.index.get(id).map(|&row| &self.records[row])
    }

    /// Look up a single value by feature id and column name.
    pub fn value(&self, id: &FeatureId, column: &str) -> Option<f64> {
        let column = self.columns.iter().position(|c| c == column)?;
        self.get(id).map(|record| record.value(column))
    }

    /// Iterate the values of one column in row order.
    pub fn column(&self, column: usize) -> impl Iterator<Item = f64> + '_ {
        self.records.iter().map(move |r| r.value(column))
    }

    /// True if the columns are exactly the criterion names in set order.
    pub fn matches(&self, criteria: &CriteriaSet) -> bool {
        self.columns.len() == criteria.len()
            && self.columns.iter().zip(criteria.iter()).all(|(column, c)| *column == c.name)
    }

    /// Keep only records satisfying `keep`, preserving row order.
    pub fn retain(&mut self, keep: impl FnMut(&FeatureRecord) -> bool) {
        self.records.retain(keep);
        self.index = self.records.iter().enumerate()
            .map(|(row, record)| (record.id.clone(), row))
            .collect();
    }
}
