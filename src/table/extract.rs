use tracing::debug;

use crate::{
    criteria::CriteriaSet,
    error::ExtractionError,
    store::{FeatureStore, LayerHandle},
};
use super::{FeatureId, FeatureTable};

impl FeatureTable {
    /// Snapshot the criterion attributes of `layer` into a new table.
    ///
    /// Produces exactly one record per store feature, in store order. Fails if a
    /// criterion is not a numeric attribute of the layer, if any value is null or
    /// non-numeric, or if the attributes disagree on the set of features.
    /// The store is only read.
    pub fn extract<S: FeatureStore + ?Sized>(store: &S, layer: LayerHandle, criteria: &CriteriaSet) -> Result<Self, ExtractionError> {
        let available = store.list_numeric_attribute_names(layer)
            .map_err(|e| ExtractionError::Store { attribute: "<schema>".into(), reason: format!("{e:#}") })?;

        for criterion in criteria {
            if !available.iter().any(|name| *name == criterion.name) {
                return Err(ExtractionError::MissingAttribute { attribute: criterion.name.clone() })
            }
        }

        let mut ids: Vec<FeatureId> = Vec::new();
        let mut columns: Vec<Vec<f64>> = Vec::with_capacity(criteria.len());

        for (i, criterion) in criteria.iter().enumerate() {
            let attribute = &criterion.name;
            let pairs = store.get_feature_values(layer, attribute)
                .map_err(|e| ExtractionError::Store { attribute: attribute.clone(), reason: format!("{e:#}") })?;

            if i == 0 {
                ids = pairs.iter().map(|(id, _)| id.clone()).collect();
            } else if pairs.len() != ids.len() || pairs.iter().zip(&ids).any(|((id, _), expected)| id != expected) {
                return Err(ExtractionError::InconsistentFeatures { attribute: attribute.clone() })
            }

            let values = pairs.into_iter()
                .map(|(id, value)| match value {
                    Some(v) if v.is_finite() => Ok(v),
                    _ => Err(ExtractionError::NonNumeric { id, attribute: attribute.clone() }),
                })
                .collect::<Result<Vec<_>, _>>()?;
            columns.push(values);
        }

        let mut table = FeatureTable::new(criteria);
        for (row, id) in ids.into_iter().enumerate() {
            table.push(id, columns.iter().map(|column| column[row]).collect())?;
        }

        debug!(features = table.len(), criteria = criteria.len(), "extracted feature table");
        Ok(table)
    }
}
