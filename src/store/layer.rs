use ahash::AHashMap;
use anyhow::{Context, Result, anyhow, bail, ensure};
use polars::prelude::*;
use tracing::debug;

use crate::table::FeatureId;
use super::{FieldKind, FieldValue};

/// Name of the identifier column used when a layer has no id attribute of its own.
pub const DEFAULT_ID_COLUMN: &str = "fid";

/// Attribute written during publish, one slot per feature.
#[derive(Debug, Clone)]
struct OutputColumn {
    name: String,
    kind: FieldKind,
    values: Vec<Option<FieldValue>>,
}

/// A feature layer: stable ids plus an attribute table, and for derived layers
/// the output attributes written so far.
#[derive(Debug, Clone)]
pub struct Layer {
    name: String,
    id_column: String,
    ids: Vec<FeatureId>,
    index: AHashMap<FeatureId, usize>,
    data: DataFrame,
    outputs: Vec<OutputColumn>,
    discarded: Vec<bool>,
    derived: bool,
}

/// True for Polars dtypes treated as numeric attributes.
pub(crate) fn is_numeric(dtype: &DataType) -> bool {
    matches!(dtype,
        DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64
        | DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64
        | DataType::Float32 | DataType::Float64)
}

impl Layer {
    /// Build a layer from an attribute table.
    ///
    /// When `id_column` is given its values (as text) become the feature ids and the
    /// column is removed from the attributes; otherwise features are numbered by row.
    pub fn from_dataframe(name: impl Into<String>, df: DataFrame, id_column: Option<&str>) -> Result<Self> {
        let name = name.into();
        let (id_column, ids, data) = match id_column {
            Some(column) => {
                let ids = df.column(column)
                    .with_context(|| format!("[store::layer] Layer '{name}' has no id column '{column}'"))?
                    .cast(&DataType::String)?;
                let ids = ids.str()?.into_iter()
                    .enumerate()
                    .map(|(row, id)| id
                        .map(|id| FeatureId::new(id.trim()))
                        .ok_or_else(|| anyhow!("[store::layer] Row {row} of layer '{name}' has a null id")))
                    .collect::<Result<Vec<_>>>()?;
                (column.to_string(), ids, df.drop(column)?)
            }
            None => {
                ensure!(df.get_column_index(DEFAULT_ID_COLUMN).is_none(),
                    "[store::layer] Layer '{name}' already has a '{DEFAULT_ID_COLUMN}' column; name it as the id column");
                let ids = (0..df.height()).map(FeatureId::from).collect();
                (DEFAULT_ID_COLUMN.to_string(), ids, df)
            }
        };

        let mut index = AHashMap::with_capacity(ids.len());
        for (row, id) in ids.iter().enumerate() {
            if index.insert(id.clone(), row).is_some() {
                bail!("[store::layer] Duplicate feature id '{id}' in layer '{name}'");
            }
        }

        let discarded = vec![false; ids.len()];
        Ok(Self { name, id_column, ids, index, data, outputs: Vec::new(), discarded, derived: false })
    }

    #[inline] pub fn name(&self) -> &str { &self.name }

    #[inline] pub fn id_column(&self) -> &str { &self.id_column }

    #[inline] pub fn len(&self) -> usize { self.ids.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.ids.is_empty() }

    /// Feature ids in row order (including discarded features).
    #[inline] pub fn ids(&self) -> &[FeatureId] { &self.ids }

    /// Input attribute table (without the id column or outputs).
    #[inline] pub fn data(&self) -> &DataFrame { &self.data }

    /// Names of numeric input attributes in schema order.
    pub fn numeric_attribute_names(&self) -> Vec<String> {
        self.data.get_columns().iter()
            .filter(|column| is_numeric(column.dtype()))
            .map(|column| column.name().to_string())
            .collect()
    }

    /// Every feature with its value for `attribute` as `f64`.
    pub fn values(&self, attribute: &str) -> Result<Vec<(FeatureId, Option<f64>)>> {
        let column = self.data.column(attribute)
            .with_context(|| format!("[store::layer] Layer '{}' has no attribute '{attribute}'", self.name))?;
        ensure!(is_numeric(column.dtype()),
            "[store::layer] Attribute '{attribute}' of layer '{}' is not numeric ({})", self.name, column.dtype());

        let column = column.cast(&DataType::Float64)?;
        let values = column.f64()?;
        Ok(self.ids.iter().cloned().zip(values.into_iter()).collect())
    }

    /// Copy of this layer with no outputs, named `name`.
    pub(crate) fn derive(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id_column: self.id_column.clone(),
            ids: self.ids.clone(),
            index: self.index.clone(),
            data: self.data.clone(),
            outputs: Vec::new(),
            discarded: vec![false; self.ids.len()],
            derived: true,
        }
    }

    fn row(&self, id: &FeatureId) -> Result<usize> {
        let row = *self.index.get(id)
            .ok_or_else(|| anyhow!("[store::layer] Feature {id} not found in layer '{}'", self.name))?;
        ensure!(!self.discarded[row], "[store::layer] Feature {id} was discarded from layer '{}'", self.name);
        Ok(row)
    }

    /// Set an output attribute for one feature. The attribute is created on first
    /// write and keeps the kind of that first value. In a derived layer, an output
    /// replaces any copied attribute of the same name.
    pub(crate) fn write(&mut self, id: &FeatureId, attribute: &str, value: FieldValue) -> Result<()> {
        let row = self.row(id)?;
        ensure!(attribute != self.id_column,
            "[store::layer] Cannot overwrite id column '{attribute}' of layer '{}'", self.name);
        if self.data.get_column_index(attribute).is_some() {
            ensure!(self.derived,
                "[store::layer] Cannot overwrite input attribute '{attribute}' of layer '{}'", self.name);
            self.data.drop_in_place(attribute)?;
            debug!(layer = %self.name, attribute, "replacing copied attribute with output");
        }

        let position = match self.outputs.iter().position(|column| column.name == attribute) {
            Some(position) => position,
            None => {
                self.outputs.push(OutputColumn {
                    name: attribute.to_string(),
                    kind: value.kind(),
                    values: vec![None; self.ids.len()],
                });
                self.outputs.len() - 1
            }
        };

        let column = &mut self.outputs[position];
        ensure!(column.kind == value.kind(),
            "[store::layer] Attribute '{attribute}' holds {:?} values, got {:?}", column.kind, value.kind());
        column.values[row] = Some(value);
        Ok(())
    }

    /// Drop a feature from the layer's materialized output.
    pub(crate) fn discard(&mut self, id: &FeatureId) -> Result<()> {
        let row = self.row(id)?;
        self.discarded[row] = true;
        for column in &mut self.outputs {
            column.values[row] = None;
        }
        Ok(())
    }

    /// True if the feature was discarded after a failed write.
    pub fn is_discarded(&self, id: &FeatureId) -> bool {
        self.index.get(id).is_some_and(|&row| self.discarded[row])
    }

    /// Value of an output attribute for one feature, if written.
    pub fn output(&self, id: &FeatureId, attribute: &str) -> Option<FieldValue> {
        let row = *self.index.get(id)?;
        self.outputs.iter()
            .find(|column| column.name == attribute)
            .and_then(|column| column.values[row])
    }

    /// Names of output attributes in creation order.
    pub fn output_names(&self) -> Vec<&str> {
        self.outputs.iter().map(|column| column.name.as_str()).collect()
    }

    /// Materialize the layer as a single table: id column first, then input
    /// attributes, then outputs. Discarded features are left out.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut df = self.data.clone();

        for output in &self.outputs {
            let name: PlSmallStr = output.name.as_str().into();
            let column = match output.kind {
                FieldKind::Float => Column::new(name, output.values.iter()
                    .map(|value| value.map(|v| v.as_f64()))
                    .collect::<Vec<Option<f64>>>()),
                FieldKind::Integer => Column::new(name, output.values.iter()
                    .map(|value| match value {
                        Some(FieldValue::Integer(v)) => Some(*v),
                        _ => None,
                    })
                    .collect::<Vec<Option<u32>>>()),
            };
            df.with_column(column)
                .with_context(|| format!("[store::layer] Failed to add output '{}'", output.name))?;
        }

        let ids = Column::new(self.id_column.as_str().into(),
            self.ids.iter().map(|id| id.as_str()).collect::<Vec<_>>());
        df.insert_column(0, ids)?;

        if self.discarded.iter().any(|&d| d) {
            let keep: Vec<bool> = self.discarded.iter().map(|&d| !d).collect();
            let mask = BooleanChunked::from_slice("keep".into(), &keep);
            df = df.filter(&mask)?;
        }

        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        DataFrame::new(vec![
            Column::new("site".into(), &["a", "b", "c"]),
            Column::new("slope".into(), &[1.0, 2.5, 4.0]),
            Column::new("roads".into(), &[3i64, 0, 7]),
            Column::new("zone".into(), &["r", "c", "r"]),
        ]).unwrap()
    }

    #[test]
    fn ids_from_column() {
        let layer = Layer::from_dataframe("sites", sample(), Some("site")).unwrap();
        assert_eq!(layer.ids(), &[FeatureId::new("a"), FeatureId::new("b"), FeatureId::new("c")]);
        assert_eq!(layer.numeric_attribute_names(), vec!["slope", "roads"]);
        assert!(layer.data().get_column_index("site").is_none());
    }

    #[test]
    fn ids_from_row_numbers() {
        let layer = Layer::from_dataframe("sites", sample(), None).unwrap();
        assert_eq!(layer.id_column(), DEFAULT_ID_COLUMN);
        assert_eq!(layer.ids()[2], FeatureId::new("2"));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let df = DataFrame::new(vec![
            Column::new("site".into(), &["a", "a"]),
            Column::new("slope".into(), &[1.0, 2.0]),
        ]).unwrap();
        assert!(Layer::from_dataframe("sites", df, Some("site")).is_err());
    }

    #[test]
    fn integer_values_are_widened() {
        let layer = Layer::from_dataframe("sites", sample(), Some("site")).unwrap();
        let values = layer.values("roads").unwrap();
        assert_eq!(values[2], (FeatureId::new("c"), Some(7.0)));
        assert!(layer.values("zone").is_err());
        assert!(layer.values("missing").is_err());
    }

    #[test]
    fn outputs_materialize_with_nulls_and_discards() {
        let mut layer = Layer::from_dataframe("sites", sample(), Some("site")).unwrap().derive("out");
        layer.write(&"a".into(), "score", FieldValue::Float(12.5)).unwrap();
        layer.write(&"a".into(), "rank", FieldValue::Integer(1)).unwrap();
        layer.write(&"c".into(), "score", FieldValue::Float(3.0)).unwrap();
        layer.discard(&"c".into()).unwrap();

        assert!(layer.write(&"b".into(), "site", FieldValue::Float(0.0)).is_err());
        assert!(layer.write(&"b".into(), "rank", FieldValue::Float(0.0)).is_err());
        assert!(layer.write(&"c".into(), "rank", FieldValue::Integer(2)).is_err());

        let df = layer.to_dataframe().unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.get_column_names()[0].as_str(), "site");

        let ranks = df.column("rank").unwrap().u32().unwrap();
        assert_eq!(ranks.get(0), Some(1));
        assert_eq!(ranks.get(1), None);
        assert!(layer.is_discarded(&"c".into()));
        assert_eq!(layer.output(&"a".into(), "score"), Some(FieldValue::Float(12.5)));
    }

    #[test]
    fn derived_output_replaces_copied_attribute() {
        let source = Layer::from_dataframe("sites", sample(), Some("site")).unwrap();
        let mut layer = source.derive("out");
        layer.write(&"b".into(), "slope", FieldValue::Float(9.0)).unwrap();
        layer.write(&"c".into(), "slope", FieldValue::Float(1.0)).unwrap();

        assert!(layer.data().get_column_index("slope").is_none());
        assert_eq!(layer.output_names(), vec!["slope"]);

        let df = layer.to_dataframe().unwrap();
        let slope = df.column("slope").unwrap().f64().unwrap();
        assert_eq!((slope.get(0), slope.get(1), slope.get(2)), (None, Some(9.0), Some(1.0)));
        assert_eq!(source.values("slope").unwrap()[1].1, Some(2.5));
    }

    #[test]
    fn source_layer_inputs_are_never_overwritten() {
        let mut layer = Layer::from_dataframe("sites", sample(), Some("site")).unwrap();
        assert!(layer.write(&"a".into(), "slope", FieldValue::Float(0.0)).is_err());
        assert_eq!(layer.values("slope").unwrap()[0].1, Some(1.0));
    }
}
