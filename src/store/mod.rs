//! Boundary to the external feature store: the source of indicator values and
//! the sink for score/rank writes.
//!
//! The pipeline only ever talks to a store through [`FeatureStore`]. [`MemoryStore`]
//! is the in-process implementation used by the CLI and the tests; it keeps each
//! layer's attribute table as a Polars `DataFrame`.

mod layer;
mod memory;

use std::fmt;

use anyhow::Result;

use crate::table::FeatureId;

pub use layer::{Layer, DEFAULT_ID_COLUMN};
pub use memory::MemoryStore;

/// Opaque reference to a layer held by a feature store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerHandle(pub(crate) usize);

impl fmt::Display for LayerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "layer#{}", self.0) }
}

/// A value written to an output attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Float(f64),
    Integer(u32),
}

/// Storage type of an output attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Float,
    Integer,
}

impl FieldValue {
    #[inline]
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Float(_) => FieldKind::Float,
            FieldValue::Integer(_) => FieldKind::Integer,
        }
    }

    #[inline]
    pub fn as_f64(&self) -> f64 {
        match *self {
            FieldValue::Float(v) => v,
            FieldValue::Integer(v) => f64::from(v),
        }
    }
}

/// Read/write access to geographic feature layers.
///
/// Reads are snapshot-once: the pipeline calls [`FeatureStore::get_feature_values`]
/// once per criterion and never reads again. Writes only target layers created
/// through [`FeatureStore::create_derived_layer`], so the source layer is never mutated.
pub trait FeatureStore {
    /// Names of the numeric attributes of `layer`, in schema order.
    fn list_numeric_attribute_names(&self, layer: LayerHandle) -> Result<Vec<String>>;

    /// Every feature of `layer` with its value for `attribute`.
    /// `None` marks a null or unparseable value.
    fn get_feature_values(&self, layer: LayerHandle, attribute: &str) -> Result<Vec<(FeatureId, Option<f64>)>>;

    /// Create an output layer holding a copy of every feature of `source`.
    fn create_derived_layer(&mut self, source: LayerHandle) -> Result<LayerHandle>;

    /// Write a single attribute value for one feature of an output layer.
    fn write_attribute(&mut self, layer: LayerHandle, id: &FeatureId, attribute: &str, value: FieldValue) -> Result<()>;

    /// Remove a feature from an output layer after a failed write.
    fn discard_feature(&mut self, layer: LayerHandle, id: &FeatureId) -> Result<()>;
}
