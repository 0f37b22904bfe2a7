use anyhow::{Result, anyhow};

use crate::table::FeatureId;
use super::{FeatureStore, FieldValue, Layer, LayerHandle};

/// Simple in-memory feature store.
/// Layers are addressed by the handle returned from [`MemoryStore::add_layer`].
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    layers: Vec<Layer>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    /// Register a layer and return its handle.
    pub fn add_layer(&mut self, layer: Layer) -> LayerHandle {
        self.layers.push(layer);
        LayerHandle(self.layers.len() - 1)
    }

    #[inline] pub fn num_layers(&self) -> usize { self.layers.len() }

    pub fn layer(&self, handle: LayerHandle) -> Result<&Layer> {
        self.layers.get(handle.0)
            .ok_or_else(|| anyhow!("[store::memory] Unknown {handle}"))
    }

    fn layer_mut(&mut self, handle: LayerHandle) -> Result<&mut Layer> {
        self.layers.get_mut(handle.0)
            .ok_or_else(|| anyhow!("[store::memory] Unknown {handle}"))
    }
}

impl FeatureStore for MemoryStore {
    fn list_numeric_attribute_names(&self, layer: LayerHandle) -> Result<Vec<String>> {
        Ok(self.layer(layer)?.numeric_attribute_names())
    }

    fn get_feature_values(&self, layer: LayerHandle, attribute: &str) -> Result<Vec<(FeatureId, Option<f64>)>> {
        self.layer(layer)?.values(attribute)
    }

    fn create_derived_layer(&mut self, source: LayerHandle) -> Result<LayerHandle> {
        let source = self.layer(source)?;
        let derived = source.derive(format!("{}_suitability", source.name()));
        Ok(self.add_layer(derived))
    }

    fn write_attribute(&mut self, layer: LayerHandle, id: &FeatureId, attribute: &str, value: FieldValue) -> Result<()> {
        self.layer_mut(layer)?.write(id, attribute, value)
    }

    fn discard_feature(&mut self, layer: LayerHandle, id: &FeatureId) -> Result<()> {
        self.layer_mut(layer)?.discard(id)
    }
}
