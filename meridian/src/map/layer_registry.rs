//! Ordered collection of the panel's data layers.

use crate::layer::WmsLayer;

/// Ordered collection of WMS data layers with key-based access.
///
/// Layers are stored bottom-to-top: the renderer draws them in iteration order, and
/// point queries walk the collection in reverse so the top-most visible layer is tried
/// first.
#[derive(Debug, Default)]
pub struct LayerRegistry(Vec<WmsLayer>);

impl LayerRegistry {
    /// Adds a layer on top of the stack.
    pub fn push(&mut self, layer: WmsLayer) {
        self.0.push(layer);
    }

    /// Returns the count of layers in the registry.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the registry contains zero layers.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the layer with the given key.
    pub fn get(&self, key: &str) -> Option<&WmsLayer> {
        self.0.iter().find(|layer| layer.key() == key)
    }

    /// Returns a mutable reference to the layer with the given key.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut WmsLayer> {
        self.0.iter_mut().find(|layer| layer.key() == key)
    }

    /// Iterates over all layers bottom-to-top.
    pub fn iter(&self) -> impl Iterator<Item = &WmsLayer> {
        self.0.iter()
    }

    /// Iterates over mutable references to all layers bottom-to-top.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut WmsLayer> {
        self.0.iter_mut()
    }

    /// Iterates over the layers a point query should try: visible only, top-most first.
    pub fn query_stack(&self) -> impl Iterator<Item = &WmsLayer> {
        self.0.iter().rev().filter(|layer| layer.is_visible())
    }
}

impl From<Vec<WmsLayer>> for LayerRegistry {
    fn from(layers: Vec<WmsLayer>) -> Self {
        Self(layers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_registry() -> LayerRegistry {
        LayerRegistry::from(vec![
            WmsLayer::new("water", "city:water_bodies"),
            WmsLayer::new("building", "city:building"),
            WmsLayer::new("roads", "city:road_line"),
        ])
    }

    #[test]
    fn query_stack_is_reversed() {
        let registry = test_registry();
        let keys: Vec<_> = registry.query_stack().map(|layer| layer.key()).collect();

        assert_eq!(keys, ["roads", "building", "water"]);
    }

    #[test]
    fn query_stack_skips_hidden_layers() {
        let mut registry = test_registry();
        registry
            .get_mut("roads")
            .expect("layer exists")
            .set_visible(false);

        let keys: Vec<_> = registry.query_stack().map(|layer| layer.key()).collect();
        assert_eq!(keys, ["building", "water"]);
    }

    #[test]
    fn get_finds_layers_by_key() {
        let registry = test_registry();

        assert_eq!(
            registry.get("building").map(|layer| layer.name()),
            Some("city:building")
        );
        assert!(registry.get("fire").is_none());
    }
}
