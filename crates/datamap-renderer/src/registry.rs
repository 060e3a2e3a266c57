use thiserror::Error;

use crate::layer::{DrawLayer, LayerId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayerError {
    #[error("Label layer ordinal {ordinal} exceeds the limit of {max} label layers")]
    TooManyLabelLayers { ordinal: u32, max: u32 },

    #[error("Layer '{0}' is already registered")]
    DuplicateLayer(LayerId),

    #[error("Layer '{0}' is not registered")]
    UnknownLayer(LayerId),

    #[error("Unrecognized layer name '{0}'")]
    UnknownLayerName(String),
}

/// Ordered list of draw layers handed to the renderer.
///
/// Layers are appended, replaced by id, and re-sorted into paint order with
/// [`LayerRegistry::resort`] before every publish.
#[derive(Debug, Clone, Default)]
pub struct LayerRegistry {
    layers: Vec<DrawLayer>,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    pub fn append(&mut self, layer: DrawLayer) -> Result<(), LayerError> {
        let id = layer.id();
        id.check()?;
        if self.contains(id) {
            return Err(LayerError::DuplicateLayer(id));
        }
        self.layers.push(layer);
        Ok(())
    }

    /// Append several layers; nothing is appended if any of them is rejected.
    pub fn extend<I>(&mut self, layers: I) -> Result<(), LayerError>
    where
        I: IntoIterator<Item = DrawLayer>,
    {
        let layers: Vec<DrawLayer> = layers.into_iter().collect();
        for (i, layer) in layers.iter().enumerate() {
            let id = layer.id();
            id.check()?;
            if self.contains(id) || layers[..i].iter().any(|l| l.id() == id) {
                return Err(LayerError::DuplicateLayer(id));
            }
        }
        self.layers.extend(layers);
        Ok(())
    }

    /// Swap the layer registered as `old` for `layer`, keeping its position.
    ///
    /// Returns the replaced layer.
    pub fn replace(&mut self, old: LayerId, layer: DrawLayer) -> Result<DrawLayer, LayerError> {
        let new_id = layer.id();
        new_id.check()?;
        if new_id != old && self.contains(new_id) {
            return Err(LayerError::DuplicateLayer(new_id));
        }
        let slot = self
            .layers
            .iter_mut()
            .find(|l| l.id() == old)
            .ok_or(LayerError::UnknownLayer(old))?;
        Ok(std::mem::replace(slot, layer))
    }

    /// Stable sort into paint order.
    pub fn resort(&mut self) {
        self.layers.sort_by_key(|l| l.id());
    }

    pub fn get(&self, id: LayerId) -> Option<&DrawLayer> {
        self.layers.iter().find(|l| l.id() == id)
    }

    pub fn contains(&self, id: LayerId) -> bool {
        self.layers.iter().any(|l| l.id() == id)
    }

    pub fn position(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id() == id)
    }

    pub fn layers(&self) -> &[DrawLayer] {
        &self.layers
    }

    pub fn ids(&self) -> Vec<LayerId> {
        self.layers.iter().map(DrawLayer::id).collect()
    }

    pub fn label_layer_count(&self) -> usize {
        self.layers.iter().filter(|l| l.id().is_label()).count()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{ImageProps, LayerProps};

    fn layer(id: LayerId) -> DrawLayer {
        // Props are irrelevant to ordering.
        DrawLayer::new(
            id,
            LayerProps::Image(ImageProps {
                image: String::new(),
                bounds: [0.0; 4],
            }),
        )
    }

    #[test]
    fn test_resort_any_insertion_order() {
        let expected = vec![
            LayerId::Image,
            LayerId::Points,
            LayerId::PointText,
            LayerId::Boundaries,
            LayerId::Label(0),
            LayerId::Label(1),
            LayerId::Label(2),
            LayerId::Label(3),
        ];
        let orders = [
            vec![7, 6, 5, 4, 3, 2, 1, 0],
            vec![4, 0, 5, 1, 6, 2, 7, 3],
            vec![3, 7, 1, 5, 0, 4, 2, 6],
        ];
        for order in orders {
            let mut registry = LayerRegistry::new();
            for i in order {
                registry.append(layer(expected[i])).unwrap();
                registry.resort();
            }
            assert_eq!(registry.ids(), expected);
        }
    }

    #[test]
    fn test_label_ordinals_sort_numerically() {
        let mut registry = LayerRegistry::new();
        registry
            .extend([LayerId::Label(10), LayerId::Label(9), LayerId::Label(99), LayerId::Label(0)].map(layer))
            .unwrap();
        registry.resort();
        assert_eq!(
            registry.ids(),
            vec![LayerId::Label(0), LayerId::Label(9), LayerId::Label(10), LayerId::Label(99)]
        );
        assert_eq!(registry.label_layer_count(), 4);
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut registry = LayerRegistry::new();
        registry
            .extend([LayerId::Image, LayerId::Points, LayerId::Boundaries].map(layer))
            .unwrap();
        let old = registry
            .replace(LayerId::Points, layer(LayerId::Points).with_visible(false))
            .unwrap();
        assert!(old.visible());
        assert_eq!(registry.position(LayerId::Points), Some(1));
        assert!(!registry.get(LayerId::Points).unwrap().visible());
    }

    #[test]
    fn test_replace_unknown_layer() {
        let mut registry = LayerRegistry::new();
        assert_eq!(
            registry.replace(LayerId::Points, layer(LayerId::Points)).unwrap_err(),
            LayerError::UnknownLayer(LayerId::Points)
        );
    }

    #[test]
    fn test_rejects_duplicates_and_ordinal_overflow() {
        let mut registry = LayerRegistry::new();
        registry.append(layer(LayerId::Points)).unwrap();
        assert_eq!(
            registry.append(layer(LayerId::Points)),
            Err(LayerError::DuplicateLayer(LayerId::Points))
        );
        assert!(matches!(
            registry.append(layer(LayerId::Label(100))),
            Err(LayerError::TooManyLabelLayers { ordinal: 100, .. })
        ));

        let batch = [LayerId::Label(0), LayerId::Label(0)].map(layer);
        assert!(registry.extend(batch).is_err());
        assert_eq!(registry.len(), 1);
    }
}
