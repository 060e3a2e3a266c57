use std::sync::Arc;

use crate::layer::{AttributeBuffer, AttributeName, DrawLayer, LayerId, LayerProps, Transition};
use crate::registry::{LayerError, LayerRegistry};

/// A change to one or more per-point attributes of a layer.
#[derive(Debug, Clone)]
pub enum AttributeUpdate {
    /// New filter state plus the matching minimum radius. Applied instantly.
    Filter {
        values: Arc<[f32]>,
        radius_min_pixels: f32,
    },
    /// New fill colors (flat RGBA). Animated with [`Transition::RECOLOR`].
    FillColor(Arc<[u8]>),
}

/// Owns the update version and turns attribute changes into new layer snapshots.
///
/// Every mutation bumps the version and stamps it onto the triggers of the
/// attributes it touched, so the renderer re-reads exactly those buffers.
#[derive(Debug, Default)]
pub struct AttributeCoordinator {
    version: u64,
}

impl AttributeCoordinator {
    pub fn new() -> Self {
        Self { version: 0 }
    }

    /// Current update version.
    pub fn version(&self) -> u64 {
        self.version
    }

    fn bump(&mut self) -> u64 {
        self.version += 1;
        self.version
    }

    /// Build the snapshot of `layer` with `update` applied.
    pub fn apply(&mut self, layer: &DrawLayer, update: AttributeUpdate) -> DrawLayer {
        let version = self.bump();
        match update {
            AttributeUpdate::Filter {
                values,
                radius_min_pixels,
            } => {
                let layer = layer.clone();
                let layer = match layer.props() {
                    LayerProps::Scatter(props) => {
                        let mut props = props.clone();
                        props.radius_min_pixels = radius_min_pixels;
                        layer.with_props(LayerProps::Scatter(props))
                    }
                    _ => layer,
                };
                log::debug!(
                    "Filter update for '{}' at version {}",
                    layer.id(),
                    version
                );
                layer
                    .with_attribute(AttributeName::FilterValue, AttributeBuffer::f32(values, 1), version)
                    .with_trigger(AttributeName::RadiusMinPixels, version)
            }
            AttributeUpdate::FillColor(colors) => {
                log::debug!(
                    "Fill color update for '{}' at version {}",
                    layer.id(),
                    version
                );
                layer
                    .clone()
                    .with_attribute(AttributeName::FillColor, AttributeBuffer::u8(colors, 4), version)
                    .with_transition(AttributeName::FillColor, Transition::RECOLOR)
            }
        }
    }

    pub fn apply_filter(&mut self, layer: &DrawLayer, values: Arc<[f32]>, radius_min_pixels: f32) -> DrawLayer {
        self.apply(
            layer,
            AttributeUpdate::Filter {
                values,
                radius_min_pixels,
            },
        )
    }

    pub fn apply_fill_colors(&mut self, layer: &DrawLayer, colors: Arc<[u8]>) -> DrawLayer {
        self.apply(layer, AttributeUpdate::FillColor(colors))
    }

    /// Apply `update` to the registered layer `id` and swap the snapshot in.
    pub fn update<'r>(
        &mut self,
        registry: &'r mut LayerRegistry,
        id: LayerId,
        update: AttributeUpdate,
    ) -> Result<&'r DrawLayer, LayerError> {
        let current = registry.get(id).ok_or(LayerError::UnknownLayer(id))?;
        let next = self.apply(current, update);
        registry.replace(id, next)?;
        registry.get(id).ok_or(LayerError::UnknownLayer(id))
    }
}

/// Attributes the renderer must re-read when moving from `previous` to `next`.
pub fn stale_attributes(previous: &DrawLayer, next: &DrawLayer) -> Vec<AttributeName> {
    next.update_triggers()
        .filter(|(name, version)| previous.update_trigger(*name) != Some(*version))
        .map(|(name, _)| name)
        .collect()
}
