use serde::Serialize;

use crate::layer::DrawLayer;

/// Tooltip text for a hovered point, by point index.
pub type TooltipFn = Box<dyn Fn(usize) -> Option<String>>;
/// Handler invoked with the index of a clicked point.
pub type ClickFn = Box<dyn FnMut(usize)>;

/// Complete layer list sent to the renderer.
///
/// Layers share their buffers with the registry, so building a frame is cheap.
#[derive(Debug, Clone, Serialize)]
pub struct RenderFrame {
    pub layers: Vec<DrawLayer>,
    /// Update version at the time the frame was built.
    pub version: u64,
}

impl RenderFrame {
    pub fn new(layers: &[DrawLayer], version: u64) -> Self {
        Self {
            layers: layers.to_vec(),
            version,
        }
    }

    pub fn layer_names(&self) -> Vec<String> {
        self.layers.iter().map(|l| l.id().to_string()).collect()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// The GPU layer renderer as seen from the map.
///
/// Publishing is fire-and-forget; publishing an identical frame twice must be
/// harmless.
pub trait RenderBoundary {
    fn publish(&mut self, frame: RenderFrame);

    fn set_tooltip(&mut self, _tooltip: TooltipFn) {}

    fn set_on_click(&mut self, _handler: ClickFn) {}
}

impl<B: RenderBoundary + ?Sized> RenderBoundary for Box<B> {
    fn publish(&mut self, frame: RenderFrame) {
        (**self).publish(frame)
    }

    fn set_tooltip(&mut self, tooltip: TooltipFn) {
        (**self).set_tooltip(tooltip)
    }

    fn set_on_click(&mut self, handler: ClickFn) {
        (**self).set_on_click(handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{ImageProps, LayerId, LayerProps};

    #[test]
    fn test_frame_json() {
        let layer = DrawLayer::new(
            LayerId::Image,
            LayerProps::Image(ImageProps {
                image: "tiles/background.png".to_string(),
                bounds: [-1.0, -1.0, 1.0, 1.0],
            }),
        );
        let frame = RenderFrame::new(&[layer], 4);
        assert_eq!(frame.layer_names(), vec!["imageLayer"]);

        let json: serde_json::Value = serde_json::from_str(&frame.to_json().unwrap()).unwrap();
        assert_eq!(json["version"], 4);
        assert_eq!(json["layers"][0]["id"], "imageLayer");
        assert_eq!(json["layers"][0]["props"]["kind"], "image");
        assert_eq!(json["layers"][0]["props"]["image"], "tiles/background.png");
    }
}
