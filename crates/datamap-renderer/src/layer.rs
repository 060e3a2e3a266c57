use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use datamap_core::{Boundary, Rgba};

use crate::registry::LayerError;

/// Maximum number of label sub-layers in one map (ordinals `0..MAX_LABEL_LAYERS`).
pub const MAX_LABEL_LAYERS: u32 = 100;

/// Identity of a draw layer.
///
/// Variant order is paint order: image, points, point text, boundaries, then
/// label layers by ordinal. Sorting a layer list by id yields the draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum LayerId {
    Image,
    Points,
    PointText,
    Boundaries,
    Label(u32),
}

impl LayerId {
    /// Label layer id, rejecting ordinals past the label layer cap.
    pub fn label(ordinal: u32) -> Result<Self, LayerError> {
        let id = LayerId::Label(ordinal);
        id.check()?;
        Ok(id)
    }

    pub fn check(&self) -> Result<(), LayerError> {
        match *self {
            LayerId::Label(ordinal) if ordinal >= MAX_LABEL_LAYERS => {
                Err(LayerError::TooManyLabelLayers {
                    ordinal,
                    max: MAX_LABEL_LAYERS,
                })
            }
            _ => Ok(()),
        }
    }

    pub fn is_label(&self) -> bool {
        matches!(self, LayerId::Label(_))
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerId::Image => f.write_str("imageLayer"),
            LayerId::Points => f.write_str("dataPointLayer"),
            LayerId::PointText => f.write_str("pointTextLayer"),
            LayerId::Boundaries => f.write_str("boundaryLayer"),
            LayerId::Label(k) => write!(f, "labelLayer-{}", k),
        }
    }
}

impl FromStr for LayerId {
    type Err = LayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "imageLayer" => Ok(LayerId::Image),
            "dataPointLayer" => Ok(LayerId::Points),
            "pointTextLayer" => Ok(LayerId::PointText),
            "boundaryLayer" => Ok(LayerId::Boundaries),
            _ => s
                .strip_prefix("labelLayer-")
                .and_then(|k| k.parse::<u32>().ok())
                .ok_or_else(|| LayerError::UnknownLayerName(s.to_string()))
                .and_then(LayerId::label),
        }
    }
}

impl From<LayerId> for String {
    fn from(id: LayerId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for LayerId {
    type Error = LayerError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

// ── Attribute buffers ─────────────────────────────────────────────────

/// Per-instance attributes a layer can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttributeName {
    Position,
    FillColor,
    FilterValue,
    Radius,
    /// Not a buffer; carried as a trigger so the renderer re-reads the prop.
    RadiusMinPixels,
}

#[derive(Debug, Clone, Serialize)]
pub enum BufferData {
    F32(Arc<[f32]>),
    U8(Arc<[u8]>),
}

/// A flat attribute buffer with `size` components per instance.
#[derive(Debug, Clone, Serialize)]
pub struct AttributeBuffer {
    pub data: BufferData,
    pub size: usize,
}

impl AttributeBuffer {
    pub fn f32(values: impl Into<Arc<[f32]>>, size: usize) -> Self {
        Self {
            data: BufferData::F32(values.into()),
            size,
        }
    }

    pub fn u8(values: impl Into<Arc<[u8]>>, size: usize) -> Self {
        Self {
            data: BufferData::U8(values.into()),
            size,
        }
    }

    pub fn len(&self) -> usize {
        match &self.data {
            BufferData::F32(v) => v.len(),
            BufferData::U8(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn instance_count(&self) -> usize {
        if self.size == 0 {
            0
        } else {
            self.len() / self.size
        }
    }

    pub fn as_f32(&self) -> Option<&[f32]> {
        match &self.data {
            BufferData::F32(v) => Some(&v[..]),
            BufferData::U8(_) => None,
        }
    }

    pub fn as_u8(&self) -> Option<&[u8]> {
        match &self.data {
            BufferData::U8(v) => Some(&v[..]),
            BufferData::F32(_) => None,
        }
    }

    /// Whether both buffers share the same allocation.
    pub fn same_buffer(&self, other: &AttributeBuffer) -> bool {
        match (&self.data, &other.data) {
            (BufferData::F32(a), BufferData::F32(b)) => Arc::ptr_eq(a, b),
            (BufferData::U8(a), BufferData::U8(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Easing {
    Linear,
    CubicInOut,
}

impl Easing {
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// Animated interpolation the renderer applies when an attribute changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub duration_ms: u32,
    pub easing: Easing,
}

impl Transition {
    /// The smooth recolor used for palette swaps.
    pub const RECOLOR: Transition = Transition {
        duration_ms: 1500,
        easing: Easing::CubicInOut,
    };
}

// ── Layer props ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageProps {
    /// Image location or data URL, resolved by the renderer.
    pub image: String,
    /// `[min_x, min_y, max_x, max_y]` in data coordinates.
    pub bounds: [f64; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterProps {
    pub instance_count: usize,
    /// Uniform radius; `None` when the layer carries a radius buffer.
    pub radius: Option<f32>,
    pub line_color: Rgba,
    pub line_width: f32,
    pub highlight_color: Rgba,
    pub line_width_min_pixels: f32,
    pub line_width_max_pixels: f32,
    pub radius_min_pixels: f32,
    pub radius_max_pixels: f32,
    /// Filter values inside this range are drawn.
    pub filter_range: [f32; 2],
    /// Filter values fade in across the soft range.
    pub filter_soft_range: [f32; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextItem {
    pub position: [f32; 2],
    pub text: String,
    pub index: usize,
    pub color: Rgba,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextProps {
    pub items: Vec<TextItem>,
    pub size: f32,
    pub pixel_offset: [f32; 2],
    pub outline_width: f32,
    pub outline_color: Rgba,
    pub font_family: String,
    /// Only every n-th item takes part in collision thinning.
    pub collision_stride: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonProps {
    pub boundaries: Vec<Boundary>,
    /// One line width per boundary, in common units before scaling.
    pub line_widths: Vec<f32>,
    pub line_width_scale: f32,
    pub line_width_min_pixels: f32,
    pub line_width_max_pixels: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEntry {
    pub position: [f32; 2],
    pub text: String,
    pub size: f32,
    pub color: Rgba,
    pub background: Rgba,
    pub collision_priority: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelLayerProps {
    pub entries: Vec<LabelEntry>,
    pub font_family: String,
    pub font_weight: f32,
    pub line_height: f32,
    pub size_min_pixels: f32,
    pub size_max_pixels: f32,
    pub outline_width: f32,
    pub outline_color: Rgba,
    pub background_padding: [f32; 4],
    pub collision_group: String,
    pub collision_size_scale: f32,
    pub collision_size_min_pixels: f32,
    pub collision_size_max_pixels: f32,
    pub collision_background_padding: [f32; 4],
}

/// Renderer-specific props, one variant per layer kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LayerProps {
    Image(ImageProps),
    Scatter(ScatterProps),
    Text(TextProps),
    Polygon(PolygonProps),
    Labels(LabelLayerProps),
}

// ── Draw layer ────────────────────────────────────────────────────────

/// An immutable renderable unit.
///
/// Every builder consumes the layer and returns a new value; a layer already
/// handed to the registry or the renderer is never modified.
#[derive(Debug, Clone, Serialize)]
pub struct DrawLayer {
    id: LayerId,
    visible: bool,
    pickable: bool,
    props: Arc<LayerProps>,
    attributes: BTreeMap<AttributeName, AttributeBuffer>,
    update_triggers: BTreeMap<AttributeName, u64>,
    transitions: BTreeMap<AttributeName, Transition>,
}

impl DrawLayer {
    pub fn new(id: LayerId, props: LayerProps) -> Self {
        Self {
            id,
            visible: true,
            pickable: false,
            props: Arc::new(props),
            attributes: BTreeMap::new(),
            update_triggers: BTreeMap::new(),
            transitions: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn pickable(&self) -> bool {
        self.pickable
    }

    pub fn props(&self) -> &LayerProps {
        &self.props
    }

    pub fn attribute(&self, name: AttributeName) -> Option<&AttributeBuffer> {
        self.attributes.get(&name)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (AttributeName, &AttributeBuffer)> {
        self.attributes.iter().map(|(k, v)| (*k, v))
    }

    pub fn update_trigger(&self, name: AttributeName) -> Option<u64> {
        self.update_triggers.get(&name).copied()
    }

    pub fn update_triggers(&self) -> impl Iterator<Item = (AttributeName, u64)> + '_ {
        self.update_triggers.iter().map(|(k, v)| (*k, *v))
    }

    pub fn transition(&self, name: AttributeName) -> Option<&Transition> {
        self.transitions.get(&name)
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_pickable(mut self, pickable: bool) -> Self {
        self.pickable = pickable;
        self
    }

    pub fn with_props(mut self, props: LayerProps) -> Self {
        self.props = Arc::new(props);
        self
    }

    /// Attach an initial buffer without an update trigger.
    pub fn with_buffer(mut self, name: AttributeName, buffer: AttributeBuffer) -> Self {
        self.attributes.insert(name, buffer);
        self
    }

    /// Replace a buffer and stamp its update trigger with `version`.
    pub fn with_attribute(mut self, name: AttributeName, buffer: AttributeBuffer, version: u64) -> Self {
        self.attributes.insert(name, buffer);
        self.update_triggers.insert(name, version);
        self
    }

    pub fn with_trigger(mut self, name: AttributeName, version: u64) -> Self {
        self.update_triggers.insert(name, version);
        self
    }

    pub fn with_transition(mut self, name: AttributeName, transition: Transition) -> Self {
        self.transitions.insert(name, transition);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_layer() -> DrawLayer {
        DrawLayer::new(
            LayerId::Image,
            LayerProps::Image(ImageProps {
                image: "background.png".to_string(),
                bounds: [0.0, 0.0, 1.0, 1.0],
            }),
        )
    }

    #[test]
    fn test_layer_id_names() {
        assert_eq!(LayerId::Points.to_string(), "dataPointLayer");
        assert_eq!(LayerId::Label(7).to_string(), "labelLayer-7");
        assert_eq!("labelLayer-12".parse::<LayerId>().unwrap(), LayerId::Label(12));
        assert_eq!("boundaryLayer".parse::<LayerId>().unwrap(), LayerId::Boundaries);
        assert!("labelLayer-x".parse::<LayerId>().is_err());
        assert!("labelLayer-100".parse::<LayerId>().is_err());
    }

    #[test]
    fn test_layer_id_json_uses_names() {
        assert_eq!(serde_json::to_string(&LayerId::Image).unwrap(), r#""imageLayer""#);
        assert_eq!(serde_json::to_string(&LayerId::Label(3)).unwrap(), r#""labelLayer-3""#);
        let parsed: LayerId = serde_json::from_str(r#""labelLayer-3""#).unwrap();
        assert_eq!(parsed, LayerId::Label(3));
        assert!(serde_json::from_str::<LayerId>(r#""labelLayer-100""#).is_err());
    }

    #[test]
    fn test_layer_id_order() {
        let mut ids = vec![
            LayerId::Label(10),
            LayerId::Label(2),
            LayerId::Boundaries,
            LayerId::Image,
            LayerId::PointText,
            LayerId::Points,
        ];
        ids.sort();
        assert_eq!(
            ids,
            vec![
                LayerId::Image,
                LayerId::Points,
                LayerId::PointText,
                LayerId::Boundaries,
                LayerId::Label(2),
                LayerId::Label(10),
            ]
        );
    }

    #[test]
    fn test_label_cap() {
        assert!(LayerId::label(99).is_ok());
        assert_eq!(
            LayerId::label(100),
            Err(LayerError::TooManyLabelLayers { ordinal: 100, max: 100 })
        );
    }

    #[test]
    fn test_builders_leave_original_untouched() {
        let original = image_layer();
        let updated = original
            .clone()
            .with_visible(false)
            .with_attribute(AttributeName::FilterValue, AttributeBuffer::f32(vec![1.0], 1), 3);
        assert!(original.visible());
        assert!(original.attribute(AttributeName::FilterValue).is_none());
        assert!(!updated.visible());
        assert_eq!(updated.update_trigger(AttributeName::FilterValue), Some(3));
    }

    #[test]
    fn test_buffer_identity() {
        let a = AttributeBuffer::u8(vec![1, 2, 3, 4, 5, 6, 7, 8], 4);
        let b = a.clone();
        let c = AttributeBuffer::u8(vec![1, 2, 3, 4, 5, 6, 7, 8], 4);
        assert_eq!(a.instance_count(), 2);
        assert!(a.same_buffer(&b));
        assert!(!a.same_buffer(&c));
    }

    #[test]
    fn test_linear_easing_clamps() {
        assert_eq!(Easing::Linear.apply(0.25), 0.25);
        assert_eq!(Easing::Linear.apply(1.5), 1.0);
        assert_eq!(Easing::Linear.apply(-0.5), 0.0);
    }

    #[test]
    fn test_cubic_easing_endpoints() {
        assert_eq!(Easing::CubicInOut.apply(0.0), 0.0);
        assert_eq!(Easing::CubicInOut.apply(1.0), 1.0);
        assert!((Easing::CubicInOut.apply(0.5) - 0.5).abs() < 1e-6);
    }
}
