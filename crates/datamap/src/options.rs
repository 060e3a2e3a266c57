//! Per-call configuration for the map facade.
//!
//! Every struct deserializes from a partial JSON object; missing keys take
//! the defaults below.

use serde::{Deserialize, Serialize};

use datamap_core::{Rgba, LASSO_SELECTION, TEXT_SEARCH};
use datamap_renderer::{ClickFn, TooltipFn, ViewState, Viewport};

/// Map-wide settings fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Data bounds as `[min_x, max_x, min_y, max_y]`.
    pub bounds: [f64; 4],
    pub viewport_width: f64,
    pub viewport_height: f64,
    /// Zoom levels subtracted from the fitted zoom.
    pub padding: f64,
    pub search_kind: String,
    pub lasso_kind: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            bounds: [-1.0, 1.0, -1.0, 1.0],
            viewport_width: 1280.0,
            viewport_height: 800.0,
            padding: 0.5,
            search_kind: TEXT_SEARCH.to_string(),
            lasso_kind: LASSO_SELECTION.to_string(),
        }
    }
}

impl MapConfig {
    pub fn with_bounds(mut self, bounds: [f64; 4]) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn initial_view_state(&self) -> ViewState {
        Viewport::new(self.viewport_width, self.viewport_height).fit_bounds(self.bounds, self.padding)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointOptions {
    /// Uniform point radius. A negative value reads per-point sizes from the series.
    pub point_size: f32,
    pub outline_color: Rgba,
    pub line_width: f32,
    pub hover_color: Rgba,
    pub line_width_max_pixels: f32,
    pub line_width_min_pixels: f32,
    pub radius_max_pixels: f32,
    pub radius_min_pixels: f32,
    /// Text column drawn next to each point when zoomed in.
    pub text_field: Option<String>,
    pub text_min_zoom: f64,
    pub text_size: f32,
    pub text_offset: [f32; 2],
    /// Fixed text color; defaults to each point's own color.
    pub text_color: Option<Rgba>,
    pub text_outline_width: f32,
    pub text_outline_color: Rgba,
}

impl Default for PointOptions {
    fn default() -> Self {
        Self {
            point_size: 1.0,
            outline_color: Rgba::new(250, 250, 250, 128),
            line_width: 0.001,
            hover_color: Rgba::new(170, 0, 0, 187),
            line_width_max_pixels: 3.0,
            line_width_min_pixels: 0.001,
            radius_max_pixels: 16.0,
            radius_min_pixels: 0.2,
            text_field: None,
            text_min_zoom: 10.0,
            text_size: 12.0,
            text_offset: [0.0, 10.0],
            text_color: None,
            text_outline_width: 2.0,
            text_outline_color: Rgba::new(255, 255, 255, 200),
        }
    }
}

impl PointOptions {
    pub fn variable_size(&self) -> bool {
        self.point_size < 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelOptions {
    /// Fixed label color; defaults to each label's own color.
    pub text_color: Option<Rgba>,
    pub text_min_pixel_size: f32,
    pub text_max_pixel_size: f32,
    pub text_outline_width: f32,
    pub text_outline_color: Rgba,
    pub text_background_color: Rgba,
    pub font_family: String,
    pub min_font_weight: f32,
    pub max_font_weight: f32,
    pub line_spacing: f32,
    pub text_collision_size_scale: f32,
    pub pickable: bool,
}

impl Default for LabelOptions {
    fn default() -> Self {
        Self {
            text_color: None,
            text_min_pixel_size: 18.0,
            text_max_pixel_size: 36.0,
            text_outline_width: 8.0,
            text_outline_color: Rgba::new(238, 238, 238, 221),
            text_background_color: Rgba::new(255, 255, 255, 64),
            font_family: "Roboto".to_string(),
            min_font_weight: 100.0,
            max_font_weight: 900.0,
            line_spacing: 0.95,
            text_collision_size_scale: 3.0,
            pickable: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryOptions {
    pub cluster_boundary_line_width: f32,
}

impl Default for BoundaryOptions {
    fn default() -> Self {
        Self {
            cluster_boundary_line_width: 0.5,
        }
    }
}

/// Tooltip, click and search wiring for [`crate::DataMap::add_meta_data`].
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct MetaDataOptions {
    /// Metadata column matched by text search.
    pub search_field: Option<String>,
    /// Custom tooltip; without one, the `hover_text` column is used when present.
    #[serde(skip)]
    pub tooltip: Option<TooltipFn>,
    #[serde(skip)]
    pub on_click: Option<ClickFn>,
}

impl MetaDataOptions {
    pub fn with_search_field(mut self, field: &str) -> Self {
        self.search_field = Some(field.to_string());
        self
    }

    pub fn with_tooltip(mut self, tooltip: TooltipFn) -> Self {
        self.tooltip = Some(tooltip);
        self
    }

    pub fn with_on_click(mut self, handler: ClickFn) -> Self {
        self.on_click = Some(handler);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_point_options() {
        let opts: PointOptions =
            serde_json::from_str(r#"{"point_size": -1, "text_field": "title", "outline_color": [1, 2, 3, 4]}"#)
                .unwrap();
        assert!(opts.variable_size());
        assert_eq!(opts.text_field.as_deref(), Some("title"));
        assert_eq!(opts.outline_color, Rgba::new(1, 2, 3, 4));
        assert_eq!(opts.radius_max_pixels, 16.0);
    }

    #[test]
    fn test_label_defaults() {
        let opts: LabelOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, LabelOptions::default());
        assert_eq!(opts.font_family, "Roboto");
    }

    #[test]
    fn test_map_config_kinds() {
        let config: MapConfig = serde_json::from_str(r#"{"lasso_kind": "brush"}"#).unwrap();
        assert_eq!(config.lasso_kind, "brush");
        assert_eq!(config.search_kind, TEXT_SEARCH);
    }

    #[test]
    fn test_initial_view_centers_bounds() {
        let view = MapConfig::default().with_bounds([2.0, 6.0, -4.0, 0.0]).initial_view_state();
        assert_eq!(view.longitude, 4.0);
        assert_eq!(view.latitude, -2.0);
        assert!(view.zoom.is_finite());
    }

    #[test]
    fn test_meta_data_options_json() {
        let opts: MetaDataOptions = serde_json::from_str(r#"{"search_field": "hover_text"}"#).unwrap();
        assert_eq!(opts.search_field.as_deref(), Some("hover_text"));
        assert!(opts.tooltip.is_none());
    }
}
