//! Construction of the initial draw layers from series data and options.

use std::sync::Arc;

use datamap_core::series::max_label_level;
use datamap_core::{Boundary, Label, PointSeries, Rgba, SeriesError};
use datamap_renderer::layer::{
    ImageProps, LabelEntry, LabelLayerProps, PolygonProps, ScatterProps, TextItem, TextProps,
};
use datamap_renderer::{AttributeBuffer, AttributeName, DrawLayer, LayerError, LayerId, LayerProps};

use crate::options::{BoundaryOptions, LabelOptions, PointOptions};

/// Filter values in this range are drawn; -1.0 falls outside it.
const FILTER_RANGE: [f32; 2] = [-0.5, 1.5];
/// Semi-selected (0.0) points fade toward transparent across this range.
const FILTER_SOFT_RANGE: [f32; 2] = [0.75, 1.25];
const POINT_TEXT_FONT: &str = "Arial, sans-serif";
const POINT_TEXT_COLLISION_STRIDE: usize = 5;
/// Boundary line widths are `size²` times this factor times the configured width.
const BOUNDARY_WIDTH_FACTOR: f32 = 5e-5;
const BOUNDARY_MAX_PIXELS: f32 = 4.0;

/// The scatter layer for every point, with all points initially selected.
pub fn point_layer(
    series: &PointSeries,
    colors: Arc<[u8]>,
    options: &PointOptions,
    version: u64,
) -> Result<DrawLayer, SeriesError> {
    let n = series.len();
    let variable_size = options.variable_size();
    let props = ScatterProps {
        instance_count: n,
        radius: (!variable_size).then_some(options.point_size),
        line_color: options.outline_color,
        line_width: options.line_width,
        highlight_color: options.hover_color,
        line_width_min_pixels: options.line_width_min_pixels,
        line_width_max_pixels: options.line_width_max_pixels,
        radius_min_pixels: options.radius_min_pixels,
        radius_max_pixels: options.radius_max_pixels,
        filter_range: FILTER_RANGE,
        filter_soft_range: FILTER_SOFT_RANGE,
    };

    let mut layer = DrawLayer::new(LayerId::Points, LayerProps::Scatter(props))
        .with_pickable(true)
        .with_buffer(AttributeName::Position, AttributeBuffer::f32(series.positions(), 2))
        .with_buffer(AttributeName::FillColor, AttributeBuffer::u8(colors, 4))
        .with_attribute(
            AttributeName::FilterValue,
            AttributeBuffer::f32(vec![1.0; n], 1),
            version,
        );

    if variable_size {
        let sizes = series
            .size
            .as_ref()
            .ok_or_else(|| SeriesError::MissingColumn("size".to_string()))?;
        layer = layer.with_buffer(AttributeName::Radius, AttributeBuffer::f32(sizes.clone(), 1));
    }
    Ok(layer)
}

/// Per-point text, hidden until the view zooms past the text threshold.
///
/// Returns `None` when no text field is configured or the series lacks it.
pub fn point_text_layer(series: &PointSeries, options: &PointOptions) -> Option<DrawLayer> {
    let field = options.text_field.as_deref()?;
    let Some(texts) = series.text_column(field) else {
        log::warn!("Point text field '{}' not found; skipping text layer", field);
        return None;
    };

    let items = texts
        .iter()
        .enumerate()
        .map(|(index, text)| TextItem {
            position: [series.x[index], series.y[index]],
            text: text.clone(),
            index,
            color: options
                .text_color
                .or_else(|| series.color(index).map(|c| c.with_alpha(255)))
                .unwrap_or_default(),
        })
        .collect();

    let props = TextProps {
        items,
        size: options.text_size,
        pixel_offset: options.text_offset,
        outline_width: options.text_outline_width,
        outline_color: options.text_outline_color,
        font_family: POINT_TEXT_FONT.to_string(),
        collision_stride: POINT_TEXT_COLLISION_STRIDE,
    };
    Some(DrawLayer::new(LayerId::PointText, LayerProps::Text(props)).with_visible(false))
}

/// One label layer per stacking level `0..=K`.
///
/// Layer `i` holds every label of level `i` or above; only labels of level
/// `i` are opaque, the rest only take part in collision testing. Font weight
/// rises linearly from the finest to the coarsest level.
pub fn label_layers(labels: &[Label], options: &LabelOptions) -> Result<Vec<DrawLayer>, LayerError> {
    let Some(max_level) = max_label_level(labels) else {
        return Ok(Vec::new());
    };
    LayerId::label(max_level)?;

    let weight_step = if max_level == 0 {
        0.0
    } else {
        (options.max_font_weight - options.min_font_weight) / max_level as f32
    };

    let layers = (0..=max_level)
        .map(|level| {
            let entries = labels
                .iter()
                .filter(|l| l.layer >= level)
                .map(|l| label_entry(l, level, options))
                .collect();
            let props = LabelLayerProps {
                entries,
                font_family: options.font_family.clone(),
                font_weight: options.min_font_weight + weight_step * level as f32,
                line_height: options.line_spacing,
                size_min_pixels: options.text_min_pixel_size,
                size_max_pixels: options.text_max_pixel_size,
                outline_width: options.text_outline_width,
                outline_color: options.text_outline_color,
                background_padding: [15.0; 4],
                collision_group: format!("LabelGroup{}", level),
                collision_size_scale: options.text_collision_size_scale
                    * (2 + max_level - level) as f32,
                collision_size_min_pixels: 2.0 * options.text_min_pixel_size + 5.0,
                collision_size_max_pixels: 2.0 * options.text_max_pixel_size + 5.0,
                collision_background_padding: [30.0; 4],
            };
            DrawLayer::new(LayerId::Label(level), LayerProps::Labels(props))
                .with_pickable(options.pickable)
        })
        .collect();
    Ok(layers)
}

fn label_entry(label: &Label, level: u32, options: &LabelOptions) -> LabelEntry {
    let own_level = label.layer == level;
    let color = options.text_color.unwrap_or_else(|| label.color());
    LabelEntry {
        position: [label.x, label.y],
        text: label.label.clone(),
        size: label.size,
        color: color.with_alpha(if own_level { 255 } else { 0 }),
        background: if own_level {
            options.text_background_color
        } else {
            Rgba::TRANSPARENT
        },
        collision_priority: label.size + level as f32,
    }
}

/// Cluster outlines; larger clusters get quadratically wider lines.
pub fn boundary_layer(boundaries: Vec<Boundary>, options: &BoundaryOptions) -> DrawLayer {
    let line_widths = boundaries.iter().map(|b| b.size * b.size).collect();
    let props = PolygonProps {
        boundaries,
        line_widths,
        line_width_scale: options.cluster_boundary_line_width * BOUNDARY_WIDTH_FACTOR,
        line_width_min_pixels: 0.0,
        line_width_max_pixels: BOUNDARY_MAX_PIXELS,
    };
    DrawLayer::new(LayerId::Boundaries, LayerProps::Polygon(props))
}

pub fn image_layer(image: &str, bounds: [f64; 4]) -> DrawLayer {
    DrawLayer::new(
        LayerId::Image,
        LayerProps::Image(ImageProps {
            image: image.to_string(),
            bounds,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label_props(layer: &DrawLayer) -> &LabelLayerProps {
        match layer.props() {
            LayerProps::Labels(p) => p,
            other => panic!("not a label layer: {:?}", other),
        }
    }

    fn labels() -> Vec<Label> {
        vec![
            Label::new("fine", 0.0, 0.0, 0).with_size(2.0),
            Label::new("middle", 1.0, 1.0, 1).with_size(3.0),
            Label::new("coarse", 2.0, 2.0, 2).with_size(5.0),
        ]
    }

    #[test]
    fn test_one_label_layer_per_level() {
        let layers = label_layers(&labels(), &LabelOptions::default()).unwrap();
        let ids: Vec<LayerId> = layers.iter().map(DrawLayer::id).collect();
        assert_eq!(ids, vec![LayerId::Label(0), LayerId::Label(1), LayerId::Label(2)]);

        // Level 1 holds labels of level >= 1, only its own is opaque.
        let props = label_props(&layers[1]);
        let texts: Vec<&str> = props.entries.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["middle", "coarse"]);
        assert_eq!(props.entries[0].color.a, 255);
        assert_eq!(props.entries[1].color.a, 0);
        assert_eq!(props.entries[1].background, Rgba::TRANSPARENT);
        assert_eq!(props.entries[1].collision_priority, 6.0);
        assert_eq!(props.collision_group, "LabelGroup1");
        assert_eq!(props.collision_size_scale, 3.0 * 3.0);
    }

    #[test]
    fn test_font_weight_interpolates() {
        let layers = label_layers(&labels(), &LabelOptions::default()).unwrap();
        let weights: Vec<f32> = layers.iter().map(|l| label_props(l).font_weight).collect();
        assert_eq!(weights, vec![100.0, 500.0, 900.0]);

        let single = label_layers(&labels()[..1], &LabelOptions::default()).unwrap();
        assert_eq!(label_props(&single[0]).font_weight, 100.0);
    }

    #[test]
    fn test_label_level_cap() {
        let labels = vec![Label::new("deep", 0.0, 0.0, 100)];
        assert!(matches!(
            label_layers(&labels, &LabelOptions::default()),
            Err(LayerError::TooManyLabelLayers { ordinal: 100, .. })
        ));
        assert!(label_layers(&[], &LabelOptions::default()).unwrap().is_empty());
    }

    #[test]
    fn test_boundary_width_is_quadratic() {
        let layer = boundary_layer(
            vec![
                Boundary::new(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]], 2.0, Rgba::default()),
                Boundary::new(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]], 3.0, Rgba::default()),
            ],
            &BoundaryOptions::default(),
        );
        match layer.props() {
            LayerProps::Polygon(p) => {
                assert_eq!(p.line_widths, vec![4.0, 9.0]);
                assert!((p.line_width_scale - 0.5 * 5e-5).abs() < 1e-12);
            }
            other => panic!("not a polygon layer: {:?}", other),
        }
    }

    #[test]
    fn test_point_text_layer_skipped_for_missing_field() {
        let mut series = PointSeries::new();
        series.push(0.0, 0.0, Rgba::new(10, 20, 30, 40));
        let options = PointOptions {
            text_field: Some("title".to_string()),
            ..PointOptions::default()
        };
        assert!(point_text_layer(&series, &options).is_none());

        let series = series.with_text_column("title", vec!["first".to_string()]);
        let layer = point_text_layer(&series, &options).unwrap();
        assert!(!layer.visible());
        match layer.props() {
            LayerProps::Text(p) => assert_eq!(p.items[0].color, Rgba::new(10, 20, 30, 255)),
            other => panic!("not a text layer: {:?}", other),
        }
    }

    #[test]
    fn test_variable_size_needs_size_column() {
        let mut series = PointSeries::new();
        series.push(0.0, 0.0, Rgba::default());
        let options = PointOptions {
            point_size: -1.0,
            ..PointOptions::default()
        };
        assert!(point_layer(&series, series.colors().into(), &options, 0).is_err());

        let series = series.with_sizes(vec![3.0]);
        let layer = point_layer(&series, series.colors().into(), &options, 0).unwrap();
        assert!(layer.attribute(AttributeName::Radius).is_some());
    }
}
