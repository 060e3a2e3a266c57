use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::{interleave_rgba, Rgba};

// ── Errors ────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum SeriesError {
    #[error("Column '{column}' has {actual} entries, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Column '{0}' is missing")]
    MissingColumn(String),

    #[error("Invalid series JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn check_len(column: &str, expected: usize, actual: usize) -> Result<(), SeriesError> {
    if expected == actual {
        Ok(())
    } else {
        Err(SeriesError::LengthMismatch {
            column: column.to_string(),
            expected,
            actual,
        })
    }
}

// ── Points ────────────────────────────────────────────────────────────

/// Column-oriented point data. Point identity is the row index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PointSeries {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub r: Vec<u8>,
    pub g: Vec<u8>,
    pub b: Vec<u8>,
    pub a: Vec<u8>,
    /// Per-point radius, only read when the map is configured for variable sizes.
    #[serde(default)]
    pub size: Option<Vec<f32>>,
    /// Named text columns (e.g. a per-point title shown when zoomed in).
    #[serde(default)]
    pub text: BTreeMap<String, Vec<String>>,
}

impl PointSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, x: f32, y: f32, color: Rgba) {
        self.x.push(x);
        self.y.push(y);
        self.r.push(color.r);
        self.g.push(color.g);
        self.b.push(color.b);
        self.a.push(color.a);
    }

    pub fn with_sizes(mut self, sizes: Vec<f32>) -> Self {
        self.size = Some(sizes);
        self
    }

    pub fn with_text_column(mut self, name: &str, values: Vec<String>) -> Self {
        self.text.insert(name.to_string(), values);
        self
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Check that every column has one entry per point.
    pub fn validate(&self) -> Result<(), SeriesError> {
        let n = self.len();
        check_len("y", n, self.y.len())?;
        check_len("r", n, self.r.len())?;
        check_len("g", n, self.g.len())?;
        check_len("b", n, self.b.len())?;
        check_len("a", n, self.a.len())?;
        if let Some(size) = &self.size {
            check_len("size", n, size.len())?;
        }
        for (name, values) in &self.text {
            check_len(name, n, values.len())?;
        }
        Ok(())
    }

    /// Flat `[x0, y0, x1, y1, ...]` position buffer.
    pub fn positions(&self) -> Vec<f32> {
        self.x
            .iter()
            .zip(&self.y)
            .flat_map(|(&x, &y)| [x, y])
            .collect()
    }

    /// Flat RGBA color buffer.
    pub fn colors(&self) -> Vec<u8> {
        interleave_rgba(&self.r, &self.g, &self.b, &self.a)
    }

    pub fn color(&self, index: usize) -> Option<Rgba> {
        Some(Rgba::new(
            *self.r.get(index)?,
            *self.g.get(index)?,
            *self.b.get(index)?,
            *self.a.get(index)?,
        ))
    }

    pub fn text_column(&self, name: &str) -> Option<&[String]> {
        self.text.get(name).map(Vec::as_slice)
    }

    pub fn from_json(json: &str) -> Result<Self, SeriesError> {
        let series: Self = serde_json::from_str(json)?;
        series.validate()?;
        Ok(series)
    }
}

// ── Labels ────────────────────────────────────────────────────────────

/// A cluster label placed on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub x: f32,
    pub y: f32,
    pub label: String,
    pub size: f32,
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
    /// Stacking level; level 0 is the finest granularity.
    pub layer: u32,
}

impl Label {
    pub fn new(label: &str, x: f32, y: f32, layer: u32) -> Self {
        Self {
            x,
            y,
            label: label.to_string(),
            size: 1.0,
            r: 0,
            g: 0,
            b: 0,
            a: 255,
            layer,
        }
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn color(&self) -> Rgba {
        Rgba::new(self.r, self.g, self.b, self.a)
    }
}

/// Highest stacking level present, or `None` for an empty slice.
pub fn max_label_level(labels: &[Label]) -> Option<u32> {
    labels.iter().map(|l| l.layer).max()
}

// ── Boundaries ────────────────────────────────────────────────────────

/// A cluster boundary outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    pub polygon: Vec<[f64; 2]>,
    pub size: f32,
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Boundary {
    pub fn new(polygon: Vec<[f64; 2]>, size: f32, color: Rgba) -> Self {
        Self {
            polygon,
            size,
            r: color.r,
            g: color.g,
            b: color.b,
            a: color.a,
        }
    }

    pub fn color(&self) -> Rgba {
        Rgba::new(self.r, self.g, self.b, self.a)
    }
}

// ── Metadata and alternate colors ─────────────────────────────────────

/// Per-point string columns used for tooltips and text search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetaData {
    #[serde(flatten)]
    pub columns: BTreeMap<String, Vec<String>>,
}

impl MetaData {
    pub const HOVER_TEXT: &'static str = "hover_text";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column(mut self, name: &str, values: Vec<String>) -> Self {
        self.columns.insert(name.to_string(), values);
        self
    }

    pub fn column(&self, name: &str) -> Option<&[String]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn hover_text(&self) -> Option<&[String]> {
        self.column(Self::HOVER_TEXT)
    }
}

/// Alternate palettes stored as `<field>_r`, `<field>_g`, `<field>_b`, `<field>_a` columns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColorData {
    #[serde(flatten)]
    pub columns: BTreeMap<String, Vec<u8>>,
}

impl ColorData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, field: &str, colors: &[Rgba]) -> Self {
        let channels = [
            ("r", colors.iter().map(|c| c.r).collect::<Vec<_>>()),
            ("g", colors.iter().map(|c| c.g).collect()),
            ("b", colors.iter().map(|c| c.b).collect()),
            ("a", colors.iter().map(|c| c.a).collect()),
        ];
        for (suffix, values) in channels {
            self.columns.insert(format!("{field}_{suffix}"), values);
        }
        self
    }

    /// Build the flat RGBA buffer for `field`, checking it covers `expected` points.
    pub fn palette(&self, field: &str, expected: usize) -> Result<Vec<u8>, SeriesError> {
        let channel = |suffix: &str| -> Result<&[u8], SeriesError> {
            let name = format!("{field}_{suffix}");
            let values = self
                .columns
                .get(&name)
                .ok_or_else(|| SeriesError::MissingColumn(name.clone()))?;
            check_len(&name, expected, values.len())?;
            Ok(values)
        };
        Ok(interleave_rgba(
            channel("r")?,
            channel("g")?,
            channel("b")?,
            channel("a")?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_points() -> PointSeries {
        let mut s = PointSeries::new();
        s.push(0.0, 1.0, Rgba::new(1, 2, 3, 4));
        s.push(2.0, 3.0, Rgba::new(5, 6, 7, 8));
        s.push(4.0, 5.0, Rgba::new(9, 10, 11, 12));
        s
    }

    #[test]
    fn test_point_buffers() {
        let s = three_points();
        assert_eq!(s.len(), 3);
        assert_eq!(s.positions(), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(&s.colors()[4..8], &[5, 6, 7, 8]);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_length_mismatch() {
        let s = three_points().with_sizes(vec![1.0, 2.0]);
        match s.validate() {
            Err(SeriesError::LengthMismatch { column, expected, actual }) => {
                assert_eq!(column, "size");
                assert_eq!(expected, 3);
                assert_eq!(actual, 2);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_from_json() {
        let json = r#"{"x":[0,1],"y":[0,1],"r":[1,1],"g":[2,2],"b":[3,3],"a":[4,4],
                       "text":{"title":["a","b"]}}"#;
        let s = PointSeries::from_json(json).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.text_column("title").unwrap()[1], "b");
        assert!(s.size.is_none());

        let bad = r#"{"x":[0,1],"y":[0],"r":[1,1],"g":[2,2],"b":[3,3],"a":[4,4]}"#;
        assert!(PointSeries::from_json(bad).is_err());
    }

    #[test]
    fn test_palette() {
        let data = ColorData::new().with_field(
            "topic",
            &[Rgba::new(10, 20, 30, 40), Rgba::new(50, 60, 70, 80)],
        );
        assert_eq!(
            data.palette("topic", 2).unwrap(),
            vec![10, 20, 30, 40, 50, 60, 70, 80]
        );
        assert!(matches!(
            data.palette("missing", 2),
            Err(SeriesError::MissingColumn(_))
        ));
        assert!(matches!(
            data.palette("topic", 3),
            Err(SeriesError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_max_label_level() {
        let labels = vec![Label::new("a", 0.0, 0.0, 0), Label::new("b", 0.0, 0.0, 3)];
        assert_eq!(max_label_level(&labels), Some(3));
        assert_eq!(max_label_level(&[]), None);
    }
}
