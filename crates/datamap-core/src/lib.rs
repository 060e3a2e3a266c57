//! # Datamap Core
//!
//! Data model for point-cloud maps (points, labels, boundaries, metadata) and
//! the selection-state engine: named selection sets and the combinator that
//! folds them into a tri-state per-point filter.

pub mod color;
pub mod filter;
pub mod palette;
pub mod selection;
pub mod series;

pub use color::Rgba;
pub use filter::{combine, radius_adjustment, Combination};
pub use palette::PaletteCache;
pub use selection::{SelectionError, SelectionStore, LASSO_SELECTION, TEXT_SEARCH};
pub use series::{Boundary, ColorData, Label, MetaData, PointSeries, SeriesError};
