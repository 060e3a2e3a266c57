//! Interactive point-cloud map.
//!
//! [`DataMap`] combines named selections (lasso, text search, linked charts)
//! into one per-point filter state and publishes ordered, immutable draw
//! layers to a [`RenderBoundary`].

pub mod error;
pub mod layers;
pub mod linked;
pub mod map;
pub mod options;
pub mod ready;

pub use datamap_core::{Boundary, ColorData, Label, MetaData, PointSeries, Rgba, LASSO_SELECTION, TEXT_SEARCH};
pub use datamap_renderer::{RenderBoundary, RenderFrame, ViewState};
pub use error::MapError;
pub use linked::{LassoSelector, LinkedHistogram, SelectionCallback};
pub use map::{DataMap, HandlerRegistration};
pub use options::{BoundaryOptions, LabelOptions, MapConfig, MetaDataOptions, PointOptions};
pub use ready::{ReadyError, ReadyHandle, ReadySignal};
