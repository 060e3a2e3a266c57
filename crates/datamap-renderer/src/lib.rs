//! # Datamap Renderer
//!
//! The map's side of the rendering boundary: immutable draw layers with
//! versioned attribute buffers, the registry that keeps them in paint order,
//! and the coordinator that turns per-point changes into minimal updates.
//!
//! Rasterization itself belongs to the external layer renderer, which
//! receives [`RenderFrame`]s through the [`RenderBoundary`] trait.

pub mod attributes;
pub mod layer;
pub mod registry;
pub mod render_data;
pub mod viewport;

pub use attributes::{stale_attributes, AttributeCoordinator, AttributeUpdate};
pub use layer::{AttributeBuffer, AttributeName, DrawLayer, LayerId, LayerProps, Transition, MAX_LABEL_LAYERS};
pub use registry::{LayerError, LayerRegistry};
pub use render_data::{ClickFn, RenderBoundary, RenderFrame, TooltipFn};
pub use viewport::{ViewState, Viewport};
