use thiserror::Error;

use datamap_core::{SelectionError, SeriesError};
use datamap_renderer::LayerError;

use crate::ready::ReadyError;

#[derive(Error, Debug)]
pub enum MapError {
    #[error("Series error: {0}")]
    Series(#[from] SeriesError),

    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),

    #[error("Layer error: {0}")]
    Layer(#[from] LayerError),

    #[error("{0}")]
    NotReady(#[from] ReadyError),

    #[error("Points have already been added to this map")]
    PointsAlreadyAdded,

    #[error("No points have been added to this map")]
    PointsNotAdded,

    #[error("Text search is not configured; add metadata with a search field first")]
    SearchNotConfigured,
}
