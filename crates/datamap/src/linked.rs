use std::sync::Arc;

/// Callback observing the map's combined selection.
pub type SelectionCallback = Arc<dyn Fn(&[usize]) + Send + Sync>;

/// The lasso tool drawn over the canvas.
///
/// It attaches to the map after the map is built and reports spatial
/// selections to the handlers registered on it.
pub trait LassoSelector: Send + Sync {
    fn register_selection_handler(&self, handler: SelectionCallback);
}

/// An external chart cross-highlighting the map's selection.
pub trait LinkedHistogram {
    /// Selection kind used when the histogram itself drives a selection.
    fn id(&self) -> &str;

    fn draw_chart_with_selection(&mut self, indices: &[usize]);

    fn remove_chart_with_selection(&mut self, indices: &[usize]);
}
