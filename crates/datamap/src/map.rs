use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use datamap_core::filter::selection_radius_min_pixels;
use datamap_core::selection::check_indices;
use datamap_core::{
    combine, Boundary, ColorData, Label, MetaData, PaletteCache, PointSeries, SelectionStore,
    SeriesError,
};
use datamap_renderer::{
    AttributeBuffer, AttributeCoordinator, AttributeName, AttributeUpdate, DrawLayer, LayerId,
    LayerRegistry, RenderBoundary, RenderFrame, TooltipFn, ViewState,
};

use crate::error::MapError;
use crate::layers;
use crate::linked::{LassoSelector, LinkedHistogram, SelectionCallback};
use crate::options::{BoundaryOptions, LabelOptions, MapConfig, MetaDataOptions, PointOptions};
use crate::ready::{ReadyHandle, ReadySignal};

/// What the map keeps from the point series after the layers are built.
struct PointState {
    len: usize,
    original_colors: Arc<[u8]>,
    radius_min_pixels: f32,
    text_min_zoom: f64,
}

/// Outcome of [`DataMap::add_selection_handler`].
///
/// Only a lasso registration is pending; it completes once the lasso
/// selector attaches through [`DataMap::lasso_signal`].
#[must_use = "a lasso handler is only registered once `wait` is awaited"]
pub struct HandlerRegistration {
    pending: Option<(ReadyHandle<Arc<dyn LassoSelector>>, SelectionCallback)>,
    timeout: Duration,
}

impl HandlerRegistration {
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Finish the registration, failing if the selector does not attach in time.
    pub async fn wait(self) -> Result<(), MapError> {
        let Some((handle, callback)) = self.pending else {
            return Ok(());
        };
        let selector = handle.wait(self.timeout).await?;
        selector.register_selection_handler(callback);
        log::info!("Registered lasso selection handler");
        Ok(())
    }
}

/// Interactive point map.
///
/// Owns the selection store, the layer registry and the update version, and
/// publishes a fresh [`RenderFrame`] to its rendering boundary after every
/// change.
pub struct DataMap<B: RenderBoundary> {
    config: MapConfig,
    view_state: ViewState,
    boundary: B,
    registry: LayerRegistry,
    coordinator: AttributeCoordinator,
    selections: SelectionStore,
    points: Option<PointState>,
    selected: Vec<usize>,
    search: Option<Vec<String>>,
    histogram: Option<Box<dyn LinkedHistogram>>,
    callbacks: HashMap<String, Vec<SelectionCallback>>,
    lasso: ReadySignal<Arc<dyn LassoSelector>>,
    palettes: PaletteCache,
}

impl<B: RenderBoundary> DataMap<B> {
    pub fn new(config: MapConfig, boundary: B) -> Self {
        let view_state = config.initial_view_state();
        log::info!(
            "Created map at ({:.3}, {:.3}) zoom {:.2}",
            view_state.longitude,
            view_state.latitude,
            view_state.zoom
        );
        Self {
            selections: SelectionStore::new(&config.lasso_kind),
            config,
            view_state,
            boundary,
            registry: LayerRegistry::new(),
            coordinator: AttributeCoordinator::new(),
            points: None,
            selected: Vec::new(),
            search: None,
            histogram: None,
            callbacks: HashMap::new(),
            lasso: ReadySignal::new("lasso selector"),
            palettes: PaletteCache::new(),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn view_state(&self) -> ViewState {
        self.view_state
    }

    pub fn boundary(&self) -> &B {
        &self.boundary
    }

    /// Layers in paint order.
    pub fn layers(&self) -> &[DrawLayer] {
        self.registry.layers()
    }

    pub fn version(&self) -> u64 {
        self.coordinator.version()
    }

    /// Current per-point filter state, once points are added.
    pub fn filter_state(&self) -> Option<&[f32]> {
        self.registry
            .get(LayerId::Points)?
            .attribute(AttributeName::FilterValue)?
            .as_f32()
    }

    /// The primary selection: the lasso set while the lasso is active,
    /// otherwise the union of every other selection.
    pub fn selected_indices(&self) -> &[usize] {
        &self.selected
    }

    /// Number of alternate palettes built so far.
    pub fn palette_builds(&self) -> usize {
        self.palettes.builds()
    }

    /// Signal the host resolves once the lasso selector exists.
    pub fn lasso_signal(&self) -> ReadySignal<Arc<dyn LassoSelector>> {
        self.lasso.clone()
    }

    pub fn attach_lasso_selector(&self, selector: Arc<dyn LassoSelector>) -> bool {
        self.lasso.resolve(selector)
    }

    fn point_state(&self) -> Result<&PointState, MapError> {
        self.points.as_ref().ok_or(MapError::PointsNotAdded)
    }

    // ── Registration ──────────────────────────────────────────────────

    pub fn add_points(&mut self, series: &PointSeries, options: &PointOptions) -> Result<(), MapError> {
        if self.points.is_some() {
            return Err(MapError::PointsAlreadyAdded);
        }
        series.validate()?;

        let colors: Arc<[u8]> = series.colors().into();
        let point_layer =
            layers::point_layer(series, Arc::clone(&colors), options, self.coordinator.version())?;
        let mut new_layers = vec![point_layer];
        new_layers.extend(layers::point_text_layer(series, options));
        self.registry.extend(new_layers)?;

        self.points = Some(PointState {
            len: series.len(),
            original_colors: colors,
            radius_min_pixels: options.radius_min_pixels,
            text_min_zoom: options.text_min_zoom,
        });
        log::info!(
            "Added {} points (text layer: {})",
            series.len(),
            self.registry.contains(LayerId::PointText)
        );
        self.publish();
        Ok(())
    }

    pub fn add_labels(&mut self, labels: &[Label], options: &LabelOptions) -> Result<(), MapError> {
        let label_layers = layers::label_layers(labels, options)?;
        let count = label_layers.len();
        self.registry.extend(label_layers)?;
        log::info!("Added {} labels in {} label layers", labels.len(), count);
        self.publish();
        Ok(())
    }

    pub fn add_boundaries(
        &mut self,
        boundaries: Vec<Boundary>,
        options: &BoundaryOptions,
    ) -> Result<(), MapError> {
        let count = boundaries.len();
        self.registry.append(layers::boundary_layer(boundaries, options))?;
        log::info!("Added {} cluster boundaries", count);
        self.publish();
        Ok(())
    }

    pub fn add_background_image(&mut self, image: &str, bounds: [f64; 4]) -> Result<(), MapError> {
        self.registry.append(layers::image_layer(image, bounds))?;
        log::info!("Added background image '{}'", image);
        self.publish();
        Ok(())
    }

    /// Wire tooltips, clicks and text search to per-point metadata.
    ///
    /// Without a custom tooltip, the `hover_text` column is shown when present.
    pub fn add_meta_data(&mut self, metadata: &MetaData, options: MetaDataOptions) -> Result<(), MapError> {
        let len = self.point_state()?.len;
        for (name, values) in &metadata.columns {
            if values.len() != len {
                return Err(SeriesError::LengthMismatch {
                    column: name.clone(),
                    expected: len,
                    actual: values.len(),
                }
                .into());
            }
        }
        let search = match options.search_field.as_deref() {
            Some(field) => {
                let column = metadata
                    .column(field)
                    .ok_or_else(|| SeriesError::MissingColumn(field.to_string()))?;
                Some(column.iter().map(|s| s.to_lowercase()).collect::<Vec<_>>())
            }
            None => None,
        };

        let tooltip = options.tooltip.or_else(|| {
            metadata.hover_text().map(|texts| {
                let texts = texts.to_vec();
                Box::new(move |index: usize| texts.get(index).cloned()) as TooltipFn
            })
        });
        if let Some(tooltip) = tooltip {
            self.boundary.set_tooltip(tooltip);
        }
        if let Some(on_click) = options.on_click {
            self.boundary.set_on_click(on_click);
        }
        if search.is_some() {
            self.search = search;
        }
        log::info!(
            "Added metadata with {} columns (search: {})",
            metadata.columns.len(),
            options.search_field.as_deref().unwrap_or("none")
        );
        Ok(())
    }

    pub fn connect_histogram(&mut self, histogram: Box<dyn LinkedHistogram>) {
        log::info!("Connected histogram '{}'", histogram.id());
        self.histogram = Some(histogram);
    }

    // ── Selection ─────────────────────────────────────────────────────

    /// Replace the selection of `kind`. An empty slice removes it.
    pub fn add_selection(&mut self, indices: &[usize], kind: &str) -> Result<(), MapError> {
        let len = self.point_state()?.len;
        check_indices(kind, indices, len)?;
        self.selections.set_selection(kind, indices.iter().copied());
        log::debug!("Selection '{}' set to {} points", kind, indices.len());
        self.highlight(kind)
    }

    /// Remove the selection of `kind`; a kind that was never added is ignored.
    pub fn remove_selection(&mut self, kind: &str) -> Result<(), MapError> {
        self.point_state()?;
        if !self.selections.remove_selection(kind) {
            log::debug!("Selection '{}' not present; nothing to remove", kind);
            return Ok(());
        }
        log::debug!("Selection '{}' removed", kind);
        self.highlight(kind)
    }

    /// Case-insensitive substring search over the configured search field.
    ///
    /// Returns the number of matches. An empty term clears the search.
    pub fn search_text(&mut self, term: &str) -> Result<usize, MapError> {
        let kind = self.config.search_kind.clone();
        if term.is_empty() {
            if self.search.is_none() {
                return Err(MapError::SearchNotConfigured);
            }
            self.remove_selection(&kind)?;
            return Ok(0);
        }

        let needle = term.to_lowercase();
        let matches: Vec<usize> = self
            .search
            .as_ref()
            .ok_or(MapError::SearchNotConfigured)?
            .iter()
            .enumerate()
            .filter(|(_, text)| text.contains(&needle))
            .map(|(i, _)| i)
            .collect();
        log::debug!("Search '{}' matched {} points", term, matches.len());
        self.add_selection(&matches, &kind)?;
        Ok(matches.len())
    }

    /// Recombine every selection and push the result to the renderer, the
    /// histogram and the callbacks registered for `origin`.
    fn highlight(&mut self, origin: &str) -> Result<(), MapError> {
        let state = self.point_state()?;
        let combination = combine(&self.selections, state.len);
        let radius_min_pixels = selection_radius_min_pixels(state.radius_min_pixels, &combination);

        self.coordinator.update(
            &mut self.registry,
            LayerId::Points,
            AttributeUpdate::Filter {
                values: combination.filter.into(),
                radius_min_pixels,
            },
        )?;
        self.selected = combination.selected;
        self.publish();

        if let Some(histogram) = self.histogram.as_mut() {
            if histogram.id() != origin {
                if self.selected.is_empty() {
                    histogram.remove_chart_with_selection(&self.selected);
                } else {
                    histogram.draw_chart_with_selection(&self.selected);
                }
            }
        }
        self.notify(origin);
        Ok(())
    }

    fn notify(&self, kind: &str) {
        if let Some(callbacks) = self.callbacks.get(kind) {
            for callback in callbacks {
                callback(&self.selected);
            }
        }
    }

    /// Register `callback` for selections of `kind`.
    ///
    /// Other kinds are registered immediately and called by the map with the
    /// primary selection after every change of that kind. For the lasso kind
    /// the callback goes to the lasso selector once it attaches; the returned
    /// [`HandlerRegistration`] waits up to `timeout` for that without
    /// borrowing the map.
    pub fn add_selection_handler(
        &mut self,
        callback: SelectionCallback,
        kind: &str,
        timeout: Duration,
    ) -> HandlerRegistration {
        if self.selections.is_special(kind) {
            log::debug!("Lasso handler waiting up to {:?} for the selector", timeout);
            return HandlerRegistration {
                pending: Some((self.lasso.handle(), callback)),
                timeout,
            };
        }
        let callbacks = self.callbacks.entry(kind.to_string()).or_default();
        callbacks.push(callback);
        log::debug!("Registered handler #{} for '{}'", callbacks.len(), kind);
        HandlerRegistration {
            pending: None,
            timeout,
        }
    }

    // ── Color ─────────────────────────────────────────────────────────

    /// Animate the points to the alternate palette stored under `field`.
    pub fn recolor_points(&mut self, colors: &ColorData, field: &str) -> Result<(), MapError> {
        let len = self.point_state()?.len;
        let palette = self
            .palettes
            .get_or_try_build(field, || colors.palette(field, len))?;
        self.coordinator.update(
            &mut self.registry,
            LayerId::Points,
            AttributeUpdate::FillColor(palette),
        )?;
        log::debug!("Recolored points by '{}'", field);
        self.publish();
        Ok(())
    }

    pub fn reset_point_colors(&mut self) -> Result<(), MapError> {
        let colors = Arc::clone(&self.point_state()?.original_colors);
        self.coordinator
            .update(&mut self.registry, LayerId::Points, AttributeUpdate::FillColor(colors))?;
        log::debug!("Reset point colors");
        self.publish();
        Ok(())
    }

    // ── Viewport ──────────────────────────────────────────────────────

    /// Record a camera change and toggle the point text at its zoom threshold.
    ///
    /// Returns whether the text layer visibility changed.
    pub fn on_view_state_change(&mut self, view_state: ViewState) -> Result<bool, MapError> {
        self.view_state = view_state;
        let Some(state) = self.points.as_ref() else {
            return Ok(false);
        };
        let Some(text_layer) = self.registry.get(LayerId::PointText) else {
            return Ok(false);
        };

        let visible = view_state.zoom >= state.text_min_zoom;
        if text_layer.visible() == visible {
            return Ok(false);
        }
        let next = text_layer.clone().with_visible(visible);
        self.registry.replace(LayerId::PointText, next)?;
        log::debug!("Point text {} at zoom {:.2}", if visible { "shown" } else { "hidden" }, view_state.zoom);
        self.publish();
        Ok(true)
    }

    // ── Publishing ────────────────────────────────────────────────────

    /// Sort the layers into paint order and hand them to the renderer.
    pub fn publish(&mut self) {
        self.registry.resort();
        let frame = RenderFrame::new(self.registry.layers(), self.coordinator.version());
        log::debug!("Publishing {} layers at version {}", frame.layers.len(), frame.version);
        self.boundary.publish(frame);
    }

    /// Fill colors currently on the point layer.
    pub fn point_colors(&self) -> Option<&AttributeBuffer> {
        self.registry.get(LayerId::Points)?.attribute(AttributeName::FillColor)
    }
}
