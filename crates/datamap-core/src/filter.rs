//! Selection combinator: folds the selection store into a per-point filter state.

use crate::selection::SelectionStore;

/// Filter value of a point excluded by the active selection.
pub const DESELECTED: f32 = -1.0;
/// Filter value of a point matched by a basic kind while the lasso is active.
pub const SEMI_SELECTED: f32 = 0.0;
/// Filter value of a selected point (and of every point when nothing is selected).
pub const SELECTED: f32 = 1.0;

/// Result of combining every named selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Combination {
    /// One tri-state value per point.
    pub filter: Vec<f32>,
    /// Points at full selection while a selection is active, ascending.
    ///
    /// This is the special set when the lasso is active, the basic union
    /// otherwise, and empty when no selection is active.
    pub selected: Vec<usize>,
}

impl Combination {
    pub fn has_selection(&self) -> bool {
        !self.selected.is_empty()
    }

    /// Damping factor for the selection outline, `None` when nothing is selected.
    pub fn radius_adjustment(&self) -> Option<f32> {
        radius_adjustment(self.selected.len(), self.filter.len())
    }
}

/// Recompute the filter state for `len` points from scratch.
///
/// | special | basic | result |
/// |---------|-------|--------|
/// | no      | no    | all 1.0 |
/// | no      | yes   | -1.0, basic union 1.0 |
/// | yes     | no    | -1.0, special 1.0 |
/// | yes     | yes   | -1.0, basic union 0.0, special 1.0 |
pub fn combine(store: &SelectionStore, len: usize) -> Combination {
    let special_active = store.has_special();
    let basic = store.basic_union();
    let basic_active = !basic.is_empty();

    if !special_active && !basic_active {
        return Combination {
            filter: vec![SELECTED; len],
            selected: Vec::new(),
        };
    }

    let mut filter = vec![DESELECTED; len];
    let selected: Vec<usize> = if special_active {
        if basic_active {
            for &i in basic.iter().filter(|&&i| i < len) {
                filter[i] = SEMI_SELECTED;
            }
        }
        // Special is applied last so it wins over the semi-selected state.
        store.special_set().into_iter().filter(|&i| i < len).collect()
    } else {
        basic.into_iter().filter(|&i| i < len).collect()
    };
    for &i in &selected {
        filter[i] = SELECTED;
    }

    log::debug!(
        "Combined selection: special={} basic={} selected={} of {}",
        special_active,
        basic_active,
        selected.len(),
        len
    );

    Combination { filter, selected }
}

/// `1 / (1 + sqrt(count) / log2(len))`, or `None` when `count` is zero.
///
/// `len` is clamped to 2 so that tiny series keep a finite scalar.
pub fn radius_adjustment(selected_count: usize, len: usize) -> Option<f32> {
    if selected_count == 0 {
        return None;
    }
    let log_len = (len.max(2) as f32).log2();
    Some(1.0 / (1.0 + (selected_count as f32).sqrt() / log_len))
}

/// Minimum point radius in pixels for the current selection.
pub fn selection_radius_min_pixels(base: f32, combination: &Combination) -> f32 {
    match combination.radius_adjustment() {
        Some(adjust) => 2.0 * (base + adjust),
        None => base,
    }
}
