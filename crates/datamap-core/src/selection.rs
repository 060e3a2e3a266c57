use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

/// Default id of the lasso (special) selection kind.
pub const LASSO_SELECTION: &str = "lasso-selection";
/// Default id of the text-search selection kind.
pub const TEXT_SEARCH: &str = "text-search";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Selection '{kind}' references point {index}, but the series has {len} points")]
    IndexOutOfRange {
        kind: String,
        index: usize,
        len: usize,
    },
}

/// Named selection sets, one per selection kind.
///
/// Exactly one kind is special (the lasso); every other kind is basic and
/// basic kinds union together.
#[derive(Debug, Clone)]
pub struct SelectionStore {
    special_kind: String,
    sets: BTreeMap<String, BTreeSet<usize>>,
}

impl SelectionStore {
    pub fn new(special_kind: &str) -> Self {
        Self {
            special_kind: special_kind.to_string(),
            sets: BTreeMap::new(),
        }
    }

    pub fn special_kind(&self) -> &str {
        &self.special_kind
    }

    pub fn is_special(&self, kind: &str) -> bool {
        kind == self.special_kind
    }

    /// Replace the set for `kind`. An empty set removes the kind.
    pub fn set_selection<I>(&mut self, kind: &str, indices: I)
    where
        I: IntoIterator<Item = usize>,
    {
        let set: BTreeSet<usize> = indices.into_iter().collect();
        if set.is_empty() {
            self.sets.remove(kind);
        } else {
            self.sets.insert(kind.to_string(), set);
        }
    }

    /// Remove the set for `kind`. Returns whether anything was removed.
    pub fn remove_selection(&mut self, kind: &str) -> bool {
        self.sets.remove(kind).is_some()
    }

    pub fn get(&self, kind: &str) -> Option<&BTreeSet<usize>> {
        self.sets.get(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }

    pub fn has_special(&self) -> bool {
        self.sets
            .get(&self.special_kind)
            .is_some_and(|s| !s.is_empty())
    }

    /// The special kind's indices, empty when it has no selection.
    pub fn special_set(&self) -> BTreeSet<usize> {
        self.sets
            .get(&self.special_kind)
            .cloned()
            .unwrap_or_default()
    }

    /// Union of every basic kind's indices.
    pub fn basic_union(&self) -> BTreeSet<usize> {
        self.sets
            .iter()
            .filter(|(kind, _)| !self.is_special(kind))
            .flat_map(|(_, set)| set.iter().copied())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

impl Default for SelectionStore {
    fn default() -> Self {
        Self::new(LASSO_SELECTION)
    }
}

/// Fail fast when a selection names a point outside the series.
pub fn check_indices(kind: &str, indices: &[usize], len: usize) -> Result<(), SelectionError> {
    match indices.iter().find(|&&i| i >= len) {
        Some(&index) => Err(SelectionError::IndexOutOfRange {
            kind: kind.to_string(),
            index,
            len,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_and_remove() {
        let mut store = SelectionStore::default();
        store.set_selection("search", [1, 2, 2, 3]);
        assert_eq!(store.get("search").unwrap().len(), 3);

        store.set_selection("search", [7]);
        assert_eq!(store.get("search").unwrap().iter().copied().collect::<Vec<_>>(), vec![7]);

        store.set_selection("search", Vec::new());
        assert!(store.get("search").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_unknown_kind_is_noop() {
        let mut store = SelectionStore::default();
        store.set_selection("a", [1]);
        assert!(!store.remove_selection("never-added"));
        assert!(!store.remove_selection("never-added"));
        assert_eq!(store.kinds().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn test_special_and_basic_split() {
        let mut store = SelectionStore::new("lasso");
        store.set_selection("lasso", [0, 1]);
        store.set_selection("search", [1, 2]);
        store.set_selection("linked", [2, 5]);

        assert!(store.has_special());
        assert_eq!(store.special_set().into_iter().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(store.basic_union().into_iter().collect::<Vec<_>>(), vec![1, 2, 5]);

        store.remove_selection("lasso");
        assert!(!store.has_special());
        assert!(store.special_set().is_empty());
    }

    #[test]
    fn test_check_indices() {
        assert!(check_indices("k", &[0, 4], 5).is_ok());
        assert_eq!(
            check_indices("k", &[0, 5], 5),
            Err(SelectionError::IndexOutOfRange {
                kind: "k".to_string(),
                index: 5,
                len: 5
            })
        );
    }
}
