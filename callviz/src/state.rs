// Copyright 2025 the Callviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Explicit chart state.

use callviz_transforms::{Pipeline, ReasonTable, Transform, concat, top_n};
use hashbrown::HashSet;

/// Number of rows shown (and offered as checkboxes) before "show more".
pub(crate) const TOP_N: usize = 20;

/// Everything a frame is rendered from.
///
/// Commands never mutate a state in place; see [`crate::command::Command::apply`].
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ChartState {
    /// Every loaded row, sorted by count (descending, stable).
    pub(crate) source: ReasonTable,
    /// Rows loaded into the view: the head, then the tail once expanded. Every loaded row
    /// has a checkbox.
    pub(crate) dataset: ReasonTable,
    /// Checked reasons. Always a subset of the `dataset` reasons.
    pub(crate) selection: HashSet<String>,
    /// `true` once "show more" has appended the tail.
    pub(crate) expanded: bool,
    pub(crate) bars_visible: bool,
    pub(crate) hovered: Option<String>,
    pub(crate) top_n: usize,
}

impl ChartState {
    /// Builds the initial state: the `top_n` largest rows, all checked.
    pub(crate) fn new(table: &ReasonTable, top_n_rows: usize) -> Self {
        let (head, tail) = top_n(table, top_n_rows);
        let source = concat(&head, &tail);
        let selection = head.reasons().map(String::from).collect();
        Self {
            source,
            dataset: head,
            selection,
            expanded: false,
            bars_visible: true,
            hovered: None,
            top_n: top_n_rows,
        }
    }

    /// Rows past the initial head. Empty when everything fits.
    pub(crate) fn tail(&self) -> ReasonTable {
        Transform::Tail { skip: self.top_n }.apply(self.source.clone())
    }

    /// Replaces the selection with the loaded reasons among `keys`.
    pub(crate) fn set_selection<I, K>(&mut self, keys: I)
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.selection = keys
            .into_iter()
            .map(Into::into)
            .filter(|k| self.dataset.get(k).is_some())
            .collect();
        self.clear_stale_hover();
    }

    /// Drops the hover once its reason is no longer selected.
    pub(crate) fn clear_stale_hover(&mut self) {
        if let Some(h) = &self.hovered
            && !self.selection.contains(h.as_str())
        {
            self.hovered = None;
        }
    }

    /// The rows that render for the current selection.
    pub(crate) fn visible(&self) -> ReasonTable {
        visible_subset(&self.dataset, &self.selection)
    }

    /// Checkbox rows in dataset order.
    pub(crate) fn checkboxes(&self) -> impl Iterator<Item = (&str, bool)> + '_ {
        self.dataset
            .reasons()
            .map(|r| (r, self.selection.contains(r)))
    }

    /// Upper end of the value domain: the largest loaded count.
    ///
    /// The domain follows the loaded rows rather than the selection, so unchecking a box
    /// never rescales the remaining bars.
    pub(crate) fn value_max(&self) -> Option<f64> {
        self.dataset.max_count()
    }
}

/// Rows of `dataset` whose reason is selected, in dataset order.
pub(crate) fn visible_subset(dataset: &ReasonTable, selection: &HashSet<String>) -> ReasonTable {
    Pipeline::new()
        .then(Transform::Filter {
            keys: selection.clone(),
        })
        .execute(dataset)
}

#[cfg(test)]
mod tests {
    use callviz_transforms::Record;

    use super::*;

    fn table(rows: &[(&str, f64)]) -> ReasonTable {
        rows.iter().map(|(r, c)| Record::new(*r, *c)).collect()
    }

    fn reasons(t: &ReasonTable) -> Vec<&str> {
        t.reasons().collect()
    }

    #[test]
    fn initial_state_checks_the_top_rows() {
        let state = ChartState::new(&table(&[("A", 5.0), ("B", 20.0), ("C", 1.0)]), 2);
        assert_eq!(reasons(&state.source), ["B", "A", "C"]);
        assert_eq!(reasons(&state.dataset), ["B", "A"]);
        assert_eq!(reasons(&state.visible()), ["B", "A"]);
        assert_eq!(reasons(&state.tail()), ["C"]);
        assert_eq!(state.value_max(), Some(20.0));
        assert!(state.checkboxes().all(|(_, checked)| checked));
    }

    #[test]
    fn set_selection_ignores_unloaded_reasons_and_stale_hover() {
        let mut state = ChartState::new(&table(&[("A", 5.0), ("B", 20.0), ("C", 1.0)]), 2);
        state.hovered = Some(String::from("B"));
        state.set_selection(["A", "C", "Z"]);
        assert_eq!(reasons(&state.visible()), ["A"]);
        assert_eq!(state.selection.len(), 1, "C is not loaded yet");
        assert_eq!(state.hovered, None);
    }

    #[test]
    fn visible_subset_keeps_dataset_order() {
        let dataset = table(&[("B", 20.0), ("A", 5.0), ("C", 1.0)]);
        let selection: HashSet<String> = ["C", "B", "Z"].into_iter().map(String::from).collect();
        assert_eq!(reasons(&visible_subset(&dataset, &selection)), ["B", "C"]);
        assert!(visible_subset(&dataset, &HashSet::new()).is_empty());
    }

    #[test]
    fn ties_keep_input_order() {
        let state = ChartState::new(&table(&[("x", 1.0), ("y", 3.0), ("z", 1.0)]), TOP_N);
        assert_eq!(reasons(&state.dataset), ["y", "x", "z"]);
        assert!(state.tail().is_empty());
    }
}
