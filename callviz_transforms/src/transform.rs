// Copyright 2025 the Callviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transform IR and executor.

use core::cmp::Ordering;

use hashbrown::HashSet;

use crate::table::{ReasonTable, Record};

/// Sorting order for [`Transform::Sort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

/// A table transform.
#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    /// Reorder rows by count.
    ///
    /// The sort is stable (ties keep input order) and `NaN` counts sort last in either order.
    Sort {
        /// Sort order.
        order: SortOrder,
    },
    /// Keep the first `n` rows.
    Head {
        /// Number of rows to keep.
        n: usize,
    },
    /// Drop the first `skip` rows and keep the rest.
    Tail {
        /// Number of rows to drop.
        skip: usize,
    },
    /// Keep rows whose reason is in `keys`, in table order.
    Filter {
        /// Reasons to keep.
        keys: HashSet<String>,
    },
}

impl Transform {
    /// Shorthand for a filter over the given keys.
    pub fn filter<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Filter {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Applies this transform to `table`.
    pub fn apply(&self, mut table: ReasonTable) -> ReasonTable {
        match self {
            Self::Sort { order } => {
                let order = *order;
                table.rows.sort_by(|a, b| compare_counts(a.count, b.count, order));
            }
            Self::Head { n } => table.rows.truncate(*n),
            Self::Tail { skip } => {
                let skip = (*skip).min(table.rows.len());
                table.rows.drain(..skip);
            }
            Self::Filter { keys } => table.rows.retain(|r| keys.contains(r.reason.as_str())),
        }
        table
    }
}

fn compare_counts(a: f64, b: f64, order: SortOrder) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let o = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
            match order {
                SortOrder::Asc => o,
                SortOrder::Desc => o.reverse(),
            }
        }
    }
}

/// An ordered list of transforms, executed in full-recompute mode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    transforms: Vec<Transform>,
}

impl Pipeline {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a transform.
    pub fn then(mut self, transform: Transform) -> Self {
        self.transforms.push(transform);
        self
    }

    /// Returns the transforms in execution order.
    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    /// Runs every transform over a copy of `input`.
    pub fn execute(&self, input: &ReasonTable) -> ReasonTable {
        self.transforms
            .iter()
            .fold(input.clone(), |table, t| t.apply(table))
    }
}

/// Sorts `table` by count (descending) and splits it into the first `n` rows and the rest.
pub fn top_n(table: &ReasonTable, n: usize) -> (ReasonTable, ReasonTable) {
    let sorted = Transform::Sort {
        order: SortOrder::Desc,
    }
    .apply(table.clone());
    let head = Transform::Head { n }.apply(sorted.clone());
    let tail = Transform::Tail { skip: n }.apply(sorted);
    (head, tail)
}

/// Appends `tail` after `head` without re-sorting.
///
/// If both inputs are sorted, the result is sorted within each segment only.
pub fn concat(head: &ReasonTable, tail: &ReasonTable) -> ReasonTable {
    let rows: Vec<Record> = head.rows.iter().chain(tail.rows.iter()).cloned().collect();
    ReasonTable::new(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[(&str, f64)]) -> ReasonTable {
        rows.iter().map(|(r, c)| Record::new(*r, *c)).collect()
    }

    fn reasons(t: &ReasonTable) -> Vec<&str> {
        t.reasons().collect()
    }

    #[test]
    fn descending_sort_then_limit() {
        let t = table(&[("A", 5.0), ("B", 20.0), ("C", 1.0)]);
        let (head, tail) = top_n(&t, 2);
        assert_eq!(reasons(&head), ["B", "A"]);
        assert_eq!(reasons(&tail), ["C"]);
    }

    #[test]
    fn sort_is_stable_for_ties_and_puts_nan_last() {
        let t = table(&[
            ("x", 3.0),
            ("nan", f64::NAN),
            ("y", 7.0),
            ("z", 3.0),
            ("w", 7.0),
        ]);
        let desc = Transform::Sort {
            order: SortOrder::Desc,
        }
        .apply(t.clone());
        assert_eq!(reasons(&desc), ["y", "w", "x", "z", "nan"]);
        let asc = Transform::Sort {
            order: SortOrder::Asc,
        }
        .apply(t);
        assert_eq!(reasons(&asc), ["x", "z", "y", "w", "nan"]);
    }

    #[test]
    fn top_twenty_are_the_highest_counts() {
        let rows: Vec<Record> = (0..45_u32)
            .map(|i| Record::new(format!("r{i}"), f64::from((i * 37) % 45)))
            .collect();
        let t = ReasonTable::new(rows);
        let (head, tail) = top_n(&t, 20);
        assert_eq!(head.row_count(), 20);
        assert_eq!(tail.row_count(), 25);
        let min_head = head.rows.iter().map(|r| r.count).fold(f64::INFINITY, f64::min);
        let max_tail = tail.max_count().unwrap_or(f64::NEG_INFINITY);
        assert!(min_head >= max_tail);
    }

    #[test]
    fn head_and_tail_clamp_to_table_length() {
        let t = table(&[("A", 1.0)]);
        assert_eq!(Transform::Head { n: 20 }.apply(t.clone()).row_count(), 1);
        assert!(Transform::Tail { skip: 20 }.apply(t).is_empty());
    }

    #[test]
    fn filter_keeps_table_order() {
        let t = table(&[("A", 1.0), ("B", 2.0), ("C", 3.0)]);
        let out = Pipeline::new()
            .then(Transform::filter(["C", "A"]))
            .execute(&t);
        assert_eq!(reasons(&out), ["A", "C"]);
    }

    #[test]
    fn concat_keeps_segments_sorted_independently() {
        let (head, _) = top_n(&table(&[("A", 5.0), ("B", 20.0)]), 20);
        let extra = table(&[("C", 50.0), ("D", 1.0)]);
        let joined = concat(&head, &extra);
        assert_eq!(reasons(&joined), ["B", "A", "C", "D"]);
    }
}
