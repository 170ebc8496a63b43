// Copyright 2025 the Callviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Owned record table.

/// One row: a call reason and its count.
///
/// `count` is `NaN` when the source value was not numeric.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// Category key.
    pub reason: String,
    /// Number of calls.
    pub count: f64,
}

impl Record {
    /// Creates a record.
    pub fn new(reason: impl Into<String>, count: f64) -> Self {
        Self {
            reason: reason.into(),
            count,
        }
    }
}

/// An ordered table of records.
///
/// Reasons are expected to be unique; duplicates are kept as-is and collide downstream.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReasonTable {
    /// Rows in table order.
    pub rows: Vec<Record>,
}

impl ReasonTable {
    /// Creates a table from rows.
    pub fn new(rows: Vec<Record>) -> Self {
        Self { rows }
    }

    /// Returns the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates the reasons in table order.
    pub fn reasons(&self) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(|r| r.reason.as_str())
    }

    /// Largest finite count, or `None` if there is none.
    pub fn max_count(&self) -> Option<f64> {
        self.rows
            .iter()
            .map(|r| r.count)
            .filter(|c| c.is_finite())
            .reduce(f64::max)
    }

    /// Returns the row for `reason`, if present.
    pub fn get(&self, reason: &str) -> Option<&Record> {
        self.rows.iter().find(|r| r.reason == reason)
    }
}

impl FromIterator<Record> for ReasonTable {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_count_skips_non_finite_values() {
        let t: ReasonTable = [
            Record::new("A", 5.0),
            Record::new("B", f64::NAN),
            Record::new("C", 12.0),
        ]
        .into_iter()
        .collect();
        assert_eq!(t.max_count(), Some(12.0));
        assert_eq!(ReasonTable::default().max_count(), None);
        assert_eq!(t.reasons().collect::<Vec<_>>(), ["A", "B", "C"]);
        assert!(t.get("B").is_some_and(|r| r.count.is_nan()));
    }
}
