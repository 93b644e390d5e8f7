//! Direction labels and column-to-direction assignment.

use std::collections::BTreeMap;

use serde::Serialize;

/// An ordered set of direction labels.
///
/// Labels are unique and keep first-insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DirectionList(Vec<String>);

impl DirectionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from labels, dropping repeats after their first occurrence.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Self::new();
        for label in labels {
            list.push(label);
        }
        list
    }

    /// Append a label unless it is already present.
    ///
    /// Returns `true` if the label was added.
    pub fn push(&mut self, label: impl Into<String>) -> bool {
        let label = label.into();
        if self.contains(&label) {
            return false;
        }
        self.0.push(label);
        true
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.iter().any(|l| l == label)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Assignment of table columns to direction labels for one table.
///
/// At most one column is the notes column, and that column is never mapped
/// to a direction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectionColumnMap {
    columns: BTreeMap<usize, String>,
    notes_column: Option<usize>,
}

impl DirectionColumnMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the notes column.
    ///
    /// Only the first notes column counts; returns `false` if one was
    /// already recorded or the column already carries a direction.
    pub fn set_notes_column(&mut self, column: usize) -> bool {
        if self.notes_column.is_some() || self.columns.contains_key(&column) {
            return false;
        }
        self.notes_column = Some(column);
        true
    }

    pub fn notes_column(&self) -> Option<usize> {
        self.notes_column
    }

    /// Map a column to a direction label.
    ///
    /// Returns `false` (leaving the map unchanged) for the notes column.
    pub fn insert(&mut self, column: usize, label: impl Into<String>) -> bool {
        if self.notes_column == Some(column) {
            return false;
        }
        self.columns.insert(column, label.into());
        true
    }

    pub fn direction_for(&self, column: usize) -> Option<&str> {
        self.columns.get(&column).map(String::as_str)
    }

    /// Directions in ascending column order, first occurrence wins.
    pub fn directions(&self) -> DirectionList {
        DirectionList::from_labels(self.columns.values().map(String::as_str))
    }

    /// Mapped columns in ascending order.
    pub fn columns(&self) -> impl Iterator<Item = (usize, &str)> {
        self.columns.iter().map(|(c, l)| (*c, l.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }
}
