//! Minimal row/column table used for bulk import and export.
//!
//! Stands in for a dataframe: ordered columns, JSON rows, and an optional
//! unique index column. Only the operations the client needs are provided.

use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::error::{Error, Result};

/// An in-memory table of JSON rows with first-seen column ordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Map<String, Value>>,
    index: Option<String>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a frame from rows; the column list is the union of all row
    /// fields in first-seen order.
    pub fn from_rows(rows: Vec<Map<String, Value>>) -> Self {
        let mut frame = Self::new();
        for row in rows {
            frame.push_row(row);
        }
        frame
    }

    /// Append a row, registering any new columns.
    pub fn push_row(&mut self, row: Map<String, Value>) {
        for field in row.keys() {
            if !self.columns.iter().any(|column| column == field) {
                self.columns.push(field.clone());
            }
        }
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column == name)
    }

    pub fn rows(&self) -> &[Map<String, Value>] {
        &self.rows
    }

    /// Values of one column, `None` where a row lacks the field.
    pub fn column(&self, name: &str) -> Vec<Option<&Value>> {
        self.rows.iter().map(|row| row.get(name)).collect()
    }

    /// Name of the index column set via [`set_index`](Self::set_index).
    pub fn index(&self) -> Option<&str> {
        self.index.as_deref()
    }

    /// Declare `field` as the frame's index, verifying it is present and
    /// unique in every row.
    pub fn set_index(&mut self, field: &str) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.rows.len());
        for (position, row) in self.rows.iter().enumerate() {
            let value = row.get(field).ok_or_else(|| {
                Error::Validation(format!("row {position} has no `{field}` index field"))
            })?;
            if !seen.insert(value.to_string()) {
                return Err(Error::Validation(format!(
                    "index field `{field}` is not unique (duplicate value {value})"
                )));
            }
        }
        self.index = Some(field.to_string());
        Ok(())
    }
}
