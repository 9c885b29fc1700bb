use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{DbError, Result};

/// Driver-agnostic raw result from a database query.
/// All values are converted to text by the driver; `None` is SQL NULL.
#[derive(Debug, Clone, PartialEq)]
pub struct RawQueryResult {
    /// Column names in order
    pub columns: Vec<String>,
    /// Rows, where each row is a vector of values in column order
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawQueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { columns, rows }
    }

    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }
}

/// A single row result from a query, keyed by column name.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Option<String>>,
}

impl Row {
    pub(crate) fn new(columns: Arc<[String]>, values: Vec<Option<String>>) -> Self {
        Self { columns, values }
    }

    /// Gets a value by column name. `Ok(None)` means the column is NULL.
    pub fn get(&self, column: &str) -> Result<Option<&str>> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.values.get(i).and_then(|v| v.as_deref()))
            .ok_or_else(|| DbError::ColumnNotFound(column.to_string()))
    }

    /// Gets a value by position.
    pub fn get_index(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(|v| v.as_deref())
    }

    /// Returns all column names in this row, in select order.
    pub fn columns(&self) -> Vec<&str> {
        self.columns.iter().map(|s| s.as_str()).collect()
    }

    /// Iterates `(column, value)` pairs in select order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.columns
            .iter()
            .zip(self.values.iter())
            .map(|(c, v)| (c.as_str(), v.as_deref()))
    }

    /// Consumes the row into a column → value map.
    pub fn into_map(self) -> HashMap<String, Option<String>> {
        self.columns.iter().cloned().zip(self.values).collect()
    }

    /// Returns the number of columns in this row.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if this row has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Result of a row-returning query.
///
/// Rows are handed out one at a time through [`Iterator`]; use
/// [`ResultSet::fetch_all`] to materialize the rest.
#[derive(Debug)]
pub struct ResultSet {
    columns: Arc<[String]>,
    rows: std::vec::IntoIter<Vec<Option<String>>>,
}

impl ResultSet {
    /// Creates a ResultSet from a RawQueryResult.
    pub fn from_raw(raw: RawQueryResult) -> Self {
        Self {
            columns: raw.columns.into(),
            rows: raw.rows.into_iter(),
        }
    }

    /// Fetches the next row, if any.
    pub fn fetch(&mut self) -> Option<Row> {
        self.next()
    }

    /// Fetches the first column of the next row. NULL and "no row" both yield `None`.
    pub fn fetch_column(&mut self) -> Option<String> {
        self.rows.next().and_then(|values| values.into_iter().next().flatten())
    }

    /// Materializes all remaining rows.
    pub fn fetch_all(self) -> Vec<Row> {
        self.collect()
    }

    /// Returns the column names from this result.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the number of rows not yet fetched.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if no rows remain.
    pub fn is_empty(&self) -> bool {
        self.rows.len() == 0
    }
}

impl Iterator for ResultSet {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        self.rows
            .next()
            .map(|values| Row::new(Arc::clone(&self.columns), values))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}
