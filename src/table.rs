// src/table.rs
//! # Table
//! Small row-oriented table used by every dashboard dataset.
//!
//! - Ordered column names, rows of `Value` cells (number / text / null).
//! - Non-finite numbers count as missing for every numeric operation.
//! - JSON shape follows the pandas `orient="split"` export:
//!   `{"columns": [...], "data": [[...], ...]}` (an `index` key is ignored).
//! - Column lookup has two explicit policies: `Lenient` reports absent
//!   columns back to the caller, `Strict` turns them into `MissingColumns`.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::{CoreError, CoreResult};

/// One table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
    Null,
}

impl Value {
    /// Finite number, otherwise `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(x) if x.is_finite() => Some(*x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Null or a non-finite number.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Number(x) => !x.is_finite(),
            Value::Text(_) => false,
        }
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Number(x)
    }
}

impl From<Option<f64>> for Value {
    fn from(x: Option<f64>) -> Self {
        x.map_or(Value::Null, Value::Number)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(x) => write!(f, "{x}"),
            Value::Text(s) => f.write_str(s),
            Value::Null => Ok(()),
        }
    }
}

/// How absent columns are treated when a caller names columns it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnPolicy {
    /// Absent columns are returned in `ResolvedColumns::missing`.
    Lenient,
    /// Any absent column fails the whole lookup with `MissingColumns`.
    Strict,
}

/// Result of resolving requested column names against a table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedColumns {
    /// `(index in table, name)` in request order.
    pub present: Vec<(usize, String)>,
    /// Requested names the table does not have, in request order.
    pub missing: Vec<String>,
}

/// Ordered columns + rows. Every row has exactly `columns.len()` cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SplitTable")]
pub struct Table {
    columns: Vec<String>,
    #[serde(rename = "data")]
    rows: Vec<Vec<Value>>,
}

#[derive(Deserialize)]
struct SplitTable {
    columns: Vec<String>,
    #[serde(default)]
    data: Vec<Vec<Value>>,
}

impl TryFrom<SplitTable> for Table {
    type Error = CoreError;

    fn try_from(raw: SplitTable) -> CoreResult<Self> {
        Table::from_rows(raw.columns, raw.data)
    }
}

impl Table {
    /// Empty table with the given columns.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Build a table, validating unique column names and row widths.
    pub fn from_rows<I, S>(columns: I, rows: Vec<Vec<Value>>) -> CoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut t = Self::new(columns);
        let mut seen = HashSet::new();
        for c in &t.columns {
            if !seen.insert(c.as_str()) {
                return Err(CoreError::schema(format!("duplicate column `{c}`")));
            }
        }
        t.rows.reserve(rows.len());
        for row in rows {
            t.push_row(row)?;
        }
        Ok(t)
    }

    /// Parse the pandas split-orient JSON shape.
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Internal constructor for operations that already guarantee row widths.
    pub(crate) fn from_parts(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self { columns, rows }
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> CoreResult<()> {
        if row.len() != self.columns.len() {
            return Err(CoreError::schema(format!(
                "row {} has {} cells, expected {}",
                self.rows.len(),
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row(&self, i: usize) -> Option<&[Value]> {
        self.rows.get(i).map(Vec::as_slice)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Zero rows. This is the "no data" signal of every reshape operation.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell by row index and column name.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// Iterate the cells of one column.
    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().filter_map(move |r| r.get(idx))
    }

    /// At least one finite number and no text cells.
    pub fn is_numeric(&self, idx: usize) -> bool {
        let mut any_number = false;
        for v in self.column_values(idx) {
            match v {
                Value::Text(_) => return false,
                Value::Number(x) if x.is_finite() => any_number = true,
                _ => {}
            }
        }
        any_number
    }

    /// `(min, max)` over the finite numbers of a column.
    pub fn numeric_range(&self, idx: usize) -> Option<(f64, f64)> {
        self.column_values(idx)
            .filter_map(Value::as_f64)
            .fold(None, |acc, x| match acc {
                None => Some((x, x)),
                Some((lo, hi)) => Some((lo.min(x), hi.max(x))),
            })
    }

    /// Resolve requested column names under the given policy.
    pub fn resolve_columns<S: AsRef<str>>(
        &self,
        names: &[S],
        policy: ColumnPolicy,
    ) -> CoreResult<ResolvedColumns> {
        match policy {
            ColumnPolicy::Lenient => Ok(self.resolve_lenient(names)),
            ColumnPolicy::Strict => self.resolve_strict(names),
        }
    }

    /// Lenient resolution: absent names are reported, never an error.
    pub fn resolve_lenient<S: AsRef<str>>(&self, names: &[S]) -> ResolvedColumns {
        let mut out = ResolvedColumns::default();
        for name in names {
            let name = name.as_ref();
            match self.column_index(name) {
                Some(idx) => out.present.push((idx, name.to_string())),
                None => out.missing.push(name.to_string()),
            }
        }
        out
    }

    /// Strict resolution: any absent name fails with `MissingColumns`.
    pub fn resolve_strict<S: AsRef<str>>(&self, names: &[S]) -> CoreResult<ResolvedColumns> {
        let out = self.resolve_lenient(names);
        if !out.missing.is_empty() {
            return Err(CoreError::MissingColumns {
                columns: out.missing,
            });
        }
        Ok(out)
    }

    /// Copy of this table keeping only the rows for which `keep` is true.
    pub(crate) fn retain_rows<F>(&self, mut keep: F) -> Table
    where
        F: FnMut(&[Value]) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|r| keep(r.as_slice()))
            .cloned()
            .collect();
        Table::from_parts(self.columns.clone(), rows)
    }

    /// Mutable access for in-crate rewrites that keep row widths intact.
    pub(crate) fn rows_mut(&mut self) -> &mut [Vec<Value>] {
        &mut self.rows
    }
}
