// src/normalize.rs
//! # Metric Normalizer
//! Min-max normalization of named metric columns into `[0, 1]`.
//!
//! Column resolution is lenient: a requested metric that is absent or
//! non-numeric is skipped with a `NormalizeWarning`, never a hard error.
//! Rows are never dropped; missing cells stay `Null`.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use tracing::warn;

use crate::table::{Table, Value};

/// Recoverable problems found while normalizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "metric", rename_all = "snake_case")]
pub enum NormalizeWarning {
    MissingMetric(String),
    NonNumericMetric(String),
    /// Column exists but every cell is null / non-finite; kept as-is.
    NoNumericValues(String),
}

impl NormalizeWarning {
    pub fn metric(&self) -> &str {
        match self {
            Self::MissingMetric(m) | Self::NonNumericMetric(m) | Self::NoNumericValues(m) => m,
        }
    }
}

impl fmt::Display for NormalizeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingMetric(m) => write!(f, "Missing metric: `{m}`"),
            Self::NonNumericMetric(m) => write!(f, "Skipping non-numeric metric: `{m}`"),
            Self::NoNumericValues(m) => write!(f, "No numeric values for metric: `{m}`"),
        }
    }
}

/// Min-max scale one value. A constant column (`min == max`) maps to 1.
pub fn min_max(value: f64, min: f64, max: f64) -> f64 {
    if max == min {
        return 1.0;
    }
    ((value - min) / (max - min)).clamp(0.0, 1.0)
}

/// Normalize the requested metric columns of `table`.
///
/// Present numeric metrics are replaced in place; non-numeric requested
/// metrics are removed from the output; every other column is untouched.
pub fn normalize<S: AsRef<str>>(table: &Table, metrics: &[S]) -> (Table, Vec<NormalizeWarning>) {
    let mut warnings = Vec::new();

    let resolved = table.resolve_lenient(metrics);
    for name in resolved.missing {
        warn!(metric = %name, "missing metric");
        warnings.push(NormalizeWarning::MissingMetric(name));
    }

    let mut out = table.clone();
    let mut dropped = Vec::new();
    let mut seen = HashSet::new();

    for (idx, name) in resolved.present {
        if !seen.insert(idx) {
            continue;
        }
        if table.column_values(idx).all(Value::is_missing) {
            warn!(metric = %name, "metric has no numeric values");
            warnings.push(NormalizeWarning::NoNumericValues(name));
            continue;
        }
        if !table.is_numeric(idx) {
            warn!(metric = %name, "skipping non-numeric metric");
            warnings.push(NormalizeWarning::NonNumericMetric(name));
            dropped.push(idx);
            continue;
        }
        let Some((min, max)) = table.numeric_range(idx) else {
            continue;
        };
        for row in out.rows_mut() {
            let cell = &mut row[idx];
            *cell = match cell.as_f64() {
                Some(v) => Value::Number(min_max(v, min, max)),
                None => Value::Null,
            };
        }
    }

    if dropped.is_empty() {
        return (out, warnings);
    }
    (drop_columns(&out, &dropped), warnings)
}

fn drop_columns(table: &Table, drop: &[usize]) -> Table {
    let keep: Vec<usize> = (0..table.columns().len())
        .filter(|i| !drop.contains(i))
        .collect();
    let columns = keep.iter().map(|&i| table.columns()[i].clone()).collect();
    let rows = table
        .rows()
        .iter()
        .map(|r| keep.iter().map(|&i| r[i].clone()).collect())
        .collect();
    Table::from_parts(columns, rows)
}
