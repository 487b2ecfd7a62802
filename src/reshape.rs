// src/reshape.rs
//! # Join / Reshape layer
//! Stateless table operations feeding the dashboard views.
//!
//! Empty results are never errors: an empty `Table` is the "no data" signal.
//! Precondition faults (absent key / value columns) come back as `CoreError`.
//! Keys match on exact string equality; canonicalization happens at load time
//! (see `country`).

use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::table::{Table, Value};

/// pandas defaults for `melt`.
pub const DEFAULT_VAR_NAME: &str = "variable";
pub const DEFAULT_VALUE_NAME: &str = "value";

/// Suffixes applied to overlapping non-key columns by `inner_join`.
pub const LEFT_SUFFIX: &str = "_x";
pub const RIGHT_SUFFIX: &str = "_y";

fn key_index(table: &Table, key: &str) -> CoreResult<usize> {
    table
        .column_index(key)
        .ok_or_else(|| CoreError::schema(format!("key column `{key}` not found")))
}

/// Rows whose `key` cell is one of `countries`.
pub fn filter_by_country<S: AsRef<str>>(
    table: &Table,
    countries: &[S],
    key: &str,
) -> CoreResult<Table> {
    let idx = key_index(table, key)?;
    let wanted: HashSet<&str> = countries.iter().map(AsRef::as_ref).collect();
    let out = table.retain_rows(|row| row[idx].as_str().is_some_and(|c| wanted.contains(c)));
    if out.is_empty() {
        debug!(key, selected = countries.len(), "filter matched no rows");
    }
    Ok(out)
}

/// Wide → long with pandas default column names (`variable` / `value`).
pub fn melt<S: AsRef<str>>(table: &Table, id_column: &str, value_columns: &[S]) -> CoreResult<Table> {
    melt_named(
        table,
        id_column,
        value_columns,
        DEFAULT_VAR_NAME,
        DEFAULT_VALUE_NAME,
    )
}

/// Wide → long: one `(id, metric, value)` row per input row and value column.
///
/// Column resolution is strict: if the id column or any value column is
/// absent the call fails with `MissingColumns` and produces nothing.
/// Output is value-column-major (all rows of the first metric first).
pub fn melt_named<S: AsRef<str>>(
    table: &Table,
    id_column: &str,
    value_columns: &[S],
    var_name: &str,
    value_name: &str,
) -> CoreResult<Table> {
    let mut wanted: Vec<&str> = Vec::with_capacity(value_columns.len() + 1);
    wanted.push(id_column);
    wanted.extend(value_columns.iter().map(AsRef::as_ref));
    let resolved = table.resolve_strict(&wanted)?;

    let (id_idx, _) = &resolved.present[0];
    let mut rows = Vec::with_capacity(table.len() * value_columns.len());
    for (idx, name) in &resolved.present[1..] {
        for row in table.rows() {
            rows.push(vec![
                row[*id_idx].clone(),
                Value::from(name.as_str()),
                row[*idx].clone(),
            ]);
        }
    }

    Ok(Table::from_parts(
        vec![
            id_column.to_string(),
            var_name.to_string(),
            value_name.to_string(),
        ],
        rows,
    ))
}

/// Inner join on `on` (exact string equality). Non-matching rows from either
/// side are dropped; duplicate keys produce every pairing, left order first.
pub fn inner_join(left: &Table, right: &Table, on: &str) -> CoreResult<Table> {
    let l_key = key_index(left, on)?;
    let r_key = key_index(right, on)?;

    let right_keep: Vec<usize> = (0..right.columns().len()).filter(|&i| i != r_key).collect();
    let right_names: HashSet<&str> = right_keep
        .iter()
        .map(|&i| right.columns()[i].as_str())
        .collect();
    let left_names: HashSet<&str> = left
        .columns()
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != l_key)
        .map(|(_, c)| c.as_str())
        .collect();

    let mut columns: Vec<String> = left
        .columns()
        .iter()
        .enumerate()
        .map(|(i, c)| {
            if i != l_key && right_names.contains(c.as_str()) {
                format!("{c}{LEFT_SUFFIX}")
            } else {
                c.clone()
            }
        })
        .collect();
    columns.extend(right_keep.iter().map(|&i| {
        let c = &right.columns()[i];
        if left_names.contains(c.as_str()) {
            format!("{c}{RIGHT_SUFFIX}")
        } else {
            c.clone()
        }
    }));

    let mut by_key: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, row) in right.rows().iter().enumerate() {
        if let Some(k) = row[r_key].as_str() {
            by_key.entry(k).or_default().push(i);
        }
    }

    let mut rows = Vec::new();
    for lrow in left.rows() {
        let Some(matches) = lrow[l_key].as_str().and_then(|k| by_key.get(k)) else {
            continue;
        };
        for &ri in matches {
            let rrow = &right.rows()[ri];
            let mut out = lrow.clone();
            out.extend(right_keep.iter().map(|&i| rrow[i].clone()));
            rows.push(out);
        }
    }

    if rows.is_empty() {
        debug!(on, left = left.len(), right = right.len(), "inner join is empty");
    }
    Ok(Table::from_parts(columns, rows))
}

/// Rows with a numeric `metric` sorted descending (stable for ties),
/// truncated to `n`. Rows whose metric is missing are excluded first.
pub fn top_n(table: &Table, metric: &str, n: usize) -> CoreResult<Table> {
    let idx = table
        .column_index(metric)
        .ok_or_else(|| CoreError::missing([metric]))?;

    let mut scored: Vec<(f64, &Vec<Value>)> = table
        .rows()
        .iter()
        .filter_map(|row| row[idx].as_f64().map(|v| (v, row)))
        .collect();
    // sort_by is stable: equal values keep their input order.
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    let rows = scored
        .into_iter()
        .take(n)
        .map(|(_, row)| row.clone())
        .collect();
    Ok(Table::from_parts(table.columns().to_vec(), rows))
}

/// Strict projection to `columns`, in the requested order.
pub fn select_columns<S: AsRef<str>>(table: &Table, columns: &[S]) -> CoreResult<Table> {
    let resolved = table.resolve_strict(columns)?;
    let names = resolved.present.iter().map(|(_, n)| n.clone()).collect();
    let rows = table
        .rows()
        .iter()
        .map(|row| resolved.present.iter().map(|(i, _)| row[*i].clone()).collect())
        .collect();
    Ok(Table::from_parts(names, rows))
}

/// `index_column` followed by every column that is numeric over the whole
/// of `table`.
pub fn numeric_columns(table: &Table, index_column: &str) -> CoreResult<Vec<String>> {
    let key = key_index(table, index_column)?;
    let mut keep = vec![table.columns()[key].clone()];
    keep.extend(
        table
            .columns()
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != key && table.is_numeric(i))
            .map(|(_, c)| c.clone()),
    );
    Ok(keep)
}

/// `index_column` followed by every numeric column (heatmap matrix).
pub fn select_numeric(table: &Table, index_column: &str) -> CoreResult<Table> {
    select_columns(table, &numeric_columns(table, index_column)?)
}

/// Rows whose `column` cell is not missing.
pub fn drop_null(table: &Table, column: &str) -> CoreResult<Table> {
    let idx = table
        .column_index(column)
        .ok_or_else(|| CoreError::missing([column]))?;
    Ok(table.retain_rows(|row| !row[idx].is_missing()))
}

/// First row whose `key_column` equals `key`, turned into `Indicator` /
/// `Value` pairs (key column excluded). `None` when no row matches.
pub fn transpose_row(table: &Table, key_column: &str, key: &str) -> CoreResult<Option<Table>> {
    let k = key_index(table, key_column)?;
    let Some(row) = table.rows().iter().find(|r| r[k].as_str() == Some(key)) else {
        return Ok(None);
    };
    let rows = table
        .columns()
        .iter()
        .zip(row)
        .enumerate()
        .filter(|&(i, _)| i != k)
        .map(|(_, (c, v))| vec![Value::from(c.as_str()), v.clone()])
        .collect();
    Ok(Some(Table::from_parts(
        vec!["Indicator".to_string(), "Value".to_string()],
        rows,
    )))
}

/// Distinct text values of `column` in first-seen order.
pub fn unique_values(table: &Table, column: &str) -> CoreResult<Vec<String>> {
    let idx = key_index(table, column)?;
    let mut seen = HashSet::new();
    Ok(table
        .column_values(idx)
        .filter_map(Value::as_str)
        .filter(|s| seen.insert(*s))
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(cols: [&str; 2], rows: &[(&str, f64)]) -> Table {
        Table::from_rows(
            cols,
            rows.iter()
                .map(|(c, v)| vec![Value::from(*c), Value::from(*v)])
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn melt_is_value_column_major() {
        let t = Table::from_rows(
            ["Country", "a", "b"],
            vec![
                vec!["SG".into(), 1.0.into(), 2.0.into()],
                vec!["MY".into(), 3.0.into(), 4.0.into()],
            ],
        )
        .unwrap();
        let m = melt(&t, "Country", &["a", "b"]).unwrap();
        assert_eq!(m.columns(), ["Country", "variable", "value"]);
        let got: Vec<(String, String, f64)> = m
            .rows()
            .iter()
            .map(|r| {
                (
                    r[0].to_string(),
                    r[1].to_string(),
                    r[2].as_f64().unwrap(),
                )
            })
            .collect();
        assert_eq!(
            got,
            vec![
                ("SG".into(), "a".into(), 1.0),
                ("MY".into(), "a".into(), 3.0),
                ("SG".into(), "b".into(), 2.0),
                ("MY".into(), "b".into(), 4.0),
            ]
        );
    }

    #[test]
    fn join_suffixes_overlapping_columns() {
        let l = pairs(["Country", "Score"], &[("SG", 1.0)]);
        let r = pairs(["Country", "Score"], &[("SG", 2.0)]);
        let j = inner_join(&l, &r, "Country").unwrap();
        assert_eq!(j.columns(), ["Country", "Score_x", "Score_y"]);
        assert_eq!(j.len(), 1);
    }

    #[test]
    fn join_duplicate_keys_produce_all_pairs() {
        let l = pairs(["Country", "a"], &[("SG", 1.0), ("SG", 2.0)]);
        let r = pairs(["Country", "b"], &[("SG", 10.0), ("SG", 20.0)]);
        let j = inner_join(&l, &r, "Country").unwrap();
        assert_eq!(j.len(), 4);
        assert_eq!(j.value(1, "b"), Some(&Value::Number(20.0)));
        assert_eq!(j.value(2, "a"), Some(&Value::Number(2.0)));
    }

    #[test]
    fn top_n_skips_missing_metric_values() {
        let t = Table::from_rows(
            ["Country", "Literacy"],
            vec![
                vec!["SG".into(), Value::Null],
                vec!["MY".into(), 90.0.into()],
                vec!["ID".into(), f64::NAN.into()],
            ],
        )
        .unwrap();
        let top = top_n(&t, "Literacy", 5).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top.value(0, "Country"), Some(&Value::from("MY")));
    }

    #[test]
    fn select_numeric_keeps_index_and_numbers() {
        let t = Table::from_rows(
            ["Country", "Region", "Account_Penetration"],
            vec![vec!["SG".into(), "SEA".into(), 98.0.into()]],
        )
        .unwrap();
        let s = select_numeric(&t, "Country").unwrap();
        assert_eq!(s.columns(), ["Country", "Account_Penetration"]);
    }

    #[test]
    fn transpose_row_lists_indicators() {
        let t = pairs(["Country", "Literacy"], &[("SG", 97.0)]);
        let out = transpose_row(&t, "Country", "SG").unwrap().unwrap();
        assert_eq!(out.columns(), ["Indicator", "Value"]);
        assert_eq!(out.value(0, "Indicator"), Some(&Value::from("Literacy")));
        assert!(transpose_row(&t, "Country", "MY").unwrap().is_none());
    }

    #[test]
    fn unique_values_in_first_seen_order() {
        let t = pairs(["Country", "x"], &[("SG", 1.0), ("MY", 2.0), ("SG", 3.0)]);
        assert_eq!(unique_values(&t, "Country").unwrap(), vec!["SG", "MY"]);
    }
}
