//! Long-to-wide reshaping used by the chart builders.
//!
//! Both operations sort their row keys (the `index` column) and column keys
//! with `Value::sort_cmp`. Rows whose index or column key is null are skipped.

use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::model::{Dataset, Value};

/// A wide table: one row per index key, one column per column key.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable {
    pub index: Vec<Value>,
    pub columns: Vec<Value>,
    /// `cells[row][column]`; `None` marks a missing combination.
    pub cells: Vec<Vec<Option<f64>>>,
}

impl PivotTable {
    /// The values of one column key, top to bottom.
    pub fn column_values(&self, column: usize) -> Vec<Option<f64>> {
        self.cells.iter().map(|row| row[column]).collect()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<f64> {
        self.cells.get(row).and_then(|r| r.get(column).copied().flatten())
    }
}

struct Triple<'a> {
    index: &'a Value,
    column: &'a Value,
    value: Option<f64>,
}

fn collect_triples<'a>(
    data: &'a Dataset,
    index: &str,
    columns: &str,
    values: &str,
) -> Result<Vec<Triple<'a>>> {
    let (i, c, v) = (
        data.require_column(index)?,
        data.require_column(columns)?,
        data.require_column(values)?,
    );

    let mut triples = Vec::with_capacity(data.len());
    for row in data.rows() {
        if row[i].is_null() || row[c].is_null() {
            continue;
        }
        let value = match &row[v] {
            Value::Null => None,
            other => match other.as_f64() {
                Some(x) if x.is_nan() => None,
                Some(x) => Some(x),
                None => {
                    return Err(Error::Pivot {
                        message: format!("column '{}' holds non-numeric value {:?}", values, other),
                    });
                }
            },
        };
        triples.push(Triple {
            index: &row[i],
            column: &row[c],
            value,
        });
    }
    Ok(triples)
}

fn sorted_keys<'a>(keys: impl Iterator<Item = &'a Value>) -> Vec<Value> {
    let mut out: Vec<Value> = keys.cloned().collect();
    out.sort_by(|a, b| a.sort_cmp(b));
    out.dedup_by(|a, b| a.sort_cmp(b) == Ordering::Equal);
    out
}

fn position(keys: &[Value], key: &Value) -> usize {
    // Every key was collected from the same rows, so the search cannot miss.
    keys.binary_search_by(|k| k.sort_cmp(key)).unwrap_or_else(|i| i)
}

/// Sums `values` for every (index, columns) pair; absent pairs become 0.
/// Null values are ignored by the sum.
pub fn pivot_table(data: &Dataset, index: &str, columns: &str, values: &str) -> Result<PivotTable> {
    let triples: Vec<Triple> = collect_triples(data, index, columns, values)?
        .into_iter()
        .filter(|t| t.value.is_some())
        .collect();
    let row_keys = sorted_keys(triples.iter().map(|t| t.index));
    let col_keys = sorted_keys(triples.iter().map(|t| t.column));

    let mut sums = vec![vec![0.0; col_keys.len()]; row_keys.len()];
    for t in &triples {
        let (r, c) = (position(&row_keys, t.index), position(&col_keys, t.column));
        sums[r][c] += t.value.unwrap_or(0.0);
    }

    Ok(PivotTable {
        index: row_keys,
        columns: col_keys,
        cells: sums
            .into_iter()
            .map(|row| row.into_iter().map(Some).collect())
            .collect(),
    })
}

/// Reshapes without aggregation. Each (index, columns) pair may occur once.
pub fn pivot(data: &Dataset, index: &str, columns: &str, values: &str) -> Result<PivotTable> {
    let triples = collect_triples(data, index, columns, values)?;
    let row_keys = sorted_keys(triples.iter().map(|t| t.index));
    let col_keys = sorted_keys(triples.iter().map(|t| t.column));

    let mut cells = vec![vec![None; col_keys.len()]; row_keys.len()];
    let mut seen = vec![vec![false; col_keys.len()]; row_keys.len()];
    for t in &triples {
        let (r, c) = (position(&row_keys, t.index), position(&col_keys, t.column));
        if seen[r][c] {
            return Err(Error::Pivot {
                message: format!(
                    "index contains duplicate entries for ({}, {})",
                    t.index, t.column
                ),
            });
        }
        seen[r][c] = true;
        cells[r][c] = t.value;
    }

    Ok(PivotTable {
        index: row_keys,
        columns: col_keys,
        cells,
    })
}

impl Dataset {
    pub fn pivot_table(&self, index: &str, columns: &str, values: &str) -> Result<PivotTable> {
        pivot_table(self, index, columns, values)
    }

    pub fn pivot(&self, index: &str, columns: &str, values: &str) -> Result<PivotTable> {
        pivot(self, index, columns, values)
    }
}
