/// Column types, cell values and the in-memory `Dataset`.
///
/// This module defines the shared tabular model imported by all other modules.
/// Each `ColumnType` owns a registered parse/format pair (see `TypeCodec`),
/// so the codec never resolves types from strings at runtime beyond the header tag.

use std::cmp::Ordering;
use std::fmt;
use std::io::Write;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Column types
// ---------------------------------------------------------------------------

/// The closed set of scalar column types a dataset can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ColumnType {
    Int64,
    Float64,
    /// Free text.
    Object,
    Bool,
    DateTime,
    /// Text drawn from a small set of levels.
    Category,
}

/// Parse/format functions registered for one column type.
///
/// `parse` never sees an empty field and `format` never sees `Value::Null`;
/// the codec maps both to each other before calling them.
pub struct TypeCodec {
    pub tag: &'static str,
    pub parse: fn(&str) -> Option<Value>,
    pub format: fn(&Value) -> Option<String>,
}

static INT64: TypeCodec = TypeCodec {
    tag: "int64",
    parse: parse_int,
    format: format_int,
};

static FLOAT64: TypeCodec = TypeCodec {
    tag: "float64",
    parse: parse_float,
    format: format_float,
};

static OBJECT: TypeCodec = TypeCodec {
    tag: "object",
    parse: parse_text,
    format: format_text,
};

static BOOL: TypeCodec = TypeCodec {
    tag: "bool",
    parse: parse_bool,
    format: format_bool,
};

static DATETIME: TypeCodec = TypeCodec {
    tag: "datetime64[ns]",
    parse: parse_datetime,
    format: format_datetime,
};

static CATEGORY: TypeCodec = TypeCodec {
    tag: "category",
    parse: parse_text,
    format: format_text,
};

/// Written datetime layout; the fractional part is omitted when zero.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

impl ColumnType {
    pub const ALL: [ColumnType; 6] = [
        ColumnType::Int64,
        ColumnType::Float64,
        ColumnType::Object,
        ColumnType::Bool,
        ColumnType::DateTime,
        ColumnType::Category,
    ];

    pub fn codec(self) -> &'static TypeCodec {
        match self {
            ColumnType::Int64 => &INT64,
            ColumnType::Float64 => &FLOAT64,
            ColumnType::Object => &OBJECT,
            ColumnType::Bool => &BOOL,
            ColumnType::DateTime => &DATETIME,
            ColumnType::Category => &CATEGORY,
        }
    }

    /// Canonical tag written to the first line of a dataset file.
    pub fn tag(self) -> &'static str {
        self.codec().tag
    }

    /// Resolves a header tag. Accepts the canonical tags plus a few common aliases.
    pub fn from_tag(tag: &str) -> Option<ColumnType> {
        match tag {
            "int64" | "Int64" => Some(ColumnType::Int64),
            "float64" | "Float64" => Some(ColumnType::Float64),
            "object" | "string" | "str" => Some(ColumnType::Object),
            "bool" | "boolean" => Some(ColumnType::Bool),
            "datetime64[ns]" | "datetime" => Some(ColumnType::DateTime),
            "category" => Some(ColumnType::Category),
            _ => None,
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Int64 | ColumnType::Float64)
    }

    /// Whether `value` may be stored in a column of this type.
    pub fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (ColumnType::Int64, Value::Int(_)) => true,
            (ColumnType::Float64, Value::Float(_)) => true,
            (ColumnType::Object | ColumnType::Category, Value::Str(_)) => true,
            (ColumnType::Bool, Value::Bool(_)) => true,
            (ColumnType::DateTime, Value::DateTime(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

fn parse_int(s: &str) -> Option<Value> {
    s.trim().parse().ok().map(Value::Int)
}

fn format_int(v: &Value) -> Option<String> {
    match v {
        Value::Int(i) => Some(i.to_string()),
        _ => None,
    }
}

fn parse_float(s: &str) -> Option<Value> {
    let f: f64 = s.trim().parse().ok()?;
    if f.is_nan() {
        Some(Value::Null)
    } else {
        Some(Value::Float(f))
    }
}

// `{:?}` is the shortest text that parses back to the same bits.
fn format_float(v: &Value) -> Option<String> {
    match v {
        Value::Float(f) if f.is_nan() => Some(String::new()),
        Value::Float(f) => Some(format!("{:?}", f)),
        _ => None,
    }
}

fn parse_text(s: &str) -> Option<Value> {
    Some(Value::Str(s.to_string()))
}

fn format_text(v: &Value) -> Option<String> {
    match v {
        Value::Str(s) => Some(s.clone()),
        _ => None,
    }
}

fn parse_bool(s: &str) -> Option<Value> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("true") {
        Some(Value::Bool(true))
    } else if s.eq_ignore_ascii_case("false") {
        Some(Value::Bool(false))
    } else {
        None
    }
}

fn format_bool(v: &Value) -> Option<String> {
    match v {
        Value::Bool(true) => Some("True".to_string()),
        Value::Bool(false) => Some("False".to_string()),
        _ => None,
    }
}

fn parse_datetime(s: &str) -> Option<Value> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(Value::DateTime)
}

fn format_datetime(v: &Value) -> Option<String> {
    match v {
        Value::DateTime(dt) => Some(dt.format(DATETIME_FORMAT).to_string()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// A single cell. `Null` is a missing value and fits any column type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view used by pivots and charts. Booleans count as 0/1.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::Float(_) => 2,
            Value::DateTime(_) => 3,
            Value::Str(_) => 4,
        }
    }

    /// Total order used for sorted pivot keys:
    /// Null < Bool < numbers < DateTime < Str.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (a, b) if a.rank() == 2 && b.rank() == 2 => {
                let (x, y) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
                x.total_cmp(&y)
            }
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => f.write_str(s),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::DateTime(dt) => {
                if dt.time() == chrono::NaiveTime::MIN {
                    write!(f, "{}", dt.format("%Y-%m-%d"))
                } else {
                    write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S"))
                }
            }
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    pub dtype: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, dtype: ColumnType) -> Self {
        Self {
            name: name.into(),
            dtype,
        }
    }
}

/// An ordered set of typed columns and the rows stored under them.
///
/// Column names are unique, every row has one value per column, and every
/// non-null value matches its column's type.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if columns.is_empty() {
            return Err(Error::schema("a dataset needs at least one column"));
        }
        for (i, col) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name == col.name) {
                return Err(Error::schema(format!("duplicate column name '{}'", col.name)));
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    /// Appends a row after checking its width and value types.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::schema(format!(
                "row has {} values, dataset has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        for (col, value) in self.columns.iter().zip(&row) {
            if !col.dtype.accepts(value) {
                return Err(Error::schema(format!(
                    "value {:?} does not fit column '{}' of type {}",
                    value, col.name, col.dtype
                )));
            }
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub(crate) fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| Error::column_not_found(name))
    }

    /// All values of one column, in row order.
    pub fn column(&self, name: &str) -> Result<Vec<&Value>> {
        let idx = self.require_column(name)?;
        Ok(self.rows.iter().map(|r| &r[idx]).collect())
    }

    pub fn dtype(&self, name: &str) -> Option<ColumnType> {
        self.column_index(name).map(|i| self.columns[i].dtype)
    }

    /// Renders the selected columns as a pipe-style markdown table without
    /// a row index. Numeric columns are right-aligned.
    pub fn to_markdown(&self, columns: &[&str]) -> Result<String> {
        let indices = columns
            .iter()
            .map(|name| self.require_column(name))
            .collect::<Result<Vec<_>>>()?;

        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].to_string()).collect())
            .collect();

        let widths: Vec<usize> = indices
            .iter()
            .enumerate()
            .map(|(n, &i)| {
                cells
                    .iter()
                    .map(|r| r[n].chars().count())
                    .chain(std::iter::once(self.columns[i].name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();
        let right: Vec<bool> = indices
            .iter()
            .map(|&i| self.columns[i].dtype.is_numeric())
            .collect();

        let pad = |text: &str, width: usize, right: bool| {
            if right {
                format!("{:>width$}", text, width = width)
            } else {
                format!("{:<width$}", text, width = width)
            }
        };

        let mut out = String::new();
        out.push('|');
        for (n, &i) in indices.iter().enumerate() {
            out.push_str(&format!(" {} |", pad(&self.columns[i].name, widths[n], right[n])));
        }
        out.push_str("\n|");
        for (n, w) in widths.iter().enumerate() {
            if right[n] {
                out.push_str(&format!("{}:|", "-".repeat(w + 1)));
            } else {
                out.push_str(&format!(":{}|", "-".repeat(w + 1)));
            }
        }
        for row in &cells {
            out.push_str("\n|");
            for (n, cell) in row.iter().enumerate() {
                out.push_str(&format!(" {} |", pad(cell, widths[n], right[n])));
            }
        }
        Ok(out)
    }

    /// Writes `to_markdown` output to stdout.
    pub fn print_markdown(&self, columns: &[&str]) -> Result<()> {
        let table = self.to_markdown(columns)?;
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", table)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
