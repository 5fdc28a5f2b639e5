//! Typed dataset files.
//!
//! A dataset file is plain comma-separated text with one extra header line:
//!
//! ```text
//! int64,object        <- column type tags
//! id,name             <- column names
//! 1,Helsinki          <- one line per row
//! 2,Turku
//! ```
//!
//! Values are never quoted or escaped, so text containing `,` or a newline
//! cannot be stored. Missing values are empty fields.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::logging::{self, Component};
use crate::model::{Column, ColumnType, Dataset, Value};

pub const DELIMITER: char = ',';
pub const LINE_TERMINATOR: &str = "\n";

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Writes `dataset` to `path`, replacing any existing file.
pub fn save_dataset(path: impl AsRef<Path>, dataset: &Dataset) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = BufWriter::new(file);
    write_dataset(&mut writer, dataset).map_err(|e| attach_path(e, path))?;
    writer.flush().map_err(|e| Error::io(path, e))?;

    logging::info(
        Component::Codec,
        Some(&path.display().to_string()),
        &format!(
            "saved {} rows x {} columns",
            dataset.len(),
            dataset.columns().len()
        ),
    );
    Ok(())
}

/// Writes the type header, the name header and every row to `writer`.
pub fn write_dataset<W: Write>(writer: &mut W, dataset: &Dataset) -> Result<()> {
    let delim = DELIMITER.to_string();

    let tags: Vec<&str> = dataset.columns().iter().map(|c| c.dtype.tag()).collect();
    write!(writer, "{}{}", tags.join(&delim), LINE_TERMINATOR)?;

    let names: Vec<&str> = dataset.columns().iter().map(|c| c.name.as_str()).collect();
    write!(writer, "{}{}", names.join(&delim), LINE_TERMINATOR)?;

    for row in dataset.rows() {
        let fields: Vec<String> = dataset
            .columns()
            .iter()
            .zip(row)
            .map(|(col, value)| format_field(col, value))
            .collect();
        write!(writer, "{}{}", fields.join(&delim), LINE_TERMINATOR)?;
    }
    Ok(())
}

fn format_field(column: &Column, value: &Value) -> String {
    if value.is_null() {
        return String::new();
    }
    // Dataset::push_row guarantees the value matches the column type.
    (column.dtype.codec().format)(value).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Reads a dataset previously written by `save_dataset`.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Dataset> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let dataset = read_dataset(BufReader::new(file)).map_err(|e| attach_path(e, path))?;

    logging::info(
        Component::Codec,
        Some(&path.display().to_string()),
        &format!(
            "loaded {} rows x {} columns",
            dataset.len(),
            dataset.columns().len()
        ),
    );
    Ok(dataset)
}

/// Parses the two header lines and all following rows from `reader`.
pub fn read_dataset<R: BufRead>(reader: R) -> Result<Dataset> {
    let mut lines = reader.lines();

    let tag_line = lines
        .next()
        .transpose()?
        .ok_or_else(|| Error::format(1, "missing column type header"))?;
    let name_line = lines
        .next()
        .transpose()?
        .ok_or_else(|| Error::format(2, "missing column name header"))?;

    // `lines()` already drops the `\r` of CRLF endings. Names keep any other
    // trailing whitespace.
    if tag_line.trim().is_empty() {
        return Err(Error::format(1, "column type header is empty"));
    }
    let tags: Vec<&str> = tag_line.trim_end().split(DELIMITER).collect();
    let names: Vec<&str> = name_line.split(DELIMITER).collect();
    if tags.len() != names.len() {
        return Err(Error::format(
            2,
            format!(
                "type header has {} fields but name header has {}",
                tags.len(),
                names.len()
            ),
        ));
    }

    let columns = tags
        .iter()
        .zip(&names)
        .map(|(tag, name)| {
            ColumnType::from_tag(tag)
                .map(|dtype| Column::new(*name, dtype))
                .ok_or_else(|| Error::format(1, format!("unknown column type '{}'", tag)))
        })
        .collect::<Result<Vec<_>>>()?;
    let mut dataset = Dataset::new(columns).map_err(|e| Error::format(2, e.to_string()))?;
    let width = dataset.columns().len();

    for (offset, line) in lines.enumerate() {
        let line_no = offset + 3;
        let line = line?;
        if line.is_empty() && width > 1 {
            continue;
        }

        let fields: Vec<&str> = line.split(DELIMITER).collect();
        if fields.len() != width {
            return Err(Error::format(
                line_no,
                format!("expected {} fields, found {}", width, fields.len()),
            ));
        }

        let row = dataset
            .columns()
            .iter()
            .zip(&fields)
            .map(|(col, raw)| parse_field(col, raw, line_no))
            .collect::<Result<Vec<_>>>()?;
        dataset.push_row(row)?;
    }

    Ok(dataset)
}

fn parse_field(column: &Column, raw: &str, line: usize) -> Result<Value> {
    if raw.is_empty() {
        return Ok(Value::Null);
    }
    (column.dtype.codec().parse)(raw).ok_or_else(|| Error::TypeCoercion {
        column: column.name.clone(),
        dtype: column.dtype,
        value: raw.to_string(),
        line,
    })
}

fn attach_path(err: Error, path: &Path) -> Error {
    match err {
        Error::Io { path: None, source } => Error::io(path, source),
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
