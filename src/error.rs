//! Error types for kuntadata.
//!
//! Lookup misses are not errors; every lookup returns `Option` instead.

use std::path::PathBuf;

use crate::model::ColumnType;

/// Result type alias for kuntadata operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The source or destination could not be read or written.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    /// Malformed header, unknown type tag or a row of the wrong width.
    /// `line` is 1-based.
    #[error("format error at line {line}: {message}")]
    Format { line: usize, message: String },

    /// A field could not be parsed as its column's declared type.
    #[error("cannot parse {value:?} as {dtype} in column '{column}' (line {line})")]
    TypeCoercion {
        column: String,
        dtype: ColumnType,
        value: String,
        line: usize,
    },

    /// A dataset was built with inconsistent columns or values.
    #[error("schema error: {message}")]
    Schema { message: String },

    #[error("column '{name}' not found")]
    ColumnNotFound { name: String },

    #[error("pivot error: {message}")]
    Pivot { message: String },

    #[error("geometry error: {message}")]
    Geo { message: String },

    #[error("chart error: {message}")]
    Chart { message: String },

    #[error("invalid configuration: {message}")]
    Config { message: String },

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: Some(path.into()),
            source,
        }
    }

    pub(crate) fn format(line: usize, message: impl Into<String>) -> Self {
        Error::Format {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn schema(message: impl Into<String>) -> Self {
        Error::Schema {
            message: message.into(),
        }
    }

    pub(crate) fn column_not_found(name: &str) -> Self {
        Error::ColumnNotFound {
            name: name.to_string(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io { path: None, source }
    }
}
