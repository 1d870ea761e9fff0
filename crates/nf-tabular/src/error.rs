//! Dataset loading error types.

use std::path::Path;

use thiserror::Error;

/// Errors that can occur while loading the invoice datasets.
///
/// A failed load never publishes partial state; callers keep whatever
/// store they had before.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("malformed CSV in {file}: {message}")]
    Csv { file: String, message: String },

    #[error("column '{column}' missing from {file}")]
    MissingColumn { file: String, column: String },

    #[error("{file} row {row}, column '{column}': cannot parse {value:?} as {expected}")]
    Parse {
        file: String,
        row: usize,
        column: String,
        value: String,
        expected: &'static str,
    },

    #[error("duplicate access key '{key}' in {file} row {row}")]
    DuplicateKey { file: String, row: usize, key: String },

    #[error("archive error: {0}")]
    Archive(String),

    #[error("archive has no member whose name contains '{0}'")]
    MissingArchiveMember(&'static str),

    #[error("no archive found (searched: {0})")]
    NoArchive(String),

    #[error("load task failed: {0}")]
    Task(String),
}

impl LoadError {
    /// Map an I/O error on `path`, keeping not-found distinct.
    pub fn from_io(path: &Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            LoadError::NotFound(path.display().to_string())
        } else {
            LoadError::Io(format!("{}: {err}", path.display()))
        }
    }
}

/// Convenience alias for loading results.
pub type LoadResult<T> = Result<T, LoadError>;
