//! Delimited-text reader with normalized column names.

use std::path::Path;

use csv::StringRecord;
use serde::{Deserialize, Serialize};

use crate::error::{LoadError, LoadResult};

/// Field delimiter for the CSV files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Delimiter {
    #[default]
    #[serde(rename = ",")]
    Comma,
    #[serde(rename = ";")]
    Semicolon,
    /// Pick `,` or `;` from whichever appears more often in the header line.
    #[serde(rename = "auto")]
    Auto,
}

impl Delimiter {
    fn resolve(self, header_line: &[u8]) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Semicolon => b';',
            Delimiter::Auto => {
                let commas = header_line.iter().filter(|b| **b == b',').count();
                let semicolons = header_line.iter().filter(|b| **b == b';').count();
                if semicolons > commas { b';' } else { b',' }
            }
        }
    }
}

/// Trim whitespace (and a leading byte-order mark) from a raw column name.
pub fn normalize_column(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_string()
}

/// A parsed CSV file: normalized column names plus raw string rows.
#[derive(Debug, Clone)]
pub struct Table {
    file: String,
    columns: Vec<String>,
    rows: Vec<StringRecord>,
}

impl Table {
    /// Read and parse a CSV file from disk.
    pub fn read(path: &Path, delimiter: Delimiter) -> LoadResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| LoadError::from_io(path, e))?;
        Self::from_bytes(&path.display().to_string(), &bytes, delimiter)
    }

    /// Parse CSV content already in memory. `file` is used in error messages.
    pub fn from_bytes(file: &str, bytes: &[u8], delimiter: Delimiter) -> LoadResult<Self> {
        let header_line = bytes.split(|b| *b == b'\n').next().unwrap_or_default();
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter.resolve(header_line))
            .from_reader(bytes);

        let csv_error = |e: csv::Error| LoadError::Csv {
            file: file.to_string(),
            message: e.to_string(),
        };

        let columns = reader
            .headers()
            .map_err(csv_error)?
            .iter()
            .map(normalize_column)
            .collect();
        let rows = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(csv_error)?;

        Ok(Self {
            file: file.to_string(),
            columns,
            rows,
        })
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[StringRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by its normalized name.
    pub fn column(&self, name: &str) -> LoadResult<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| LoadError::MissingColumn {
                file: self.file.clone(),
                column: name.to_string(),
            })
    }
}
