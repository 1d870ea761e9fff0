//! Typed record parsing from loaded tables.

use chrono::{NaiveDate, NaiveDateTime};
use nf_protocol::records::columns;
use nf_protocol::{HeaderRecord, ItemRecord};

use crate::error::{LoadError, LoadResult};
use crate::reader::Table;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

/// Parse a decimal, accepting a lone `,` as the decimal separator.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    let value: f64 = if !s.contains('.') && s.matches(',').count() == 1 {
        s.replace(',', ".").parse().ok()?
    } else {
        s.parse().ok()?
    };
    value.is_finite().then_some(value)
}

/// Parse an issue date; date-only values map to midnight.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parse the header (cabeçalho) table into invoice records.
pub fn parse_headers(table: &Table) -> LoadResult<Vec<HeaderRecord>> {
    let key = table.column(columns::ACCESS_KEY)?;
    let name = table.column(columns::ISSUER_NAME)?;
    let state = table.column(columns::ISSUER_STATE)?;
    let issued = table.column(columns::ISSUED_AT)?;
    let value = table.column(columns::TOTAL_VALUE)?;

    table
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| -> LoadResult<HeaderRecord> {
            let cell = |idx: usize| row.get(idx).unwrap_or_default();
            Ok(HeaderRecord {
                access_key: cell(key).to_string(),
                issuer_name: cell(name).to_string(),
                issuer_state: cell(state).to_string(),
                issued_at: parse_datetime(cell(issued)).ok_or_else(|| {
                    parse_error(table, i, columns::ISSUED_AT, cell(issued), "date")
                })?,
                total_value: parse_decimal(cell(value)).ok_or_else(|| {
                    parse_error(table, i, columns::TOTAL_VALUE, cell(value), "decimal")
                })?,
            })
        })
        .collect()
}

/// Parse the item (itens) table into line-item records.
pub fn parse_items(table: &Table) -> LoadResult<Vec<ItemRecord>> {
    let key = table.column(columns::ACCESS_KEY)?;
    let description = table.column(columns::DESCRIPTION)?;
    let quantity = table.column(columns::QUANTITY)?;

    table
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| -> LoadResult<ItemRecord> {
            let cell = |idx: usize| row.get(idx).unwrap_or_default();
            Ok(ItemRecord {
                access_key: cell(key).to_string(),
                description: cell(description).to_string(),
                quantity: parse_decimal(cell(quantity)).ok_or_else(|| {
                    parse_error(table, i, columns::QUANTITY, cell(quantity), "decimal")
                })?,
            })
        })
        .collect()
}

fn parse_error(
    table: &Table,
    index: usize,
    column: &str,
    value: &str,
    expected: &'static str,
) -> LoadError {
    LoadError::Parse {
        file: table.file().to_string(),
        row: index + 1,
        column: column.to_string(),
        value: value.to_string(),
        expected,
    }
}
