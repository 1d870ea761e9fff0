//! The loaded, immutable invoice dataset and its inner join.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use chrono::Utc;
use nf_protocol::{CombinedRecord, DatasetInfo, HeaderRecord, ItemRecord};
use uuid::Uuid;

use crate::error::{LoadError, LoadResult};
use crate::reader::{Delimiter, Table};
use crate::records::{parse_headers, parse_items};
use crate::summary::context_summary;

/// Files a store was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetOrigin {
    pub header_path: PathBuf,
    pub item_path: PathBuf,
}

impl DatasetOrigin {
    pub fn new(header_path: impl Into<PathBuf>, item_path: impl Into<PathBuf>) -> Self {
        Self {
            header_path: header_path.into(),
            item_path: item_path.into(),
        }
    }
}

/// Content of a file a store was parsed from, as read during the load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub bytes: Arc<[u8]>,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            path: path.into(),
            bytes: bytes.into(),
        }
    }

    fn read(path: &Path) -> LoadResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| LoadError::from_io(path, e))?;
        Ok(Self::new(path, bytes))
    }

    /// File name without directories, for labels.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Header and item records of one load cycle, plus their inner join.
///
/// Never mutated after construction; a reload builds a new store. The raw
/// file contents are kept with the records, so everything derived from a
/// store (answers, prompt attachments) belongs to the same load cycle even
/// after the files on disk are replaced.
#[derive(Debug, Clone)]
pub struct TabularStore {
    info: DatasetInfo,
    headers: Vec<HeaderRecord>,
    items: Vec<ItemRecord>,
    combined: Vec<CombinedRecord>,
    orphan_items: usize,
    source_files: Vec<SourceFile>,
    context_text: OnceLock<Arc<str>>,
}

impl TabularStore {
    /// Read, validate and join the two CSV files.
    ///
    /// Each file is read from disk once; parsing and `source_files()` share
    /// the same bytes.
    pub fn load(header_path: &Path, item_path: &Path, delimiter: Delimiter) -> LoadResult<Self> {
        let header_file = SourceFile::read(header_path)?;
        let item_file = SourceFile::read(item_path)?;
        let header_table = Table::from_bytes(
            &header_path.display().to_string(),
            &header_file.bytes,
            delimiter,
        )?;
        let item_table =
            Table::from_bytes(&item_path.display().to_string(), &item_file.bytes, delimiter)?;
        let headers = parse_headers(&header_table)?;
        let items = parse_items(&item_table)?;
        let store = Self::from_records(headers, items, DatasetOrigin::new(header_path, item_path))?;
        Ok(store.with_source_files(vec![header_file, item_file]))
    }

    /// Build a store from already-parsed records.
    ///
    /// Fails if an access key repeats in `headers`. Items whose key has no
    /// header stay in `items()` but are left out of `combined()`.
    pub fn from_records(
        headers: Vec<HeaderRecord>,
        items: Vec<ItemRecord>,
        origin: DatasetOrigin,
    ) -> LoadResult<Self> {
        {
            let mut seen = HashSet::with_capacity(headers.len());
            for (i, header) in headers.iter().enumerate() {
                if !seen.insert(header.access_key.as_str()) {
                    return Err(LoadError::DuplicateKey {
                        file: origin.header_path.display().to_string(),
                        row: i + 1,
                        key: header.access_key.clone(),
                    });
                }
            }
        }

        let (combined, orphan_items) = inner_join(&headers, &items);
        if orphan_items > 0 {
            tracing::warn!(
                orphan_items,
                "item rows without a matching header were left out of the join"
            );
        }

        let info = DatasetInfo {
            id: Uuid::now_v7(),
            loaded_at: Utc::now(),
            total_headers: headers.len(),
            total_items: items.len(),
            header_path: origin.header_path,
            item_path: origin.item_path,
        };

        Ok(Self {
            info,
            headers,
            items,
            combined,
            orphan_items,
            source_files: Vec::new(),
            context_text: OnceLock::new(),
        })
    }

    /// Attach the raw files the records were parsed from.
    pub fn with_source_files(mut self, files: Vec<SourceFile>) -> Self {
        self.source_files = files;
        self
    }

    pub fn info(&self) -> &DatasetInfo {
        &self.info
    }

    pub fn headers(&self) -> &[HeaderRecord] {
        &self.headers
    }

    pub fn items(&self) -> &[ItemRecord] {
        &self.items
    }

    /// Inner join on access key, in header order then item order.
    pub fn combined(&self) -> &[CombinedRecord] {
        &self.combined
    }

    /// Number of item rows dropped by the join.
    pub fn orphan_items(&self) -> usize {
        self.orphan_items
    }

    /// Header file then item file, as read during the load. Empty for
    /// stores built from records alone.
    pub fn source_files(&self) -> &[SourceFile] {
        &self.source_files
    }

    /// Prompt overview from `context_summary`, built on first use.
    pub fn context_text(&self) -> Arc<str> {
        self.context_text
            .get_or_init(|| context_summary(self).into())
            .clone()
    }

    /// Distinct header rows of the join, in first-seen order.
    pub fn header_projection(&self) -> Vec<&HeaderRecord> {
        let mut seen = HashSet::new();
        self.combined
            .iter()
            .filter(|row| seen.insert(row.access_key()))
            .map(|row| &row.header)
            .collect()
    }
}

fn inner_join(headers: &[HeaderRecord], items: &[ItemRecord]) -> (Vec<CombinedRecord>, usize) {
    let mut by_key: HashMap<&str, Vec<&ItemRecord>> = HashMap::new();
    for item in items {
        by_key.entry(item.access_key.as_str()).or_default().push(item);
    }

    let mut combined = Vec::with_capacity(items.len());
    for header in headers {
        if let Some(matches) = by_key.get(header.access_key.as_str()) {
            combined.extend(matches.iter().map(|item| CombinedRecord {
                header: header.clone(),
                item: (*item).clone(),
            }));
        }
    }

    let orphans = items.len() - combined.len();
    (combined, orphans)
}
