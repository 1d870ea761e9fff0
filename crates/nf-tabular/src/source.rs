//! Dataset sources: where a load cycle gets its two CSV files from.

use std::path::{Path, PathBuf};

use crate::archive::extract_archive;
use crate::error::{LoadError, LoadResult};
use crate::reader::Delimiter;
use crate::store::TabularStore;

/// Produces a fully validated store, or an error with nothing published.
///
/// Loading is blocking file I/O and parsing; async callers run it on
/// `spawn_blocking`.
pub trait DatasetSource: Send + Sync {
    fn load(&self) -> LoadResult<TabularStore>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

/// Reads two CSV files directly.
#[derive(Debug, Clone)]
pub struct CsvPairSource {
    pub header_path: PathBuf,
    pub item_path: PathBuf,
    pub delimiter: Delimiter,
}

impl CsvPairSource {
    pub fn new(header_path: impl Into<PathBuf>, item_path: impl Into<PathBuf>) -> Self {
        Self {
            header_path: header_path.into(),
            item_path: item_path.into(),
            delimiter: Delimiter::default(),
        }
    }
}

impl DatasetSource for CsvPairSource {
    fn load(&self) -> LoadResult<TabularStore> {
        TabularStore::load(&self.header_path, &self.item_path, self.delimiter)
    }

    fn describe(&self) -> String {
        format!(
            "csv {} + {}",
            self.header_path.display(),
            self.item_path.display()
        )
    }
}

/// Finds the first existing archive among `candidates`, extracts it into
/// `extract_dir`, and reads the two CSV files it contains.
#[derive(Debug, Clone)]
pub struct ArchiveSource {
    pub candidates: Vec<PathBuf>,
    pub extract_dir: PathBuf,
    pub delimiter: Delimiter,
}

impl ArchiveSource {
    pub fn new(candidates: Vec<PathBuf>, extract_dir: impl Into<PathBuf>) -> Self {
        Self {
            candidates,
            extract_dir: extract_dir.into(),
            delimiter: Delimiter::default(),
        }
    }

    /// First candidate path that exists on disk.
    pub fn locate(&self) -> LoadResult<&Path> {
        self.candidates
            .iter()
            .map(PathBuf::as_path)
            .find(|p| p.is_file())
            .ok_or_else(|| {
                let searched: Vec<String> = self
                    .candidates
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect();
                LoadError::NoArchive(searched.join(", "))
            })
    }
}

impl DatasetSource for ArchiveSource {
    fn load(&self) -> LoadResult<TabularStore> {
        let archive = self.locate()?;
        let files = extract_archive(archive, &self.extract_dir)?;
        TabularStore::load(&files.header_path, &files.item_path, self.delimiter)
    }

    fn describe(&self) -> String {
        format!("archive -> {}", self.extract_dir.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock;

    #[test]
    fn csv_pair_source_loads() {
        let dir = tempfile::tempdir().unwrap();
        let origin = mock::write_sample_csvs(dir.path()).unwrap();
        let source = CsvPairSource::new(&origin.header_path, &origin.item_path);
        let store = source.load().unwrap();
        assert_eq!(store.headers().len(), 5);
        assert!(source.describe().contains("Cabecalho"));
    }

    #[test]
    fn archive_source_uses_first_existing_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("202401_NFs.zip");
        mock::write_sample_archive(&zip_path).unwrap();

        let source = ArchiveSource::new(
            vec![dir.path().join("missing.zip"), zip_path.clone()],
            dir.path().join("data"),
        );
        assert_eq!(source.locate().unwrap(), zip_path.as_path());

        let store = source.load().unwrap();
        assert_eq!(store.items().len(), 7);
        assert_eq!(
            store.info().item_path,
            dir.path().join("data").join(mock::SAMPLE_ITEM_FILE)
        );
    }

    #[test]
    fn archive_source_without_candidates_fails() {
        let source = ArchiveSource::new(vec![PathBuf::from("/nonexistent/a.zip")], "/tmp/nf");
        let err = source.load().unwrap_err();
        assert!(matches!(err, LoadError::NoArchive(ref s) if s.contains("/nonexistent/a.zip")));
    }
}
