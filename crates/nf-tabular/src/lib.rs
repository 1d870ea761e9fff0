//! Tabular store for nota fiscal datasets.
//!
//! Loads the header and item CSV files (optionally from a ZIP archive),
//! normalizes column names, parses typed records, keeps their inner join,
//! and answers the known question intents with deterministic aggregations.

pub mod aggregate;
pub mod archive;
pub mod error;
pub mod format;
pub mod mock;
pub mod reader;
pub mod records;
pub mod source;
pub mod store;
pub mod summary;

// Re-export key types for convenience
pub use aggregate::{Answer, answer};
pub use error::{LoadError, LoadResult};
pub use reader::{Delimiter, Table};
pub use source::{ArchiveSource, CsvPairSource, DatasetSource};
pub use store::{DatasetOrigin, SourceFile, TabularStore};
pub use summary::{context_summary, data_summary};
