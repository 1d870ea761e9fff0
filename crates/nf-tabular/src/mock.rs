//! Sample invoice data for tests and local development.
//!
//! The CSV text deliberately carries a BOM, padded column names and extra
//! columns, like the published datasets do.

use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use nf_protocol::records::columns;
use nf_protocol::{HeaderRecord, ItemRecord};

use crate::error::{LoadError, LoadResult};
use crate::source::DatasetSource;
use crate::store::{DatasetOrigin, SourceFile, TabularStore};

/// Header file name inside the sample archive.
pub const SAMPLE_HEADER_FILE: &str = "202401_NFs_Cabecalho.csv";
/// Item file name inside the sample archive.
pub const SAMPLE_ITEM_FILE: &str = "202401_NFs_Itens.csv";

pub const SAMPLE_HEADER_CSV: &str = "\u{feff} CHAVE DE ACESSO ,MODELO, RAZÃO SOCIAL EMITENTE ,UF EMITENTE ,DATA EMISSÃO, VALOR NOTA FISCAL \n\
NF-001,55,Papelaria Central LTDA,SP,2024-01-02 08:00:00,100.00\n\
NF-002,55,Distribuidora Paulista S.A.,SP,2024-01-05 10:15:00,250.00\n\
NF-003,55,Distribuidora Paulista S.A.,RJ,2024-01-10 14:30:00,50.00\n\
NF-004,55,Comercial Minas ME,MG,2024-01-15 09:00:00,1200.50\n\
NF-005,55,Papelaria Central LTDA,SP,2024-01-31 17:45:00,80.25\n";

pub const SAMPLE_ITEM_CSV: &str = " CHAVE DE ACESSO,DESCRIÇÃO DO PRODUTO/SERVIÇO , QUANTIDADE,VALOR TOTAL\n\
NF-001,Caneta,10.0000,25.00\n\
NF-001,Papel A4,5.0000,75.00\n\
NF-002,Caneta,7.0000,17.50\n\
NF-003,Grampeador,2.0000,50.00\n\
NF-004,Papel A4,20.0000,1200.50\n\
NF-005,Caneta,1.0000,80.25\n\
NF-999,Borracha,3.0000,4.50\n";

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, min, 0))
        .unwrap_or_default()
}

/// A header record issued at 2024-01-02 00:00.
pub fn header(key: &str, name: &str, state: &str, value: f64) -> HeaderRecord {
    HeaderRecord {
        access_key: key.into(),
        issuer_name: name.into(),
        issuer_state: state.into(),
        issued_at: at(2024, 1, 2, 0, 0),
        total_value: value,
    }
}

pub fn item(key: &str, description: &str, quantity: f64) -> ItemRecord {
    ItemRecord {
        access_key: key.into(),
        description: description.into(),
        quantity,
    }
}

/// Records matching `SAMPLE_HEADER_CSV`.
pub fn sample_headers() -> Vec<HeaderRecord> {
    let rows = [
        ("NF-001", "Papelaria Central LTDA", "SP", at(2024, 1, 2, 8, 0), 100.00),
        ("NF-002", "Distribuidora Paulista S.A.", "SP", at(2024, 1, 5, 10, 15), 250.00),
        ("NF-003", "Distribuidora Paulista S.A.", "RJ", at(2024, 1, 10, 14, 30), 50.00),
        ("NF-004", "Comercial Minas ME", "MG", at(2024, 1, 15, 9, 0), 1200.50),
        ("NF-005", "Papelaria Central LTDA", "SP", at(2024, 1, 31, 17, 45), 80.25),
    ];
    rows.into_iter()
        .map(|(key, name, state, issued_at, value)| HeaderRecord {
            issued_at,
            ..header(key, name, state, value)
        })
        .collect()
}

/// Records matching `SAMPLE_ITEM_CSV`, including one orphan (`NF-999`).
pub fn sample_items() -> Vec<ItemRecord> {
    vec![
        item("NF-001", "Caneta", 10.0),
        item("NF-001", "Papel A4", 5.0),
        item("NF-002", "Caneta", 7.0),
        item("NF-003", "Grampeador", 2.0),
        item("NF-004", "Papel A4", 20.0),
        item("NF-005", "Caneta", 1.0),
        item("NF-999", "Borracha", 3.0),
    ]
}

pub fn origin() -> DatasetOrigin {
    DatasetOrigin::new(SAMPLE_HEADER_FILE, SAMPLE_ITEM_FILE)
}

/// Build a store from arbitrary records, panicking on invalid input.
pub fn store_from(headers: Vec<HeaderRecord>, items: Vec<ItemRecord>) -> TabularStore {
    match TabularStore::from_records(headers, items, origin()) {
        Ok(store) => store,
        Err(e) => panic!("invalid mock records: {e}"),
    }
}

/// The sample records, carrying the sample CSV text as their source files.
pub fn sample_store() -> TabularStore {
    store_from(sample_headers(), sample_items()).with_source_files(sample_source_files())
}

pub fn sample_source_files() -> Vec<SourceFile> {
    vec![
        SourceFile::new(SAMPLE_HEADER_FILE, SAMPLE_HEADER_CSV.as_bytes()),
        SourceFile::new(SAMPLE_ITEM_FILE, SAMPLE_ITEM_CSV.as_bytes()),
    ]
}

/// Write the two sample CSV files into `dir`.
pub fn write_sample_csvs(dir: &Path) -> std::io::Result<DatasetOrigin> {
    let origin = DatasetOrigin::new(dir.join(SAMPLE_HEADER_FILE), dir.join(SAMPLE_ITEM_FILE));
    std::fs::write(&origin.header_path, SAMPLE_HEADER_CSV)?;
    std::fs::write(&origin.item_path, SAMPLE_ITEM_CSV)?;
    Ok(origin)
}

/// Write a ZIP archive at `path` holding the two sample CSV files.
pub fn write_sample_archive(path: &Path) -> std::io::Result<()> {
    write_archive(
        path,
        &[
            (SAMPLE_HEADER_FILE, SAMPLE_HEADER_CSV),
            (SAMPLE_ITEM_FILE, SAMPLE_ITEM_CSV),
        ],
    )
}

/// Write a ZIP archive with arbitrary `(name, content)` members.
pub fn write_archive(path: &Path, members: &[(&str, &str)]) -> std::io::Result<()> {
    let file = std::fs::File::create(path)?;
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    for (name, content) in members {
        zip.start_file(*name, options)
            .map_err(std::io::Error::other)?;
        zip.write_all(content.as_bytes())?;
    }
    zip.finish().map_err(std::io::Error::other)?;
    Ok(())
}

/// What the next `MockDatasetSource::load` returns.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    Records(Vec<HeaderRecord>, Vec<ItemRecord>),
    /// Fail as if the header file lacked the access-key column.
    MissingKeyColumn,
}

/// In-memory dataset source with a switchable outcome and optional delay.
pub struct MockDatasetSource {
    outcome: Mutex<MockOutcome>,
    delay: Duration,
    loads: AtomicUsize,
}

impl MockDatasetSource {
    pub fn new(outcome: MockOutcome) -> Self {
        Self {
            outcome: Mutex::new(outcome),
            delay: Duration::ZERO,
            loads: AtomicUsize::new(0),
        }
    }

    /// Source returning the sample records.
    pub fn sample() -> Self {
        Self::new(MockOutcome::Records(sample_headers(), sample_items()))
    }

    /// Block each load for `delay` (simulates a slow extraction).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn set_outcome(&self, outcome: MockOutcome) {
        *self.outcome.lock().unwrap_or_else(|e| e.into_inner()) = outcome;
    }

    /// Number of loads started so far.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl DatasetSource for MockDatasetSource {
    fn load(&self) -> LoadResult<TabularStore> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        let outcome = self
            .outcome
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        match outcome {
            MockOutcome::Records(headers, items) => {
                TabularStore::from_records(headers, items, origin())
            }
            MockOutcome::MissingKeyColumn => Err(LoadError::MissingColumn {
                file: SAMPLE_HEADER_FILE.to_string(),
                column: columns::ACCESS_KEY.to_string(),
            }),
        }
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}
