//! ZIP extraction for the published monthly invoice archive.
//!
//! The archive holds two CSV files; the header file's name contains
//! `cabecalho` and the item file's name contains `itens` (any case).

use std::fs::File;
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::error::{LoadError, LoadResult};

const HEADER_MARKER: &str = "cabecalho";
const ITEM_MARKER: &str = "itens";

/// Paths of the two extracted CSV files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFiles {
    pub header_path: PathBuf,
    pub item_path: PathBuf,
}

/// Extract the header and item members of `archive` into `dest`.
///
/// Existing files in `dest` are overwritten, so a reload picks up a
/// replaced archive.
pub fn extract_archive(archive: &Path, dest: &Path) -> LoadResult<ExtractedFiles> {
    let file = File::open(archive).map_err(|e| LoadError::from_io(archive, e))?;
    let mut zip = ZipArchive::new(file)
        .map_err(|e| LoadError::Archive(format!("{}: {e}", archive.display())))?;

    let names: Vec<String> = zip.file_names().map(String::from).collect();
    let (header, item) = match_members(&names);
    let header = header.ok_or(LoadError::MissingArchiveMember(HEADER_MARKER))?;
    let item = item.ok_or(LoadError::MissingArchiveMember(ITEM_MARKER))?;

    let header_path = extract_member(&mut zip, header, dest)?;
    let item_path = extract_member(&mut zip, item, dest)?;

    tracing::info!(
        archive = %archive.display(),
        dest = %dest.display(),
        members = names.len(),
        "archive extracted"
    );

    Ok(ExtractedFiles {
        header_path,
        item_path,
    })
}

fn extract_member(zip: &mut ZipArchive<File>, name: &str, dest: &Path) -> LoadResult<PathBuf> {
    let mut entry = zip
        .by_name(name)
        .map_err(|e| LoadError::Archive(format!("{name}: {e}")))?;
    let relative = entry
        .enclosed_name()
        .ok_or_else(|| LoadError::Archive(format!("unsafe member path: {name}")))?;

    let out = dest.join(relative);
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent).map_err(|e| LoadError::from_io(parent, e))?;
    }
    let mut file = File::create(&out).map_err(|e| LoadError::from_io(&out, e))?;
    std::io::copy(&mut entry, &mut file).map_err(|e| LoadError::from_io(&out, e))?;
    Ok(out)
}

/// Pick the first header-like and first item-like member names.
///
/// A name matching both markers counts as the header file.
pub fn match_members(names: &[String]) -> (Option<&str>, Option<&str>) {
    let mut header = None;
    let mut item = None;
    for name in names.iter().filter(|n| !n.ends_with('/')) {
        let lower = name.to_lowercase();
        if lower.contains(HEADER_MARKER) {
            header = header.or(Some(name.as_str()));
        } else if lower.contains(ITEM_MARKER) {
            item = item.or(Some(name.as_str()));
        }
    }
    (header, item)
}
