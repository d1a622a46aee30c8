// In: src/loader/mod.rs

//! Builds the two in-memory tables from their source files.
//!
//! - [`load_genealogy`]: every spreadsheet in a directory, one sheet each, into
//!   one unified `GenealogyTable`. Per-file failures become [`FileReadWarning`]s.
//! - [`load_aux_index`]: the work-order CSV, into an [`AuxIndex`].
//!
//! Both loaders declare every column as `Utf8` up front. Neither one ever lets a
//! reader infer a numeric type for a serial number.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

mod aux_index;
mod cell;
mod genealogy;

pub use aux_index::{load_aux_index, AuxIndex};
pub use genealogy::load_genealogy;

use crate::table::GenealogyTable;

/// A non-fatal diagnostic: one candidate file could not be read and was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReadWarning {
    pub file_name: String,
    pub cause: String,
}

impl fmt::Display for FileReadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error reading {}: {}", self.file_name, self.cause)
    }
}

/// The outcome of a successful genealogy load.
#[derive(Debug, Clone)]
pub struct GenealogyLoad {
    pub table: GenealogyTable,
    pub warnings: Vec<FileReadWarning>,
    /// Names of the files whose rows made it into `table`.
    pub files_loaded: Vec<String>,
}

/// Lists the files directly inside `dir` whose extension matches `extension`
/// (case-insensitive, leading dot optional), sorted by path.
pub(crate) fn candidate_files(dir: &Path, extension: &str) -> std::io::Result<Vec<PathBuf>> {
    let wanted = extension.trim_start_matches('.');
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| ext.eq_ignore_ascii_case(wanted));
        if matches {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// The display name of a file: its final path component.
pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
