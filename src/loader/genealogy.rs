// In: src/loader/genealogy.rs

use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray};
use arrow::record_batch::RecordBatch;
use calamine::{open_workbook_auto, Data, Range, Reader};

use super::cell::{cell_text, header_names};
use super::{candidate_files, file_name_of, FileReadWarning, GenealogyLoad};
use crate::config::LoaderConfig;
use crate::error::GenealogyError;
use crate::table::{
    utf8_schema, StringTable, GENEALOGY_COLUMNS, PARENT_SERIAL_NO, SERIAL_NO, SOURCE_FILE,
};

/// Loads every candidate spreadsheet in `directory` into one unified table.
///
/// A file that cannot be read is skipped with a warning. The load only fails,
/// with `MissingData`, when the directory is missing, holds no candidate file, or
/// none of its candidate files could be read.
pub fn load_genealogy(
    directory: &Path,
    config: &LoaderConfig,
) -> Result<GenealogyLoad, GenealogyError> {
    let missing = |reason: String, warnings: Vec<FileReadWarning>| GenealogyError::MissingData {
        path: directory.to_path_buf(),
        reason,
        warnings,
    };

    if !directory.is_dir() {
        return Err(missing("directory does not exist".to_string(), Vec::new()));
    }
    let files = candidate_files(directory, &config.extension)
        .map_err(|e| missing(format!("directory could not be listed: {}", e), Vec::new()))?;
    if files.is_empty() {
        return Err(missing(
            format!("no .{} files found", config.extension.trim_start_matches('.')),
            Vec::new(),
        ));
    }

    log::info!(
        "Loading genealogy from {} file(s) in '{}' (sheet '{}')",
        files.len(),
        directory.display(),
        config.sheet_name
    );

    let mut tables = Vec::with_capacity(files.len());
    let mut files_loaded = Vec::with_capacity(files.len());
    let mut warnings = Vec::new();

    for path in &files {
        let file_name = file_name_of(path);
        match read_genealogy_file(path, &file_name, &config.sheet_name) {
            Ok(table) => {
                log::debug!("  - {}: {} row(s)", file_name, table.num_rows());
                tables.push(table);
                files_loaded.push(file_name);
            }
            Err(err) => {
                let warning = FileReadWarning {
                    file_name,
                    cause: err.to_string(),
                };
                log::warn!("{}", warning);
                warnings.push(warning);
            }
        }
    }

    if tables.is_empty() {
        let reason = format!("all {} candidate file(s) failed to load", files.len());
        return Err(missing(reason, warnings));
    }

    let table = StringTable::concat(&tables, &GENEALOGY_COLUMNS)?;
    log::info!(
        "Genealogy table ready: {} row(s) from {} file(s), {} warning(s)",
        table.num_rows(),
        files_loaded.len(),
        warnings.len()
    );

    Ok(GenealogyLoad {
        table,
        warnings,
        files_loaded,
    })
}

fn read_genealogy_file(
    path: &Path,
    file_name: &str,
    sheet_name: &str,
) -> Result<StringTable, GenealogyError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook.worksheet_range(sheet_name)?;
    sheet_to_table(&range, file_name)
}

/// Converts a sheet whose first row is the header into a table, appending the
/// `Source File` column. An empty sheet gives a zero-row table.
pub(crate) fn sheet_to_table(
    range: &Range<Data>,
    file_name: &str,
) -> Result<StringTable, GenealogyError> {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(StringTable::empty_genealogy());
    };
    let headers = header_names(header);

    // An incoming `Source File` column is replaced by the load-time one.
    let kept: Vec<usize> = (0..headers.len())
        .filter(|&idx| headers[idx] != SOURCE_FILE)
        .collect();

    let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); kept.len()];
    let mut num_rows = 0;
    for row in rows {
        if row.iter().all(|cell| matches!(cell, Data::Empty)) {
            continue;
        }
        for (slot, &idx) in kept.iter().enumerate() {
            columns[slot].push(row.get(idx).and_then(cell_text));
        }
        num_rows += 1;
    }

    for required in [PARENT_SERIAL_NO, SERIAL_NO] {
        if !headers.iter().any(|h| h == required) {
            log::warn!(
                "{}: sheet has no '{}' column; its cells will be null",
                file_name,
                required
            );
        }
    }

    let mut names: Vec<&str> = kept.iter().map(|&idx| headers[idx].as_str()).collect();
    names.push(SOURCE_FILE);

    let mut arrays: Vec<ArrayRef> = columns
        .into_iter()
        .map(|values| Arc::new(StringArray::from(values)) as ArrayRef)
        .collect();
    arrays.push(Arc::new(StringArray::from(vec![Some(file_name); num_rows])));

    let batch = RecordBatch::try_new(utf8_schema(&names), arrays)?;
    StringTable::from_batch(batch)
}
