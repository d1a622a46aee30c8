// In: src/loader/aux_index.rs

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;

use crate::config::AuxConfig;
use crate::error::GenealogyError;
use crate::table::{StringTable, WorkOrderRecord, AUX_OPERATOR_NAME, AUX_SERIAL_NUMBER, AUX_WORK_ORDER_NUMBER};

/// The work-order/operator side table, keyed by `Serial Number`.
#[derive(Debug, Clone)]
pub struct AuxIndex {
    table: StringTable,
    source: Option<PathBuf>,
}

impl AuxIndex {
    /// An index with no rows; every lookup against it reports "not found".
    pub fn empty() -> Self {
        Self {
            table: StringTable::empty_with_columns(&[
                AUX_SERIAL_NUMBER,
                AUX_WORK_ORDER_NUMBER,
                AUX_OPERATOR_NAME,
            ]),
            source: None,
        }
    }

    pub fn from_table(table: StringTable) -> Result<Self, GenealogyError> {
        if !table.has_column(AUX_SERIAL_NUMBER) {
            return Err(GenealogyError::Schema(format!(
                "work-order table has no '{}' column",
                AUX_SERIAL_NUMBER
            )));
        }
        Ok(Self {
            table,
            source: None,
        })
    }

    pub fn table(&self) -> &StringTable {
        &self.table
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn len(&self) -> usize {
        self.table.num_rows()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub(crate) fn record_at(&self, row: usize) -> WorkOrderRecord {
        WorkOrderRecord::from_row_map(self.table.row_map(row))
    }
}

/// Loads the work-order CSV at `path`.
///
/// The first `config.skip_lines` lines are discarded, the next line is the
/// header. Any failure is reported as `MissingAuxData`.
pub fn load_aux_index(path: &Path, config: &AuxConfig) -> Result<AuxIndex, GenealogyError> {
    let table = read_aux_table(path, config.skip_lines).map_err(|err| {
        GenealogyError::MissingAuxData {
            path: path.to_path_buf(),
            reason: err.to_string(),
        }
    })?;
    log::info!(
        "Work-order index ready: {} row(s) from '{}'",
        table.num_rows(),
        path.display()
    );
    let mut index = AuxIndex::from_table(table).map_err(|err| GenealogyError::MissingAuxData {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    index.source = Some(path.to_path_buf());
    Ok(index)
}

fn read_aux_table(path: &Path, skip_lines: usize) -> Result<StringTable, GenealogyError> {
    let bytes = fs::read(path)?;
    let body = skip_leading_lines(&bytes, skip_lines);

    // Only the header names are taken from the file; every type is declared Utf8.
    let (header_schema, _) = Format::default()
        .with_header(true)
        .infer_schema(Cursor::new(body), Some(0))?;
    let names: Vec<String> = header_schema
        .fields()
        .iter()
        .map(|field| field.name().clone())
        .collect();
    if names.is_empty() {
        return Err(GenealogyError::Schema("no header row".to_string()));
    }

    // Short rows get nulls for their missing trailing fields.
    let schema = crate::table::utf8_schema(&names);
    let reader = ReaderBuilder::new(schema.clone())
        .with_header(true)
        .with_truncated_rows(true)
        .build(Cursor::new(body))?;
    let batches = reader.collect::<Result<Vec<_>, _>>()?;
    let tables = batches
        .into_iter()
        .map(StringTable::from_batch)
        .collect::<Result<Vec<_>, _>>()?;
    if tables.is_empty() {
        return Ok(StringTable::empty_with_columns(&names));
    }
    StringTable::concat(&tables, &[])
}

/// Drops the first `count` newline-terminated lines.
fn skip_leading_lines(bytes: &[u8], count: usize) -> &[u8] {
    let mut rest = bytes;
    for _ in 0..count {
        match rest.iter().position(|&b| b == b'\n') {
            Some(idx) => rest = &rest[idx + 1..],
            None => return &[],
        }
    }
    rest
}
