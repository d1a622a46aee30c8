// In: src/table/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Table Layer
// ====================================================================================
//
// Every table in this crate is a `StringTable`: an immutable Arrow `RecordBatch`
// whose columns are all nullable `Utf8`. Values are converted to text exactly once,
// at the load boundary, so nothing downstream can re-infer a numeric type and lose
// a leading zero.
//
//   [Loader] -> RecordBatch per file -> `StringTable::concat` (union schema, nulls
//               for columns a file did not carry)
//   [Resolver / Lookup] -> `filter_eq` / `position_eq` on a key column
//   [Session] -> `records()` materialises rows into serde-friendly structs
//
// A null is the "absent" marker. It never equals any query, including "".
// ====================================================================================

pub mod record;

use std::collections::BTreeMap;
use std::sync::Arc;

use arrow::array::{new_null_array, Array, ArrayRef, StringArray};
use arrow::compute::kernels::cmp::eq;
use arrow::compute::{concat_batches, filter_record_batch};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;

use crate::error::GenealogyError;

pub use record::{GenealogyRecord, WorkOrderRecord};

//==================================================================================
// 0. Column Names
//==================================================================================
pub const PARENT_PART_NO: &str = "Parent Part No";
pub const PARENT_SERIAL_NO: &str = "Parent Serial No";
pub const PART_NO: &str = "Part No";
pub const SERIAL_NO: &str = "Serial No";
pub const SOURCE_FILE: &str = "Source File";

/// Columns every unified genealogy table carries, null-filled if no file had them.
pub const GENEALOGY_COLUMNS: [&str; 5] =
    [PARENT_PART_NO, PARENT_SERIAL_NO, PART_NO, SERIAL_NO, SOURCE_FILE];

pub const AUX_SERIAL_NUMBER: &str = "Serial Number";
pub const AUX_WORK_ORDER_NUMBER: &str = "Work Order Number";
pub const AUX_OPERATOR_NAME: &str = "Operator's Name";

/// The unified genealogy table.
pub type GenealogyTable = StringTable;

/// Builds a schema of nullable `Utf8` fields, in the given order.
pub fn utf8_schema<S: AsRef<str>>(names: &[S]) -> SchemaRef {
    Arc::new(Schema::new(
        names
            .iter()
            .map(|name| Field::new(name.as_ref(), DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ))
}

//==================================================================================
// 1. StringTable
//==================================================================================

/// An immutable, all-`Utf8` table. Cloning is cheap (Arrow buffers are shared).
#[derive(Debug, Clone)]
pub struct StringTable {
    batch: RecordBatch,
}

impl StringTable {
    /// Wraps a batch, rejecting any column that is not `Utf8`.
    pub fn from_batch(batch: RecordBatch) -> Result<Self, GenealogyError> {
        for field in batch.schema().fields() {
            if field.data_type() != &DataType::Utf8 {
                return Err(GenealogyError::Schema(format!(
                    "column '{}' has type {:?}, expected Utf8",
                    field.name(),
                    field.data_type()
                )));
            }
        }
        Ok(Self { batch })
    }

    /// A zero-row table with the given columns.
    pub fn empty_with_columns<S: AsRef<str>>(names: &[S]) -> Self {
        Self {
            batch: RecordBatch::new_empty(utf8_schema(names)),
        }
    }

    /// A zero-row genealogy table carrying the required columns.
    pub fn empty_genealogy() -> Self {
        Self::empty_with_columns(&GENEALOGY_COLUMNS)
    }

    /// Builds a table column by column. All columns must have the same length.
    pub fn from_columns(columns: Vec<(String, Vec<Option<String>>)>) -> Result<Self, GenealogyError> {
        if columns.is_empty() {
            return Err(GenealogyError::Schema(
                "a table needs at least one column".to_string(),
            ));
        }
        let names: Vec<&str> = columns.iter().map(|(name, _)| name.as_str()).collect();
        let schema = utf8_schema(&names);
        let arrays: Vec<ArrayRef> = columns
            .iter()
            .map(|(_, values)| Arc::new(StringArray::from(values.clone())) as ArrayRef)
            .collect();
        let batch = RecordBatch::try_new(schema, arrays)?;
        Ok(Self { batch })
    }

    /// Concatenates tables under the union of their columns (first-seen order),
    /// plus any `required` column none of them carried. Cells of a column a table
    /// did not carry are null.
    pub fn concat(tables: &[StringTable], required: &[&str]) -> Result<Self, GenealogyError> {
        let mut names: Vec<String> = Vec::new();
        for table in tables {
            for field in table.batch.schema().fields() {
                if !names.iter().any(|n| n == field.name()) {
                    names.push(field.name().clone());
                }
            }
        }
        for column in required {
            if !names.iter().any(|n| n == column) {
                names.push(column.to_string());
            }
        }

        let schema = utf8_schema(&names);
        let aligned = tables
            .iter()
            .map(|table| table.align_to(&schema))
            .collect::<Result<Vec<_>, _>>()?;
        let batch = concat_batches(&schema, &aligned)?;
        Ok(Self { batch })
    }

    fn align_to(&self, schema: &SchemaRef) -> Result<RecordBatch, GenealogyError> {
        let rows = self.batch.num_rows();
        let columns: Vec<ArrayRef> = schema
            .fields()
            .iter()
            .map(|field| match self.batch.column_by_name(field.name()) {
                Some(column) => Arc::clone(column),
                None => new_null_array(&DataType::Utf8, rows),
            })
            .collect();
        Ok(RecordBatch::try_new(Arc::clone(schema), columns)?)
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.num_rows() == 0
    }

    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.batch.column_by_name(name).is_some()
    }

    pub fn string_column(&self, name: &str) -> Option<&StringArray> {
        self.batch
            .column_by_name(name)
            .and_then(|column| column.as_any().downcast_ref::<StringArray>())
    }

    /// The text of one cell, `None` if the column is missing or the cell is null.
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let array = self.string_column(column)?;
        if row >= array.len() || array.is_null(row) {
            return None;
        }
        Some(array.value(row))
    }

    /// Rows whose `column` equals `value` exactly, in table order. A table without
    /// that column yields an empty table with the same schema.
    pub fn filter_eq(&self, column: &str, value: &str) -> Result<Self, GenealogyError> {
        let Some(array) = self.batch.column_by_name(column) else {
            return Ok(Self {
                batch: RecordBatch::new_empty(self.batch.schema()),
            });
        };
        let predicate = eq(array, &StringArray::new_scalar(value))?;
        let batch = filter_record_batch(&self.batch, &predicate)?;
        Ok(Self { batch })
    }

    /// Index of the first row whose `column` equals `value` exactly.
    pub fn position_eq(&self, column: &str, value: &str) -> Option<usize> {
        let array = self.string_column(column)?;
        array.iter().position(|cell| cell == Some(value))
    }

    /// One row as a column-name -> cell map.
    pub fn row_map(&self, row: usize) -> BTreeMap<String, Option<String>> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|field| {
                let cell = self.value(row, field.name()).map(str::to_string);
                (field.name().clone(), cell)
            })
            .collect()
    }

    /// Materialises every row as a `GenealogyRecord`.
    pub fn records(&self) -> Vec<GenealogyRecord> {
        (0..self.num_rows())
            .map(|row| GenealogyRecord::from_row_map(self.row_map(row)))
            .collect()
    }
}
