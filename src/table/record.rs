//! Row-level views of the two tables, for presentation layers and FFI.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{
    AUX_OPERATOR_NAME, AUX_SERIAL_NUMBER, AUX_WORK_ORDER_NUMBER, PARENT_PART_NO,
    PARENT_SERIAL_NO, PART_NO, SERIAL_NO, SOURCE_FILE,
};

/// One parent-to-child component relationship.
///
/// Columns other than the five known ones are kept in `extra` uninterpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenealogyRecord {
    #[serde(rename = "Parent Part No")]
    pub parent_part_no: Option<String>,
    #[serde(rename = "Parent Serial No")]
    pub parent_serial_no: Option<String>,
    #[serde(rename = "Part No")]
    pub part_no: Option<String>,
    #[serde(rename = "Serial No")]
    pub serial_no: Option<String>,
    #[serde(rename = "Source File")]
    pub source_file: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Option<String>>,
}

impl GenealogyRecord {
    pub(crate) fn from_row_map(mut row: BTreeMap<String, Option<String>>) -> Self {
        let mut take = |name: &str| row.remove(name).flatten();
        let parent_part_no = take(PARENT_PART_NO);
        let parent_serial_no = take(PARENT_SERIAL_NO);
        let part_no = take(PART_NO);
        let serial_no = take(SERIAL_NO);
        let source_file = take(SOURCE_FILE);
        Self {
            parent_part_no,
            parent_serial_no,
            part_no,
            serial_no,
            source_file,
            extra: row,
        }
    }
}

/// One row of the work-order/operator log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkOrderRecord {
    #[serde(rename = "Serial Number")]
    pub serial_number: String,
    #[serde(rename = "Work Order Number")]
    pub work_order_number: Option<String>,
    #[serde(rename = "Operator's Name")]
    pub operator_name: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Option<String>>,
}

impl WorkOrderRecord {
    pub(crate) fn from_row_map(mut row: BTreeMap<String, Option<String>>) -> Self {
        let mut take = |name: &str| row.remove(name).flatten();
        let serial_number = take(AUX_SERIAL_NUMBER).unwrap_or_default();
        let work_order_number = take(AUX_WORK_ORDER_NUMBER);
        let operator_name = take(AUX_OPERATOR_NAME);
        Self {
            serial_number,
            work_order_number,
            operator_name,
            extra: row,
        }
    }
}
