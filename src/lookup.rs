//! Work-order lookup: the first row of the auxiliary index whose `Serial Number`
//! equals the trimmed query.

use crate::loader::AuxIndex;
use crate::table::{WorkOrderRecord, AUX_SERIAL_NUMBER};

/// Returns the first matching work-order row, or `None`. Never fails.
pub fn lookup_aux(index: &AuxIndex, serial: &str) -> Option<WorkOrderRecord> {
    let query = serial.trim();
    let row = index.table().position_eq(AUX_SERIAL_NUMBER, query)?;
    Some(index.record_at(row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::StringTable;

    fn index(rows: &[(&str, &str, &str)]) -> AuxIndex {
        let column = |pick: usize| -> Vec<Option<String>> {
            rows.iter()
                .map(|r| {
                    let value = [r.0, r.1, r.2][pick];
                    (!value.is_empty()).then(|| value.to_string())
                })
                .collect()
        };
        let table = StringTable::from_columns(vec![
            ("Serial Number".to_string(), column(0)),
            ("Work Order Number".to_string(), column(1)),
            ("Operator's Name".to_string(), column(2)),
        ])
        .unwrap();
        AuxIndex::from_table(table).unwrap()
    }

    #[test]
    fn test_lookup_trims_query_and_matches_exactly() {
        let index = index(&[("0071", "WO-1", "Dana"), ("71", "WO-2", "Lee")]);

        let record = lookup_aux(&index, " 0071 ").unwrap();
        assert_eq!(record.serial_number, "0071");
        assert_eq!(record.work_order_number.as_deref(), Some("WO-1"));
        assert_eq!(record.operator_name.as_deref(), Some("Dana"));

        assert_eq!(lookup_aux(&index, "71").unwrap().operator_name.as_deref(), Some("Lee"));
        assert!(lookup_aux(&index, "071").is_none());
    }

    #[test]
    fn test_lookup_first_match_wins() {
        let index = index(&[("S1", "WO-OLD", "Ann"), ("S1", "WO-NEW", "Bob")]);
        let record = lookup_aux(&index, "S1").unwrap();
        assert_eq!(record.work_order_number.as_deref(), Some("WO-OLD"));
    }

    #[test]
    fn test_lookup_missing_cells_are_none() {
        let index = index(&[("S1", "", "")]);
        let record = lookup_aux(&index, "S1").unwrap();
        assert_eq!(record.work_order_number, None);
        assert_eq!(record.operator_name, None);
        assert!(record.extra.is_empty());
    }

    #[test]
    fn test_lookup_on_empty_index_is_not_found() {
        assert!(lookup_aux(&AuxIndex::empty(), "S1").is_none());
    }
}
