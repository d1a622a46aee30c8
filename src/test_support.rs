//! Shared fixtures for unit tests: spreadsheet and CSV files written on the fly.

use std::fs;
use std::path::Path;

use rust_xlsxwriter::Workbook;

use crate::table::{StringTable, PARENT_PART_NO, PARENT_SERIAL_NO, PART_NO, SERIAL_NO, SOURCE_FILE};

/// One cell of a fixture sheet.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Cell {
    Text(&'static str),
    Number(f64),
    Blank,
}

pub(crate) const GENEALOGY_HEADER: [&str; 4] =
    [PARENT_PART_NO, PARENT_SERIAL_NO, PART_NO, SERIAL_NO];

/// Writes a workbook with one sheet named `sheet` holding `header` then `rows`.
pub(crate) fn write_xlsx(path: &Path, sheet: &str, header: &[&str], rows: &[Vec<Cell>]) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet).unwrap();
    for (col, name) in header.iter().enumerate() {
        worksheet.write_string(0, col as u16, *name).unwrap();
    }
    for (r, row) in rows.iter().enumerate() {
        let r = (r + 1) as u32;
        for (c, cell) in row.iter().enumerate() {
            let c = c as u16;
            match cell {
                Cell::Text(text) => {
                    worksheet.write_string(r, c, *text).unwrap();
                }
                Cell::Number(n) => {
                    worksheet.write_number(r, c, *n).unwrap();
                }
                Cell::Blank => {}
            }
        }
    }
    workbook.save(path).unwrap();
}

/// Writes a genealogy workbook from (parent_part, parent_serial, part, serial) text rows.
pub(crate) fn write_genealogy_xlsx(path: &Path, rows: &[[&'static str; 4]]) {
    let rows: Vec<Vec<Cell>> = rows
        .iter()
        .map(|row| row.iter().map(|text| Cell::Text(*text)).collect())
        .collect();
    write_xlsx(path, "Genealogy", &GENEALOGY_HEADER, &rows);
}

/// Writes a work-order CSV with the two boilerplate lines in front.
pub(crate) fn write_aux_csv(path: &Path, rows: &[[&str; 3]]) {
    let mut text = String::from("Work Order Report,,\nExported by MES,,\n");
    text.push_str("Serial Number,Work Order Number,Operator's Name\n");
    for row in rows {
        text.push_str(&row.join(","));
        text.push('\n');
    }
    fs::write(path, text).unwrap();
}

/// An in-memory genealogy table from (parent_serial, part_no, serial) triples.
pub(crate) fn genealogy_table(rows: &[(&str, &str, &str)]) -> StringTable {
    let parents: Vec<Option<String>> = rows.iter().map(|r| Some(r.0.to_string())).collect();
    let parts: Vec<Option<String>> = rows.iter().map(|r| Some(r.1.to_string())).collect();
    let serials: Vec<Option<String>> = rows.iter().map(|r| Some(r.2.to_string())).collect();
    StringTable::from_columns(vec![
        (PARENT_PART_NO.to_string(), vec![Some("ASSY".to_string()); rows.len()]),
        (PARENT_SERIAL_NO.to_string(), parents),
        (PART_NO.to_string(), parts),
        (SERIAL_NO.to_string(), serials),
        (SOURCE_FILE.to_string(), vec![Some("fixture.xlsx".to_string()); rows.len()]),
    ])
    .unwrap()
}
