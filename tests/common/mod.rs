#![allow(dead_code)]

use jha_browser::table::{CellValue, Table};
use rust_xlsxwriter::Workbook;
use std::path::Path;

/// A sheet for a fixture workbook: name, header, rows (`None` = blank cell)
pub struct FixtureSheet<'a> {
    pub name: &'a str,
    pub header: Vec<&'a str>,
    pub rows: Vec<Vec<Option<&'a str>>>,
}

// Helper to write a workbook; values that parse as numbers are written as numbers
pub fn write_workbook(path: &Path, sheets: &[FixtureSheet]) {
    let mut workbook = Workbook::new();
    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet.name).unwrap();
        for (c, name) in sheet.header.iter().enumerate() {
            worksheet.write_string(0, c as u16, *name).unwrap();
        }
        for (r, row) in sheet.rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                let Some(value) = value else { continue };
                let (row, col) = ((r + 1) as u32, c as u16);
                match value.parse::<f64>() {
                    Ok(number) => {
                        worksheet.write_number(row, col, number).unwrap();
                    }
                    Err(_) => {
                        worksheet.write_string(row, col, *value).unwrap();
                    }
                }
            }
        }
    }
    workbook.save(path).unwrap();
}

// Standard two-sheet JHA workbook
pub fn jha_sheets() -> Vec<FixtureSheet<'static>> {
    vec![
        FixtureSheet {
            name: "Field Work",
            header: vec![" Division ", "Task", "Hazard", "Risk Level", "Controls", "Severity"],
            rows: vec![
                vec![Some("Welding"), Some("Welding torch setup"), Some("Burns"), Some("High"), Some("Gloves"), Some("3")],
                vec![None, Some("Grinding"), Some("Sparks"), Some("Medium"), Some("Face shield"), Some("2")],
                vec![Some("Rigging"), Some("Crane lift"), Some("Falling load"), Some("High"), Some("Exclusion zone"), Some("4")],
                vec![None, Some("Sling inspection"), None, Some("Low"), Some("Checklist"), Some("1.5")],
                vec![None, Some("Tag lines"), Some("Falling load"), None, None, Some("2")],
            ],
        },
        FixtureSheet {
            name: "Office",
            header: vec!["Task", "Notes"],
            rows: vec![
                vec![Some("Filing"), Some("Paper cuts")],
                vec![Some("Typing"), None],
            ],
        },
    ]
}

/// Builds a table from string cells (`None` = empty)
pub fn table(header: &[&str], rows: &[&[Option<&str>]]) -> Table {
    Table::new(
        header.iter().map(|s| s.to_string()).collect(),
        rows.iter()
            .map(|row| row.iter().map(|v| CellValue::from(*v)).collect())
            .collect(),
    )
}

pub fn texts(values: &[Option<&str>]) -> Vec<Option<String>> {
    values.iter().map(|v| v.map(str::to_string)).collect()
}
