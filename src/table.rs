use serde::Serialize;
use std::fmt;

/// A single cell as read from the workbook
///
/// Values keep the typing of the source file. Dates and cell errors are carried as
/// text, and an empty cell is `Empty` (serialized as `null`).
#[derive(Clone, Debug, PartialEq, Serialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl CellValue {
    /// Returns `true` for cells that forward-fill treats as missing
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// String form used by filters and exports
    ///
    /// # Returns
    /// * `None` for empty cells, which never match a filter
    /// * `Some(String)` otherwise; integral floats drop their fraction (`3.0` -> `"3"`)
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Int(i) => Some(i.to_string()),
            CellValue::Float(f) => Some(format_float(*f)),
            CellValue::Bool(true) => Some("True".to_string()),
            CellValue::Bool(false) => Some("False".to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_text() {
            Some(text) => f.write_str(&text),
            None => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Empty)
    }
}

fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

/// Rectangular sheet data: ordered column names and rows aligned to them
#[derive(Clone, Debug, PartialEq, Default, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Builds a table, padding or cutting every row to the column count
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Empty);
                row
            })
            .collect();
        Table { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Values of one column, top to bottom
    pub fn column_values<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a CellValue> + use<'a>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Pairs a row's values with the column names, in column order
    pub fn row_pairs(&self, index: usize) -> Option<Vec<(&str, &CellValue)>> {
        let row = self.rows.get(index)?;
        Some(
            self.columns
                .iter()
                .map(String::as_str)
                .zip(row.iter())
                .collect(),
        )
    }

    /// Keeps the rows for which `keep` returns true, preserving order
    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(&[CellValue]) -> bool,
    {
        self.rows.retain(|row| keep(row));
    }

    /// Forward-fills a column: each blank cell takes the nearest non-blank value above it
    ///
    /// Blank cells before the first non-blank value stay blank. Returns `false` if the
    /// column does not exist.
    pub fn forward_fill(&mut self, column: &str) -> bool {
        let Some(idx) = self.column_index(column) else {
            return false;
        };

        let mut last: Option<CellValue> = None;
        for row in &mut self.rows {
            if row[idx].is_blank() {
                if let Some(value) = &last {
                    row[idx] = value.clone();
                }
            } else {
                last = Some(row[idx].clone());
            }
        }
        true
    }
}

/// One named sheet of a workbook
#[derive(Clone, Debug, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub table: Table,
}

/// All sheets of a workbook, in workbook order
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Workbook { sheets }
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    pub fn sheet(&self, name: &str) -> Option<&Table> {
        self.sheets.iter().find(|s| s.name == name).map(|s| &s.table)
    }

    pub fn first_sheet(&self) -> Option<&Sheet> {
        self.sheets.first()
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }
}
