use crate::error::{BrowserError, Result};
use crate::table::{CellValue, Table};
use log::info;

/// Name of the single worksheet in the XLSX export
pub const EXPORT_SHEET_NAME: &str = "Filtered";

pub const CSV_FILE_NAME: &str = "jha_filtered.csv";
pub const XLSX_FILE_NAME: &str = "jha_filtered.xlsx";

/// Convert a table to CSV bytes
///
/// UTF-8, comma separated, one header row with the column names and no index column.
/// Empty cells become empty fields; quoting is handled by the `csv` writer.
///
/// # Examples
/// ```
/// use jha_browser::downloader::to_csv;
/// use jha_browser::table::Table;
///
/// let table = Table::new(vec!["Task".to_string()], vec![vec!["Cut, weld".into()]]);
/// let csv = to_csv(&table).unwrap();
/// assert_eq!(String::from_utf8(csv).unwrap(), "Task\n\"Cut, weld\"\n");
/// ```
pub fn to_csv(table: &Table) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|cell| cell.as_text().unwrap_or_default()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| BrowserError::Io(e.into_error()))?;
    info!("CSV export: {} row(s), {} bytes", table.len(), bytes.len());
    Ok(bytes)
}

/// Convert a table to XLSX bytes
///
/// One worksheet named `Filtered`: the header row, then the rows. Numbers and booleans
/// keep their type, empty cells are left unwritten.
///
/// # Examples
/// ```
/// use jha_browser::downloader::to_xlsx;
/// use jha_browser::table::Table;
///
/// let table = Table::new(vec!["Task".to_string()], vec![vec!["Lift".into()]]);
/// let xlsx = to_xlsx(&table).unwrap();
/// assert!(xlsx.starts_with(b"PK"));
/// ```
pub fn to_xlsx(table: &Table) -> Result<Vec<u8>> {
    use rust_xlsxwriter::Workbook;

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(EXPORT_SHEET_NAME)?;

    for (c, name) in table.columns().iter().enumerate() {
        worksheet.write_string(0, c as u16, name)?;
    }

    for (r, row) in table.rows().iter().enumerate() {
        let xlsx_row = (r + 1) as u32;
        for (c, cell) in row.iter().enumerate() {
            let col = c as u16;
            match cell {
                CellValue::Empty => {}
                CellValue::Text(s) => {
                    worksheet.write_string(xlsx_row, col, s)?;
                }
                CellValue::Int(i) => {
                    worksheet.write_number(xlsx_row, col, *i as f64)?;
                }
                CellValue::Float(f) => {
                    worksheet.write_number(xlsx_row, col, *f)?;
                }
                CellValue::Bool(b) => {
                    worksheet.write_boolean(xlsx_row, col, *b)?;
                }
            }
        }
    }

    let buffer = workbook.save_to_buffer()?;
    info!("XLSX export: {} row(s), {} bytes", table.len(), buffer.len());
    Ok(buffer)
}
