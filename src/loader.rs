use crate::classify::{ColumnClassifier, ColumnRole};
use crate::error::{BrowserError, Result};
use crate::table::{CellValue, Sheet, Table, Workbook};
use calamine::{Data, Range, Reader, Sheets, open_workbook_auto, open_workbook_auto_from_rs};
use chrono::NaiveDateTime;
use log::{debug, info};
use std::collections::HashMap;
use std::fs;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

/// File name looked for first when discovering a workbook
pub const DEFAULT_WORKBOOK: &str = "JHA by Division.xlsx";

/// Text form of date and time cells
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Extensions accepted during discovery (compared case-insensitively)
pub const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Locate the workbook to open
///
/// Prefers `dir/default_name`. Otherwise takes the lexicographically first file in
/// `dir` with a spreadsheet extension, skipping Office lock files (`~$...`).
///
/// # Errors
/// * `BrowserError::NotFound` if no candidate exists
///
/// # Examples
/// ```no_run
/// use jha_browser::loader::{discover_workbook, DEFAULT_WORKBOOK};
///
/// match discover_workbook(".", DEFAULT_WORKBOOK) {
///     Ok(path) => println!("Using {}", path.display()),
///     Err(e) => eprintln!("{}", e),
/// }
/// ```
pub fn discover_workbook(dir: impl AsRef<Path>, default_name: &str) -> Result<PathBuf> {
    let dir = dir.as_ref();
    let not_found = || BrowserError::NotFound {
        dir: dir.to_path_buf(),
        default_name: default_name.to_string(),
    };

    let preferred = dir.join(default_name);
    if preferred.is_file() {
        return Ok(preferred);
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Err(not_found()),
    };

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_spreadsheet(path))
        .collect();
    candidates.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    candidates.into_iter().next().ok_or_else(not_found)
}

fn is_spreadsheet(path: &Path) -> bool {
    let lock_file = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with("~$"));
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    !lock_file
        && extension
            .as_deref()
            .is_some_and(|ext| SPREADSHEET_EXTENSIONS.contains(&ext))
}

/// Reads every sheet of a workbook into memory
///
/// Header names are trimmed, and the column the classifier binds to
/// [`ColumnRole::Division`] is forward-filled in each sheet.
#[derive(Clone, Debug, Default)]
pub struct WorkbookLoader {
    classifier: ColumnClassifier,
}

impl WorkbookLoader {
    pub fn new(classifier: ColumnClassifier) -> Self {
        WorkbookLoader { classifier }
    }

    pub fn classifier(&self) -> &ColumnClassifier {
        &self.classifier
    }

    /// Load a workbook from a file path
    ///
    /// # Examples
    /// ```no_run
    /// use jha_browser::loader::WorkbookLoader;
    ///
    /// let workbook = WorkbookLoader::default().load("JHA by Division.xlsx").unwrap();
    /// println!("{:?}", workbook.sheet_names());
    /// ```
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Workbook> {
        let path = path.as_ref();
        let mut sheets = open_workbook_auto(path)?;
        let workbook = self.read_sheets(&mut sheets)?;
        info!(
            "Loaded workbook '{}' with {} sheet(s)",
            path.display(),
            workbook.sheets().len()
        );
        Ok(workbook)
    }

    /// Load a workbook from an in-memory reader (format detected from content)
    pub fn load_from_reader<RS>(&self, reader: RS) -> Result<Workbook>
    where
        RS: Read + Seek + Clone,
    {
        let mut sheets = open_workbook_auto_from_rs(reader)?;
        self.read_sheets(&mut sheets)
    }

    fn read_sheets<RS: Read + Seek>(&self, sheets: &mut Sheets<RS>) -> Result<Workbook> {
        let mut loaded = Vec::new();
        for name in sheets.sheet_names() {
            let range = sheets.worksheet_range(&name)?;
            let mut table = table_from_range(&range);
            if let Some(column) = self.classifier.find(ColumnRole::Division, table.columns()) {
                table.forward_fill(&column);
            }
            debug!("Sheet '{}': {} row(s), {} column(s)", name, table.len(), table.columns().len());
            loaded.push(Sheet { name, table });
        }
        Ok(Workbook::new(loaded))
    }
}

/// Convert a calamine range to a table, using its first row as the header
pub fn table_from_range(range: &Range<Data>) -> Table {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Table::default();
    };

    let raw: Vec<String> = header
        .iter()
        .map(|cell| cell_value(cell).as_text().unwrap_or_default())
        .collect();
    let columns = normalize_headers(&raw);
    let body = rows
        .map(|row| row.iter().map(cell_value).collect())
        .collect();

    Table::new(columns, body)
}

/// Trim header names, name blank headers `Unnamed: <i>` and suffix repeats with `.1`, `.2`, ...
pub fn normalize_headers(raw: &[String]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut columns = Vec::with_capacity(raw.len());

    for (i, name) in raw.iter().enumerate() {
        let trimmed = name.trim();
        let base = if trimmed.is_empty() {
            format!("Unnamed: {}", i)
        } else {
            trimmed.to_string()
        };

        let mut suffix = seen.get(&base).copied().unwrap_or(0);
        let mut candidate = base.clone();
        while seen.contains_key(&candidate) {
            suffix += 1;
            candidate = format!("{}.{}", base, suffix);
        }
        if candidate != base {
            seen.insert(base, suffix);
        }
        seen.insert(candidate.clone(), 0);
        columns.push(candidate);
    }

    columns
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) => CellValue::Text(format_datetime(&datetime)),
            None => CellValue::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

fn format_datetime(datetime: &NaiveDateTime) -> String {
    datetime.format(DATETIME_FORMAT).to_string()
}
