//! One user interaction: request parameters in, filtered view and exports out
//!
//! Nothing here is stored between interactions. Each call resolves the sheet,
//! classifies its columns and filters it again from the cached workbook.

use crate::classify::{ColumnClassifier, SemanticColumns};
use crate::downloader;
use crate::error::{BrowserError, Result};
use crate::filter::{FilterCriteria, Selection, filter_table, selector_options};
use crate::report;
use crate::summary::{Dashboard, report_chart};
use crate::table::{CellValue, Table, Workbook};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Message shown by the row detail panel when no row is left
pub const NO_ROWS_MESSAGE: &str = "No rows to show details for.";

/// Raw selector values as sent by the UI
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ViewQuery {
    /// Sheet name; the first sheet when absent
    pub sheet: Option<String>,
    pub division: Option<String>,
    pub risk: Option<String>,
    /// Free-text search
    pub q: Option<String>,
    /// 0-based row index for the detail panel
    pub row: Option<usize>,
}

impl ViewQuery {
    /// Resolve the parameters against a workbook
    ///
    /// # Errors
    /// * `BrowserError::SheetNotFound` for an unknown sheet or an empty workbook
    pub fn criteria(&self, workbook: &Workbook) -> Result<FilterCriteria> {
        let sheet = match &self.sheet {
            Some(name) if !name.is_empty() => {
                if workbook.sheet(name).is_none() {
                    return Err(BrowserError::SheetNotFound(name.clone()));
                }
                name.clone()
            }
            _ => workbook
                .first_sheet()
                .map(|s| s.name.clone())
                .ok_or_else(|| BrowserError::SheetNotFound(String::new()))?,
        };

        Ok(FilterCriteria::new(sheet)
            .division(Selection::parse(self.division.as_deref()))
            .risk(Selection::parse(self.risk.as_deref()))
            .query(self.q.clone().unwrap_or_default()))
    }
}

/// The active sheet together with its filtered rows
#[derive(Clone, Debug)]
pub struct ResolvedView<'a> {
    pub criteria: FilterCriteria,
    /// The whole sheet, for the dashboard
    pub table: &'a Table,
    pub columns: SemanticColumns,
    pub filtered: Table,
}

/// Select the sheet, classify its columns and apply the filters
pub fn resolve<'a>(
    workbook: &'a Workbook,
    classifier: &ColumnClassifier,
    query: &ViewQuery,
) -> Result<ResolvedView<'a>> {
    let criteria = query.criteria(workbook)?;
    let table = workbook
        .sheet(&criteria.sheet)
        .ok_or_else(|| BrowserError::SheetNotFound(criteria.sheet.clone()))?;
    let columns = classifier.classify(table.columns());
    let filtered = filter_table(table, &columns, &criteria);

    Ok(ResolvedView {
        criteria,
        table,
        columns,
        filtered,
    })
}

/// Payload of the data panel and the sidebar
#[derive(Clone, Debug, Serialize)]
pub struct SheetView {
    pub sheet: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
    pub total_rows: usize,
    pub filtered_rows: usize,
    pub semantic: SemanticColumns,
    /// `All` plus the distinct divisions; `None` when no division column is bound
    pub division_options: Option<Vec<String>>,
    pub risk_options: Option<Vec<String>>,
}

impl<'a> ResolvedView<'a> {
    pub fn sheet_view(&self) -> SheetView {
        SheetView {
            sheet: self.criteria.sheet.clone(),
            columns: self.filtered.columns().to_vec(),
            rows: self.filtered.rows().to_vec(),
            total_rows: self.table.len(),
            filtered_rows: self.filtered.len(),
            semantic: self.columns.clone(),
            division_options: self
                .columns
                .division
                .as_deref()
                .map(|c| selector_options(self.table, c)),
            risk_options: self
                .columns
                .risk
                .as_deref()
                .map(|c| selector_options(self.table, c)),
        }
    }

    /// Row detail for a 0-based index, clamped to the last row
    pub fn row_detail(&self, index: usize) -> RowDetail {
        if self.filtered.is_empty() {
            return RowDetail::Empty {
                message: NO_ROWS_MESSAGE.to_string(),
            };
        }

        let index = index.min(self.filtered.len() - 1);
        let values: Map<String, Value> = self
            .filtered
            .row_pairs(index)
            .unwrap_or_default()
            .into_iter()
            .map(|(column, cell)| (column.to_string(), cell_json(cell)))
            .collect();
        RowDetail::Row { index, values }
    }

    /// Dashboard over the whole sheet, not the filtered rows
    pub fn dashboard(&self) -> Dashboard {
        Dashboard::build(self.table, &self.columns)
    }

    pub fn csv(&self) -> Result<Vec<u8>> {
        downloader::to_csv(&self.filtered)
    }

    pub fn xlsx(&self) -> Result<Vec<u8>> {
        downloader::to_xlsx(&self.filtered)
    }

    /// PDF of the filtered rows with the sheet-wide report chart
    pub fn pdf(&self) -> Result<Vec<u8>> {
        let chart = report_chart(self.table, &self.columns);
        report::build_pdf(
            &report::report_title(&self.criteria.sheet),
            &chart,
            &self.filtered,
        )
    }
}

fn cell_json(cell: &CellValue) -> Value {
    serde_json::to_value(cell).unwrap_or(Value::Null)
}

/// Row detail panel contents
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RowDetail {
    Row { index: usize, values: Map<String, Value> },
    Empty { message: String },
}
