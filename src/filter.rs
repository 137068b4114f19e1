//! Row filtering for the active sheet
//!
//! Filters run in a fixed order, each stage narrowing the output of the previous one:
//! division equality, risk equality, then a case-insensitive free-text search over every
//! column. An unmatched value yields an empty table rather than an error.

use crate::classify::SemanticColumns;
use crate::table::{CellValue, Table};
use log::debug;
use std::collections::BTreeSet;

/// Label offered by selectors for "no filter"
pub const ALL: &str = "All";

/// Selector value for the division and risk filters
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    /// Parses a selector value; missing, empty and exactly `All` mean [`Selection::All`]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None => Selection::All,
            Some(value) if value.is_empty() || value == ALL => Selection::All,
            Some(value) => Selection::Only(value.to_string()),
        }
    }
}

/// What the user selected for one interaction
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub sheet: String,
    pub division: Selection,
    pub risk: Selection,
    pub query: Option<String>,
}

impl FilterCriteria {
    pub fn new(sheet: impl Into<String>) -> Self {
        FilterCriteria {
            sheet: sheet.into(),
            ..Default::default()
        }
    }

    pub fn division(mut self, selection: Selection) -> Self {
        self.division = selection;
        self
    }

    pub fn risk(mut self, selection: Selection) -> Self {
        self.risk = selection;
        self
    }

    /// Sets the search text; an empty string clears it
    pub fn query(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.query = (!query.is_empty()).then_some(query);
        self
    }
}

/// Apply `criteria` to `table`, returning the matching rows in source order
///
/// # Examples
/// ```
/// use jha_browser::classify::ColumnClassifier;
/// use jha_browser::filter::{filter_table, FilterCriteria, Selection};
/// use jha_browser::table::Table;
///
/// let table = Table::new(
///     vec!["Division".to_string(), "Task".to_string()],
///     vec![
///         vec!["A".into(), "Welding".into()],
///         vec!["B".into(), "Lifting".into()],
///     ],
/// );
/// let columns = ColumnClassifier::default().classify(table.columns());
/// let criteria = FilterCriteria::new("Sheet1").division(Selection::Only("A".to_string()));
/// assert_eq!(filter_table(&table, &columns, &criteria).len(), 1);
/// ```
pub fn filter_table(table: &Table, columns: &SemanticColumns, criteria: &FilterCriteria) -> Table {
    let mut filtered = table.clone();

    if let (Some(column), Selection::Only(wanted)) = (&columns.division, &criteria.division) {
        keep_equal(&mut filtered, column, wanted);
    }
    if let (Some(column), Selection::Only(wanted)) = (&columns.risk, &criteria.risk) {
        keep_equal(&mut filtered, column, wanted);
    }
    if let Some(query) = &criteria.query {
        keep_containing(&mut filtered, query);
    }

    debug!(
        "Filtered sheet '{}': {} of {} row(s)",
        criteria.sheet,
        filtered.len(),
        table.len()
    );
    filtered
}

fn keep_equal(table: &mut Table, column: &str, wanted: &str) {
    let Some(idx) = table.column_index(column) else {
        return;
    };
    table.retain_rows(|row| row[idx].as_text().is_some_and(|text| text == wanted));
}

fn keep_containing(table: &mut Table, query: &str) {
    let needle = query.to_lowercase();
    table.retain_rows(|row| row.iter().any(|cell| contains_ignore_case(cell, &needle)));
}

fn contains_ignore_case(cell: &CellValue, needle: &str) -> bool {
    cell.as_text()
        .is_some_and(|text| text.to_lowercase().contains(needle))
}

/// Sorted, de-duplicated string forms of the non-empty values in `column`
pub fn distinct_values(table: &Table, column: &str) -> Vec<String> {
    let Some(values) = table.column_values(column) else {
        return Vec::new();
    };
    values
        .filter_map(CellValue::as_text)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Selector options for `column`: `All` followed by its distinct values
pub fn selector_options(table: &Table, column: &str) -> Vec<String> {
    std::iter::once(ALL.to_string())
        .chain(distinct_values(table, column))
        .collect()
}
