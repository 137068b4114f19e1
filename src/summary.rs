//! Sheet-wide aggregates behind the dashboard and the PDF chart
//!
//! These always take the whole (unfiltered) sheet: the dashboard shows the
//! distribution across the sheet while the data table shows the filtered detail.

use crate::classify::SemanticColumns;
use crate::graph::GraphType;
use crate::table::{CellValue, Table};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Bucket used for empty cells
pub const UNKNOWN: &str = "Unknown";

/// Rows shown of the hazard × control cross-tab
pub const CROSSTAB_DISPLAY_ROWS: usize = 200;

pub const DIVISION_CHART_TITLE: &str = "JHAs by Division";
pub const RISK_CHART_TITLE: &str = "JHAs by Risk Level";
pub const PLACEHOLDER_CHART_TITLE: &str = "No chart available";

/// Count of rows per distinct value of a column
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Rows per distinct value of `column`, empty cells counted as `Unknown`
///
/// Ordered by count descending; ties keep first-appearance order. Returns `None` if
/// the column does not exist.
pub fn value_counts(table: &Table, column: &str) -> Option<Vec<ValueCount>> {
    let values = table.column_values(column)?;

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<ValueCount> = Vec::new();
    for value in values {
        let key = label(value);
        match index.get(&key) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(key.clone(), counts.len());
                counts.push(ValueCount { value: key, count: 1 });
            }
        }
    }

    // stable sort keeps first-appearance order among equal counts
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    Some(counts)
}

fn label(value: &CellValue) -> String {
    value.as_text().unwrap_or_else(|| UNKNOWN.to_string())
}

/// Co-occurrence counts of hazard and control values
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CrossTab {
    pub hazard_column: String,
    pub control_column: String,
    /// Column headers, sorted
    pub controls: Vec<String>,
    /// One row per hazard value, sorted by hazard
    pub rows: Vec<CrossTabRow>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CrossTabRow {
    pub hazard: String,
    /// Aligned to `CrossTab::controls`
    pub counts: Vec<usize>,
}

impl CrossTab {
    /// Count of a (hazard, control) pair
    pub fn get(&self, hazard: &str, control: &str) -> usize {
        let Some(col) = self.controls.iter().position(|c| c == control) else {
            return 0;
        };
        self.rows
            .iter()
            .find(|row| row.hazard == hazard)
            .map_or(0, |row| row.counts[col])
    }

    /// Keeps at most `n` hazard rows
    pub fn truncated(&self, n: usize) -> CrossTab {
        CrossTab {
            hazard_column: self.hazard_column.clone(),
            control_column: self.control_column.clone(),
            controls: self.controls.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }
}

/// Cross-tabulate two columns, empty cells counted as `Unknown` in both dimensions
pub fn crosstab(table: &Table, hazard_column: &str, control_column: &str) -> Option<CrossTab> {
    let hazards = table.column_values(hazard_column)?;
    let controls = table.column_values(control_column)?;

    let mut pairs: BTreeMap<(String, String), usize> = BTreeMap::new();
    let mut control_labels: BTreeSet<String> = BTreeSet::new();
    for (hazard, control) in hazards.zip(controls) {
        let control = label(control);
        control_labels.insert(control.clone());
        *pairs.entry((label(hazard), control)).or_insert(0) += 1;
    }

    let controls: Vec<String> = control_labels.into_iter().collect();
    let mut rows: Vec<CrossTabRow> = Vec::new();
    for ((hazard, control), count) in pairs {
        if rows.last().is_none_or(|row| row.hazard != hazard) {
            rows.push(CrossTabRow {
                hazard,
                counts: vec![0; controls.len()],
            });
        }
        if let (Some(row), Some(col)) = (rows.last_mut(), controls.iter().position(|c| *c == control)) {
            row.counts[col] = count;
        }
    }

    Some(CrossTab {
        hazard_column: hazard_column.to_string(),
        control_column: control_column.to_string(),
        controls,
        rows,
    })
}

/// Everything the dashboard panel shows for one sheet
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Dashboard {
    pub divisions: Option<Vec<ValueCount>>,
    pub risks: Option<Vec<ValueCount>>,
    /// Cross-tab limited to [`CROSSTAB_DISPLAY_ROWS`] rows
    pub hazard_control: Option<CrossTab>,
    /// Hazard rows before truncation
    pub hazard_rows: usize,
}

impl Dashboard {
    /// Aggregates the whole sheet; a panel is `None` when its column is unbound
    pub fn build(table: &Table, columns: &SemanticColumns) -> Self {
        let divisions = columns
            .division
            .as_deref()
            .and_then(|c| value_counts(table, c));
        let risks = columns.risk.as_deref().and_then(|c| value_counts(table, c));
        let full = match (columns.hazard.as_deref(), columns.control.as_deref()) {
            (Some(hazard), Some(control)) => crosstab(table, hazard, control),
            _ => None,
        };

        Dashboard {
            divisions,
            risks,
            hazard_rows: full.as_ref().map_or(0, |ct| ct.rows.len()),
            hazard_control: full.map(|ct| ct.truncated(CROSSTAB_DISPLAY_ROWS)),
        }
    }
}

/// A chart ready to rasterize
#[derive(Clone, Debug, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub graph_type: GraphType,
    pub data: Vec<ValueCount>,
}

impl ChartSpec {
    pub fn division(data: Vec<ValueCount>) -> Self {
        ChartSpec {
            title: DIVISION_CHART_TITLE.to_string(),
            graph_type: GraphType::HorizontalBar,
            data,
        }
    }

    pub fn risk(data: Vec<ValueCount>) -> Self {
        ChartSpec {
            title: RISK_CHART_TITLE.to_string(),
            graph_type: GraphType::Pie,
            data,
        }
    }

    pub fn placeholder() -> Self {
        ChartSpec {
            title: PLACEHOLDER_CHART_TITLE.to_string(),
            graph_type: GraphType::Placeholder,
            data: Vec::new(),
        }
    }
}

/// Chart embedded in the PDF report: divisions, else risks, else the placeholder
pub fn report_chart(table: &Table, columns: &SemanticColumns) -> ChartSpec {
    if let Some(counts) = columns.division.as_deref().and_then(|c| value_counts(table, c)) {
        return ChartSpec::division(counts);
    }
    if let Some(counts) = columns.risk.as_deref().and_then(|c| value_counts(table, c)) {
        return ChartSpec::risk(counts);
    }
    ChartSpec::placeholder()
}
