mod common;

use common::{jha_sheets, write_workbook};
use jha_browser::classify::ColumnClassifier;
use jha_browser::error::BrowserError;
use jha_browser::filter::Selection;
use jha_browser::loader::WorkbookLoader;
use jha_browser::summary::ValueCount;
use jha_browser::table::Workbook;
use jha_browser::view::{NO_ROWS_MESSAGE, RowDetail, ViewQuery, resolve};
use serde_json::json;
use tempfile::tempdir;

fn workbook() -> Workbook {
    let dir = tempdir().unwrap();
    let path = dir.path().join("jha.xlsx");
    write_workbook(&path, &jha_sheets());
    WorkbookLoader::default().load(&path).unwrap()
}

fn query(sheet: &str) -> ViewQuery {
    ViewQuery {
        sheet: Some(sheet.to_string()),
        ..Default::default()
    }
}

// Test the request parameters become filter criteria
#[test]
fn test_query_to_criteria() {
    let wb = workbook();

    let criteria = ViewQuery::default().criteria(&wb).unwrap();
    assert_eq!(criteria.sheet, "Field Work");
    assert_eq!(criteria.division, Selection::All);
    assert_eq!(criteria.query, None);

    let q = ViewQuery {
        sheet: Some("Office".to_string()),
        division: Some("All".to_string()),
        risk: Some("High".to_string()),
        q: Some(String::new()),
        row: None,
    };
    let criteria = q.criteria(&wb).unwrap();
    assert_eq!(criteria.sheet, "Office");
    assert_eq!(criteria.risk, Selection::Only("High".to_string()));
    assert_eq!(criteria.query, None);

    match query("Nope").criteria(&wb) {
        Err(BrowserError::SheetNotFound(name)) => assert_eq!(name, "Nope"),
        other => panic!("expected SheetNotFound, got {:?}", other),
    }
}

// Test the sheet view: counts and selector options
#[test]
fn test_sheet_view() {
    let wb = workbook();
    let classifier = ColumnClassifier::default();
    let q = ViewQuery {
        division: Some("Rigging".to_string()),
        ..query("Field Work")
    };

    let view = resolve(&wb, &classifier, &q).unwrap().sheet_view();
    assert_eq!(view.total_rows, 5);
    assert_eq!(view.filtered_rows, 3);
    assert_eq!(view.rows.len(), 3);
    assert_eq!(view.semantic.risk.as_deref(), Some("Risk Level"));
    assert_eq!(
        view.division_options,
        Some(vec![
            "All".to_string(),
            "Rigging".to_string(),
            "Welding".to_string()
        ])
    );

    let office = resolve(&wb, &classifier, &query("Office")).unwrap().sheet_view();
    assert_eq!(office.division_options, None);
    assert_eq!(office.risk_options, None);
    assert_eq!(office.filtered_rows, 2);
}

// Test row detail: ordered pairs, clamped index, explicit empty state
#[test]
fn test_row_detail() {
    let wb = workbook();
    let classifier = ColumnClassifier::default();
    let q = ViewQuery {
        q: Some("crane".to_string()),
        ..query("Field Work")
    };
    let view = resolve(&wb, &classifier, &q).unwrap();

    match view.row_detail(7) {
        RowDetail::Row { index, values } => {
            assert_eq!(index, 0);
            let keys: Vec<&str> = values.keys().map(String::as_str).collect();
            assert_eq!(
                keys,
                vec!["Division", "Task", "Hazard", "Risk Level", "Controls", "Severity"]
            );
            assert_eq!(values["Task"], json!("Crane lift"));
            assert_eq!(values["Severity"], json!(4.0));
        }
        other => panic!("expected a row, got {:?}", other),
    }

    let q = ViewQuery {
        q: Some("no such task".to_string()),
        ..query("Field Work")
    };
    let empty = resolve(&wb, &classifier, &q).unwrap();
    assert_eq!(
        empty.row_detail(0),
        RowDetail::Empty {
            message: NO_ROWS_MESSAGE.to_string()
        }
    );
    assert_eq!(
        serde_json::to_value(empty.row_detail(0)).unwrap()["status"],
        json!("empty")
    );
}

// Test the dashboard reflects the whole sheet, not the filtered rows
#[test]
fn test_dashboard_ignores_filters() {
    let wb = workbook();
    let classifier = ColumnClassifier::default();
    let q = ViewQuery {
        division: Some("Welding".to_string()),
        risk: Some("High".to_string()),
        ..query("Field Work")
    };

    let view = resolve(&wb, &classifier, &q).unwrap();
    assert_eq!(view.filtered.len(), 1);

    let dashboard = view.dashboard();
    assert_eq!(
        dashboard.divisions,
        Some(vec![
            ValueCount {
                value: "Rigging".to_string(),
                count: 3
            },
            ValueCount {
                value: "Welding".to_string(),
                count: 2
            },
        ])
    );
    let risks = dashboard.risks.unwrap();
    assert_eq!(risks.iter().map(|r| r.count).sum::<usize>(), 5);
    assert!(risks.iter().any(|r| r.value == "Unknown" && r.count == 1));
    assert_eq!(dashboard.hazard_control.unwrap().get("Falling load", "Exclusion zone"), 1);
}

// Test the exports carry the filtered rows only
#[test]
fn test_exports_use_filtered_rows() {
    let wb = workbook();
    let classifier = ColumnClassifier::default();
    let q = ViewQuery {
        q: Some("weld".to_string()),
        ..query("Field Work")
    };
    let view = resolve(&wb, &classifier, &q).unwrap();

    let csv = String::from_utf8(view.csv().unwrap()).unwrap();
    assert_eq!(csv.lines().count(), 1 + view.filtered.len());
    assert!(csv.contains("Welding torch setup"));
    assert!(!csv.contains("Crane lift"));

    assert!(view.xlsx().unwrap().starts_with(b"PK"));
    assert!(view.pdf().unwrap().starts_with(b"%PDF"));
}
