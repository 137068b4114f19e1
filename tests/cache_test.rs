mod common;

use common::{FixtureSheet, jha_sheets, write_workbook};
use jha_browser::cache::WorkbookCache;
use jha_browser::classify::{ColumnClassifier, ColumnRole, ColumnRule};
use jha_browser::loader::WorkbookLoader;
use jha_browser::table::CellValue;
use jha_browser::view::{ViewQuery, resolve};
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

// Test that the second request is served without reading the file again
#[test]
fn test_repeated_get_reuses_loaded_workbook() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("jha.xlsx");
    write_workbook(&path, &jha_sheets());

    let cache = WorkbookCache::default();
    let first = cache.get(&path).unwrap();

    // the file is gone, so a second read would fail
    fs::remove_file(&path).unwrap();
    let second = cache.get(&path).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(*first, *second);
}

// Test explicit invalidation forces a reload
#[test]
fn test_invalidate_forces_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("jha.xlsx");
    write_workbook(&path, &jha_sheets());

    let cache = WorkbookCache::default();
    cache.get(&path).unwrap();
    assert!(cache.contains(&path));

    fs::remove_file(&path).unwrap();
    assert!(cache.invalidate(&path));
    assert!(!cache.invalidate(&path));
    assert!(cache.get(&path).is_err());
}

// Test that entries are keyed by path
#[test]
fn test_entries_are_keyed_by_path() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.xlsx");
    let b = dir.path().join("b.xlsx");
    write_workbook(&a, &jha_sheets());
    write_workbook(&b, &jha_sheets()[1..]);

    let cache = WorkbookCache::default();
    assert_eq!(cache.get(&a).unwrap().sheet_names().len(), 2);
    assert_eq!(cache.get(&b).unwrap().sheet_names(), vec!["Office"]);

    cache.clear();
    assert!(!cache.contains(&a));
    assert!(!cache.contains(&b));
}

fn crews_sheet() -> Vec<FixtureSheet<'static>> {
    vec![FixtureSheet {
        name: "Crews",
        header: vec!["Dept", "Task", "Division notes", "Risk Level"],
        rows: vec![
            vec![Some("Yard"), Some("Lift"), Some("x"), Some("High")],
            vec![None, Some("Rig"), None, Some("Low")],
            vec![Some("Shop"), Some("Weld"), Some("y"), Some("High")],
            vec![None, Some("Grind"), None, Some("Low")],
        ],
    }]
}

fn column_text(values: impl Iterator<Item = impl ToString>) -> Vec<String> {
    values.map(|v| v.to_string()).collect()
}

// Test a custom division rule drives forward-fill and the division filter
#[test]
fn test_custom_division_rule() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("crews.xlsx");
    write_workbook(&path, &crews_sheet());

    let classifier = ColumnClassifier::default()
        .prepend(ColumnRule::custom(ColumnRole::Division, |c| c == "Dept"));
    let cache = WorkbookCache::new(WorkbookLoader::new(classifier));
    let workbook = cache.get(&path).unwrap();
    let table = workbook.sheet("Crews").unwrap();

    assert_eq!(
        column_text(table.column_values("Dept").unwrap()),
        vec!["Yard", "Yard", "Shop", "Shop"]
    );
    // the keyword column lost the division role, so it keeps its blanks
    let notes: Vec<&CellValue> = table.column_values("Division notes").unwrap().collect();
    assert_eq!(notes[1], &CellValue::Empty);

    let query = ViewQuery {
        division: Some("Shop".to_string()),
        ..Default::default()
    };
    let view = resolve(&workbook, cache.loader().classifier(), &query).unwrap();
    assert_eq!(view.columns.division.as_deref(), Some("Dept"));
    assert_eq!(
        column_text(view.filtered.column_values("Task").unwrap()),
        vec!["Weld", "Grind"]
    );
}

// Test a classifier built from its own rule list binds only those roles
#[test]
fn test_classifier_with_own_rules() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("crews.xlsx");
    write_workbook(&path, &crews_sheet());

    let rule = ColumnRule::keyword(ColumnRole::Division, "dept");
    assert_eq!(rule.role(), ColumnRole::Division);
    let cache = WorkbookCache::new(WorkbookLoader::new(ColumnClassifier::with_rules(vec![rule])));
    let workbook = cache.get(&path).unwrap();

    let view = resolve(&workbook, cache.loader().classifier(), &ViewQuery::default()).unwrap();
    assert_eq!(view.columns.division.as_deref(), Some("Dept"));
    assert_eq!(view.columns.risk, None);
    assert_eq!(view.sheet_view().risk_options, None);
}
