mod common;

use common::table;
use jha_browser::classify::{ColumnClassifier, SemanticColumns};
use jha_browser::filter::{
    ALL, FilterCriteria, Selection, distinct_values, filter_table, selector_options,
};
use jha_browser::table::Table;

fn sample() -> (Table, SemanticColumns) {
    let t = table(
        &["Division", "Task", "Risk Level", "Notes"],
        &[
            &[Some("A"), Some("Welding torch"), Some("High"), None],
            &[Some("B"), Some("Crane lift"), Some("High"), Some("weld nearby")],
            &[Some("A"), Some("Grinding"), Some("Low"), None],
            &[Some("B"), Some("Typing"), Some("Low"), None],
            &[Some("A"), Some("Sweeping"), None, Some("None")],
        ],
    );
    let columns = ColumnClassifier::default().classify(t.columns());
    (t, columns)
}

fn tasks(t: &Table) -> Vec<String> {
    t.column_values("Task").unwrap().map(|v| v.to_string()).collect()
}

// Test division equality keeps the matching rows in order
#[test]
fn test_division_filter_keeps_order() {
    let (t, columns) = sample();
    let criteria = FilterCriteria::new("Sheet1")
        .division(Selection::Only("A".to_string()))
        .risk(Selection::All);

    let filtered = filter_table(&t, &columns, &criteria);
    assert_eq!(tasks(&filtered), vec!["Welding torch", "Grinding", "Sweeping"]);
}

// Test the free-text search is case-insensitive and spans every column
#[test]
fn test_query_matches_any_column_case_insensitive() {
    let (t, columns) = sample();
    let filtered = filter_table(&t, &columns, &FilterCriteria::new("Sheet1").query("WELD"));
    assert_eq!(tasks(&filtered), vec!["Welding torch", "Crane lift"]);

    let none = filter_table(&t, &columns, &FilterCriteria::new("Sheet1").query("forklift"));
    assert!(none.is_empty());
}

// Test that empty cells never match a search
#[test]
fn test_query_ignores_empty_cells() {
    let (t, columns) = sample();
    // "none" only appears as literal text in the last row
    let filtered = filter_table(&t, &columns, &FilterCriteria::new("Sheet1").query("none"));
    assert_eq!(tasks(&filtered), vec!["Sweeping"]);
}

// Test the stages combine: division, then risk, then text
#[test]
fn test_stages_narrow_in_sequence() {
    let (t, columns) = sample();
    let criteria = FilterCriteria::new("Sheet1")
        .division(Selection::Only("B".to_string()))
        .risk(Selection::Only("High".to_string()))
        .query("lift");
    let filtered = filter_table(&t, &columns, &criteria);
    assert_eq!(tasks(&filtered), vec!["Crane lift"]);

    let criteria = criteria.query("typing");
    assert!(filter_table(&t, &columns, &criteria).is_empty());
}

// Test that an unmatched value gives zero rows, not an error
#[test]
fn test_unmatched_value_yields_no_rows() {
    let (t, columns) = sample();
    let criteria = FilterCriteria::new("Sheet1").division(Selection::Only("Z".to_string()));
    let filtered = filter_table(&t, &columns, &criteria);
    assert!(filtered.is_empty());
    assert_eq!(filtered.columns(), t.columns());
}

// Test that selections are ignored when their column is not bound
#[test]
fn test_unbound_columns_skip_their_filter() {
    let t = table(&["Task"], &[&[Some("Filing")], &[Some("Typing")]]);
    let columns = ColumnClassifier::default().classify(t.columns());
    let criteria = FilterCriteria::new("Office")
        .division(Selection::Only("A".to_string()))
        .risk(Selection::Only("High".to_string()));
    assert_eq!(filter_table(&t, &columns, &criteria), t);
}

// Test narrowing and idempotence over a spread of criteria
#[test]
fn test_narrowing_and_idempotence() {
    let (t, columns) = sample();
    let all_criteria = vec![
        FilterCriteria::new("Sheet1"),
        FilterCriteria::new("Sheet1").division(Selection::Only("A".to_string())),
        FilterCriteria::new("Sheet1").risk(Selection::Only("Low".to_string())),
        FilterCriteria::new("Sheet1").query("i"),
        FilterCriteria::new("Sheet1")
            .division(Selection::Only("A".to_string()))
            .risk(Selection::Only("Low".to_string()))
            .query("grind"),
    ];

    for criteria in &all_criteria {
        let once = filter_table(&t, &columns, criteria);
        assert!(once.len() <= t.len());
        assert_eq!(filter_table(&once, &columns, criteria), once);

        // filtering an already filtered table never adds rows
        let narrower = criteria.clone().query("e");
        assert!(filter_table(&t, &columns, &narrower).len() <= t.len());
        assert!(filter_table(&once, &columns, &narrower).len() <= once.len());
    }
}

// Test selector parsing and options
#[test]
fn test_selector_values() {
    assert_eq!(Selection::parse(None), Selection::All);
    assert_eq!(Selection::parse(Some("")), Selection::All);
    // only the exact label means no filter; "all" may be a real value
    assert_eq!(Selection::parse(Some("all")), Selection::Only("all".to_string()));
    assert_eq!(Selection::parse(Some("ALL")), Selection::Only("ALL".to_string()));
    assert_eq!(Selection::parse(Some(ALL)), Selection::All);
    assert_eq!(
        Selection::parse(Some("High")),
        Selection::Only("High".to_string())
    );

    let (t, _) = sample();
    assert_eq!(distinct_values(&t, "Risk Level"), vec!["High", "Low"]);
    assert_eq!(selector_options(&t, "Division"), vec!["All", "A", "B"]);
    assert!(distinct_values(&t, "Missing").is_empty());
}

// Test a lower-case "all" value is a real division, not the catch-all
#[test]
fn test_lowercase_all_is_a_value() {
    let t = table(
        &["Division", "Task"],
        &[
            &[Some("all"), Some("Sweeping")],
            &[Some("B"), Some("Typing")],
            &[Some("all"), Some("Mopping")],
        ],
    );
    let columns = ColumnClassifier::default().classify(t.columns());

    let criteria = FilterCriteria::new("Sheet1").division(Selection::parse(Some("all")));
    assert_eq!(tasks(&filter_table(&t, &columns, &criteria)), vec!["Sweeping", "Mopping"]);

    let criteria = FilterCriteria::new("Sheet1").division(Selection::parse(Some(ALL)));
    assert_eq!(filter_table(&t, &columns, &criteria).len(), 3);
}
