use super::*;
use crate::report::TableOutcome;
use fc_core::{Column, ColumnType};
use fc_db::{CellValue, DuckDbBackend};

fn widgets() -> Table {
    Table::new("widgets")
        .with_column(Column::new("name", ColumnType::String))
        .with_column(Column::new("size", ColumnType::Int))
        .with_relation(
            Table::new("widget_tags").with_column(Column::new("tag", ColumnType::String)),
        )
}

async fn setup(sql: &str) -> DuckDbBackend {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE widgets (name VARCHAR, size INT);
         CREATE TABLE widget_tags (tag VARCHAR);",
    )
    .await
    .unwrap();
    if !sql.is_empty() {
        db.execute_batch(sql).await.unwrap();
    }
    db
}

async fn run(db: &DuckDbBackend, table: &Table, skip_ignore_in_test: bool) -> TableReport {
    let logger = CaseLogger::new("verify");
    let ctx = VerifyContext {
        db,
        logger: &logger,
        skip_ignore_in_test,
    };
    NonEmptyColumns.verify(table, &ctx).await
}

#[tokio::test]
async fn test_populated_tree_passes() {
    let db = setup(
        "INSERT INTO widgets VALUES ('bolt', 3), ('nut', NULL);
         INSERT INTO widget_tags VALUES ('red');",
    )
    .await;
    let report = run(&db, &widgets(), false).await;

    assert!(report.passed());
    assert_eq!(report.outcome, TableOutcome::Passed);
    assert_eq!(report.row_count, 2);
    assert_eq!(report.children.len(), 1);
    assert_eq!(report.children[0].path, "widgets/widget_tags");
    assert_eq!(report.children[0].outcome, TableOutcome::Passed);
}

#[tokio::test]
async fn test_zero_rows_fails_without_recursion() {
    let db = setup("INSERT INTO widget_tags VALUES ('red');").await;
    let report = run(&db, &widgets(), false).await;

    assert_eq!(
        report.outcome,
        TableOutcome::Failed {
            message: "expected to have at least 1 entry at table widgets got zero".to_string()
        }
    );
    assert!(report.children.is_empty());
}

#[tokio::test]
async fn test_nil_column_fails_and_still_recurses() {
    let db = setup(
        "INSERT INTO widgets VALUES (NULL, NULL), (NULL, NULL);
         INSERT INTO widget_tags VALUES ('red');",
    )
    .await;
    let report = run(&db, &widgets(), false).await;

    assert_eq!(
        report.outcome,
        TableOutcome::Failed {
            message: "found nil column in table widgets. columns=name,size".to_string()
        }
    );
    assert_eq!(report.nil_columns, vec!["name", "size"]);
    assert_eq!(report.children.len(), 1);
    assert!(report.children[0].passed());
}

#[tokio::test]
async fn test_empty_child_fails() {
    let db = setup("INSERT INTO widgets VALUES ('bolt', 1);").await;
    let report = run(&db, &widgets(), false).await;

    assert_eq!(report.outcome, TableOutcome::Passed);
    assert!(!report.passed());
    assert!(matches!(
        report.children[0].outcome,
        TableOutcome::Failed { ref message } if message.contains("widget_tags got zero")
    ));
}

#[tokio::test]
async fn test_ignored_column_exempt_unless_overridden() {
    let table = Table::new("widgets")
        .with_column(Column::new("name", ColumnType::String))
        .with_column(Column::new("size", ColumnType::Int).ignored_in_tests());
    let db = setup("INSERT INTO widgets VALUES ('bolt', NULL);").await;

    assert!(run(&db, &table, false).await.passed());

    let report = run(&db, &table, true).await;
    assert_eq!(report.nil_columns, vec!["size"]);
}

#[tokio::test]
async fn test_ignored_table_skipped_with_relations() {
    let table = Table::new("widgets")
        .ignored_in_tests()
        .with_column(Column::new("name", ColumnType::String))
        .with_relation(
            Table::new("widget_tags").with_column(Column::new("tag", ColumnType::String)),
        );
    let db = setup("").await;

    let report = run(&db, &table, false).await;
    assert!(matches!(report.outcome, TableOutcome::Skipped { .. }));
    assert!(report.children.is_empty());
    assert!(report.passed());

    let report = run(&db, &table, true).await;
    assert!(matches!(report.outcome, TableOutcome::Failed { .. }));
}

#[tokio::test]
async fn test_missing_table_is_error() {
    let db = DuckDbBackend::in_memory().unwrap();
    let report = run(&db, &widgets(), false).await;
    assert!(matches!(report.outcome, TableOutcome::Error { .. }));
    assert!(report.children.is_empty());
}

#[tokio::test]
async fn test_skip_is_logged() {
    let table = Table::new("widgets").ignored_in_tests();
    let db = DuckDbBackend::in_memory().unwrap();
    let logger = CaseLogger::new("verify");
    let ctx = VerifyContext {
        db: &db,
        logger: &logger,
        skip_ignore_in_test: false,
    };
    NonEmptyColumns.verify(&table, &ctx).await;

    let entries = logger.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(
        entries[0].message,
        "table widgets marked as IgnoreInTest. Skipping..."
    );
}

#[test]
fn test_find_nil_columns_declared_order() {
    let table = Table::new("t")
        .with_column(Column::new("zeta", ColumnType::String))
        .with_column(Column::new("alpha", ColumnType::String))
        .with_column(Column::new("tags", ColumnType::StringArray));

    let mut row = Row::new();
    row.insert("zeta".to_string(), CellValue::Null);
    row.insert("tags".to_string(), CellValue::Nested(vec![]));

    // alpha is absent from the row, which counts as null
    assert_eq!(find_nil_columns(&table, &[row], false), vec!["zeta", "alpha"]);
}

#[test]
fn test_find_nil_columns_any_row_counts() {
    let table = Table::new("t").with_column(Column::new("a", ColumnType::Int));

    let mut null_row = Row::new();
    null_row.insert("a".to_string(), CellValue::Null);
    let mut value_row = Row::new();
    value_row.insert("a".to_string(), CellValue::int(1));

    assert!(find_nil_columns(&table, &[null_row, value_row], false).is_empty());
}
