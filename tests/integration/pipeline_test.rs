//! End-to-end pipeline tests: batch → tables → workbook → file.

use calamine::{open_workbook, Data, Reader, Xlsx};
use pretty_assertions::assert_eq;
use sqlreport::batch::BatchRunner;
use sqlreport::db::{MockDatabaseClient, Table, Value};
use sqlreport::error::ReportError;
use sqlreport::workbook::Workbook;

fn restaurant_table() -> Table {
    Table::new(
        vec!["id".to_string(), "name".to_string()],
        vec![
            vec![Value::Int(1), Value::String("A".to_string())],
            vec![Value::Int(2), Value::String("B".to_string())],
        ],
    )
}

#[tokio::test]
async fn test_single_statement_to_food_sheet() {
    let client = MockDatabaseClient::with_results(vec![restaurant_table()]);

    let tables = BatchRunner::run_with_client(Box::new(client), "select id, name from restaurant")
        .await
        .unwrap();
    let workbook = Workbook::assemble(tables, vec!["Food".to_string()]).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.xlsx");
    workbook.save(&path).unwrap();

    let mut reader: Xlsx<_> = open_workbook(&path).unwrap();
    let range = reader.worksheet_range("Food").unwrap();
    let rows: Vec<_> = range.rows().collect();

    assert_eq!(rows.len(), 3);
    assert_eq!(
        rows[0],
        &[
            Data::String("id".to_string()),
            Data::String("name".to_string())
        ]
    );
    assert_eq!(rows[1], &[Data::Float(1.0), Data::String("A".to_string())]);
    assert_eq!(rows[2], &[Data::Float(2.0), Data::String("B".to_string())]);
}

#[tokio::test]
async fn test_sheet_count_mismatch_leaves_no_file() {
    let client = MockDatabaseClient::with_results(vec![
        restaurant_table(),
        Table::new(vec!["total".to_string()], vec![vec![Value::Int(7)]]),
    ]);

    let tables = BatchRunner::run_with_client(
        Box::new(client),
        "select id, name from restaurant; select count(*) as total from orders",
    )
    .await
    .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.xlsx");

    // Two tables, one sheet name supplied.
    let err = Workbook::assemble(tables, vec!["Food".to_string()]).unwrap_err();

    assert!(matches!(err, ReportError::Config(_)));
    assert!(!path.exists());
}

#[tokio::test]
async fn test_validation_failure_commits_nothing() {
    let client = MockDatabaseClient::new();
    let log = client.log();

    let err = BatchRunner::run_with_client(Box::new(client), "select 1; delete from t")
        .await
        .unwrap_err();

    assert!(matches!(err, ReportError::Validation(_)));
    assert!(err.to_string().contains("delete from t"));
    assert!(!log.committed());
}
