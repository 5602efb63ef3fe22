//! Batch execution integration tests against the mock client.

use pretty_assertions::assert_eq;
use sqlreport::batch::BatchRunner;
use sqlreport::db::{MockDatabaseClient, Table, Value};
use sqlreport::error::ReportError;

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
async fn test_one_table_per_statement_in_input_order() {
    let client = MockDatabaseClient::with_results(vec![
        restaurant_table(),
        Table::new(vec!["total".to_string()], vec![vec![Value::Int(7)]]),
    ]);
    let log = client.log();

    let tables = BatchRunner::run_with_client(
        Box::new(client),
        "select id, name from restaurant; select count(*) as total from orders",
    )
    .await
    .unwrap();

    assert_eq!(tables.len(), 2);
    assert_eq!(tables[0].headers, vec!["id", "name"]);
    assert_eq!(tables[1].headers, vec!["total"]);
    assert_eq!(
        log.executed(),
        vec![
            "select id, name from restaurant",
            "select count(*) as total from orders"
        ]
    );
    assert!(log.committed());
}

#[tokio::test]
async fn test_headers_match_row_width() {
    let client = MockDatabaseClient::with_results(vec![restaurant_table()]);

    let tables = BatchRunner::run_with_client(Box::new(client), "select id, name from restaurant")
        .await
        .unwrap();

    for table in &tables {
        for row in &table.rows {
            assert_eq!(row.len(), table.headers.len());
        }
    }
}

#[tokio::test]
async fn test_mutating_statement_aborts_before_any_execution() {
    let client = MockDatabaseClient::new();
    let log = client.log();

    // The probe after the invalid statement must never reach the client.
    let err = BatchRunner::run_with_client(
        Box::new(client),
        "select 1; delete from t; select 'probe'",
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ReportError::Validation(_)));
    assert!(err.to_string().contains("delete from t"));
    assert!(log.executed().is_empty());
    assert!(!log.committed());
}

#[tokio::test]
async fn test_trailing_separator_is_ignored() {
    let client = MockDatabaseClient::with_results(vec![restaurant_table()]);
    let log = client.log();

    let tables =
        BatchRunner::run_with_client(Box::new(client), "select id, name from restaurant;")
            .await
            .unwrap();

    assert_eq!(tables.len(), 1);
    assert_eq!(log.executed().len(), 1);
}
