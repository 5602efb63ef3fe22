//! Workbook round-trip tests: serialize with the pipeline, re-read with
//! calamine, compare placement.

use calamine::{Data, Reader, Xlsx};
use pretty_assertions::assert_eq;
use sqlreport::db::{Table, Value};
use sqlreport::error::ReportError;
use sqlreport::workbook::Workbook;
use std::io::Cursor;

fn food_table() -> Table {
    Table::new(
        vec!["id".to_string(), "name".to_string()],
        vec![
            vec![Value::Int(1), Value::String("A".to_string())],
            vec![Value::Int(2), Value::String("B".to_string())],
        ],
    )
}

fn reread(workbook: &Workbook) -> Xlsx<Cursor<Vec<u8>>> {
    let bytes = workbook.to_bytes().unwrap();
    Xlsx::new(Cursor::new(bytes)).unwrap()
}

#[test]
fn test_roundtrip_single_sheet_placement() {
    let workbook = Workbook::assemble(vec![food_table()], vec!["Food".to_string()]).unwrap();

    let mut reader = reread(&workbook);
    assert_eq!(reader.sheet_names(), vec!["Food".to_string()]);

    let range = reader.worksheet_range("Food").unwrap();
    let rows: Vec<_> = range.rows().collect();

    assert_eq!(rows.len(), 3);
    // Header row at row 0, column index = header position.
    assert_eq!(
        rows[0],
        &[
            Data::String("id".to_string()),
            Data::String("name".to_string())
        ]
    );
    // Data rows from row 1, in order. xlsx stores numbers as floats.
    assert_eq!(rows[1], &[Data::Float(1.0), Data::String("A".to_string())]);
    assert_eq!(rows[2], &[Data::Float(2.0), Data::String("B".to_string())]);
}

#[test]
fn test_roundtrip_preserves_sheet_order() {
    let tables = vec![
        food_table(),
        Table::new(vec!["total".to_string()], vec![vec![Value::Int(7)]]),
    ];
    let names = vec!["Food".to_string(), "Orders".to_string()];
    let workbook = Workbook::assemble(tables, names).unwrap();

    let mut reader = reread(&workbook);
    assert_eq!(
        reader.sheet_names(),
        vec!["Food".to_string(), "Orders".to_string()]
    );

    let orders = reader.worksheet_range("Orders").unwrap();
    let rows: Vec<_> = orders.rows().collect();
    assert_eq!(rows[0], &[Data::String("total".to_string())]);
    assert_eq!(rows[1], &[Data::Float(7.0)]);
}

#[test]
fn test_roundtrip_scalar_types() {
    let table = Table::new(
        vec![
            "flag".to_string(),
            "count".to_string(),
            "ratio".to_string(),
            "label".to_string(),
        ],
        vec![vec![
            Value::Bool(true),
            Value::Int(42),
            Value::Float(2.5),
            Value::String("x".to_string()),
        ]],
    );
    let workbook = Workbook::assemble(vec![table], vec!["Types".to_string()]).unwrap();

    let mut reader = reread(&workbook);
    let range = reader.worksheet_range("Types").unwrap();
    let rows: Vec<_> = range.rows().collect();

    assert_eq!(
        rows[1],
        &[
            Data::Bool(true),
            Data::Float(42.0),
            Data::Float(2.5),
            Data::String("x".to_string())
        ]
    );
}

#[test]
fn test_null_cells_read_back_empty() {
    let table = Table::new(
        vec!["id".to_string(), "note".to_string()],
        vec![
            vec![Value::Int(1), Value::Null],
            vec![Value::Int(2), Value::String("set".to_string())],
        ],
    );
    let workbook = Workbook::assemble(vec![table], vec!["Notes".to_string()]).unwrap();

    let mut reader = reread(&workbook);
    let range = reader.worksheet_range("Notes").unwrap();
    let rows: Vec<_> = range.rows().collect();

    assert_eq!(rows[1], &[Data::Float(1.0), Data::Empty]);
    assert_eq!(rows[2], &[Data::Float(2.0), Data::String("set".to_string())]);
}

#[test]
fn test_empty_result_still_gets_header_row() {
    let table = Table::new(vec!["id".to_string(), "name".to_string()], vec![]);
    let workbook = Workbook::assemble(vec![table], vec!["Empty".to_string()]).unwrap();

    let mut reader = reread(&workbook);
    let range = reader.worksheet_range("Empty").unwrap();
    let rows: Vec<_> = range.rows().collect();

    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0],
        &[
            Data::String("id".to_string()),
            Data::String("name".to_string())
        ]
    );
}

#[test]
fn test_serialize_is_idempotent() {
    let workbook = Workbook::assemble(vec![food_table()], vec!["Food".to_string()]).unwrap();

    // Serializing twice must yield equivalent content.
    for _ in 0..2 {
        let mut reader = reread(&workbook);
        let range = reader.worksheet_range("Food").unwrap();
        assert_eq!(range.rows().count(), 3);
    }
}

#[test]
fn test_count_mismatch_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.xlsx");

    // Two tables, one sheet name: the assembler must refuse before any
    // file exists.
    let result = Workbook::assemble(
        vec![food_table(), food_table()],
        vec!["Food".to_string()],
    );

    assert!(matches!(result, Err(ReportError::Config(_))));
    assert!(!path.exists());
}
