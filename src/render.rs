//! Console rendering of result tables.
//!
//! Each executed statement's table is printed to stdout so a run without a
//! spreadsheet target still produces a readable report.

use crate::db::{Table, Value};
use comfy_table::{ContentArrangement, Table as DisplayTable};

/// Renders a result table as a bordered text table.
pub fn render_table(table: &Table) -> String {
    let mut display = DisplayTable::new();
    display.set_content_arrangement(ContentArrangement::Dynamic);
    display.set_header(table.headers.clone());

    for row in &table.rows {
        display.add_row(row.iter().map(Value::to_display_string));
    }

    display.to_string()
}
