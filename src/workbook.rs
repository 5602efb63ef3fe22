//! Workbook assembly and serialization.
//!
//! Assembly pairs result tables with sheet names positionally and is a pure
//! function of its inputs. All disk I/O is deferred to a single
//! serialize-then-write step so a failure can never leave a truncated file
//! behind.

use crate::db::{Table, Value};
use crate::error::{ReportError, Result};
use rust_xlsxwriter::{Workbook as XlsxWorkbook, Worksheet};
use std::path::Path;
use tracing::info;

/// An in-memory multi-sheet workbook: ordered (sheet name, table) pairs.
///
/// Serialization is read-only and idempotent; the same workbook can be
/// saved to disk and mailed without rebuilding.
#[derive(Debug, Clone, PartialEq)]
pub struct Workbook {
    sheets: Vec<(String, Table)>,
}

impl Workbook {
    /// Pairs tables with sheet names positionally.
    ///
    /// The two sequences must have equal length; any mismatch (including
    /// zero names for N tables) is a configuration error and nothing is
    /// built.
    pub fn assemble(tables: Vec<Table>, sheet_names: Vec<String>) -> Result<Self> {
        if sheet_names.len() != tables.len() {
            return Err(ReportError::config(format!(
                "sheet name count ({}) does not match table count ({})",
                sheet_names.len(),
                tables.len()
            )));
        }

        Ok(Self {
            sheets: sheet_names.into_iter().zip(tables).collect(),
        })
    }

    /// The (sheet name, table) pairs in workbook order.
    pub fn sheets(&self) -> &[(String, Table)] {
        &self.sheets
    }

    /// Serializes the workbook to xlsx bytes, entirely in memory.
    ///
    /// Each sheet gets its table's header row at row 0 and data rows from
    /// row 1, cell by cell, column index matching cell position.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut xlsx = XlsxWorkbook::new();

        for (name, table) in &self.sheets {
            let sheet = xlsx.add_worksheet();
            sheet
                .set_name(name)
                .map_err(|e| ReportError::serialization(format!("Invalid sheet name: {e}")))?;

            for (col_idx, header) in table.headers.iter().enumerate() {
                sheet
                    .write_string(0, column_index(col_idx)?, header)
                    .map_err(|e| ReportError::serialization(e.to_string()))?;
            }

            for (row_idx, row) in table.rows.iter().enumerate() {
                let row_num = row_index(row_idx)? + 1;
                for (col_idx, value) in row.iter().enumerate() {
                    write_cell(sheet, row_num, column_index(col_idx)?, value)?;
                }
            }
        }

        xlsx.save_to_buffer()
            .map_err(|e| ReportError::serialization(e.to_string()))
    }

    /// Serializes the workbook and writes it to `path` in one step.
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;

        std::fs::write(path, bytes).map_err(|e| {
            ReportError::serialization(format!("Failed to write {}: {e}", path.display()))
        })?;

        info!(sheets = self.sheets.len(), path = %path.display(), "workbook saved");
        Ok(())
    }
}

/// Writes one cell using the closest native xlsx type; NULL leaves the cell
/// blank, binary data is stringified.
fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, value: &Value) -> Result<()> {
    let result = match value {
        Value::Null => return Ok(()),
        Value::Bool(b) => sheet.write_boolean(row, col, *b),
        Value::Int(i) => sheet.write_number(row, col, *i as f64),
        Value::Float(f) => sheet.write_number(row, col, *f),
        Value::String(s) => sheet.write_string(row, col, s),
        Value::Bytes(b) => sheet.write_string(row, col, format!("<{} bytes>", b.len())),
    };

    result
        .map(|_| ())
        .map_err(|e| ReportError::serialization(e.to_string()))
}

fn column_index(idx: usize) -> Result<u16> {
    u16::try_from(idx)
        .map_err(|_| ReportError::serialization(format!("column index {idx} out of xlsx range")))
}

fn row_index(idx: usize) -> Result<u32> {
    u32::try_from(idx)
        .map_err(|_| ReportError::serialization(format!("row index {idx} out of xlsx range")))
}
