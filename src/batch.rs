//! Batch splitting, validation, and ordered execution.
//!
//! A raw SQL string becomes a report batch by splitting on the statement
//! separator. The whole batch is validated before anything touches the
//! database: one bad statement aborts the run with nothing executed. A
//! single connection then executes the statements in split order, and the
//! transaction commits once after the last one.

use crate::config::DbConfig;
use crate::db::{self, DatabaseClient, Table};
use crate::error::{ReportError, Result};
use crate::safety::is_read_only_query;
use tracing::{debug, info};

/// Delimiter separating independent statements in the raw input.
pub const STATEMENT_SEPARATOR: char = ';';

/// Splits raw SQL text into a batch of trimmed statements.
///
/// Segments that are empty after trimming (e.g. from a trailing separator)
/// are dropped; everything else is kept verbatim for validation.
pub fn split_statements(raw_sql: &str) -> Vec<String> {
    raw_sql
        .split(STATEMENT_SEPARATOR)
        .map(str::trim)
        .filter(|statement| !statement.is_empty())
        .map(str::to_string)
        .collect()
}

/// Validates every statement in the batch up front.
///
/// The first statement failing the read-only check aborts the run; an empty
/// batch is rejected the same way. Nothing executes unless the whole batch
/// passes.
pub fn validate_batch(batch: &[String]) -> Result<()> {
    if batch.is_empty() {
        return Err(ReportError::validation(
            "the batch contains no statements after splitting",
        ));
    }

    for statement in batch {
        if !is_read_only_query(statement) {
            return Err(ReportError::not_read_only(statement));
        }
    }

    Ok(())
}

/// Runs a report batch end to end: split, validate, connect, execute,
/// commit.
pub struct BatchRunner;

impl BatchRunner {
    /// Executes the raw batch against the configured database.
    ///
    /// Returns one table per statement, in split order, iff the whole run
    /// succeeds. Validation failures abort before a connection is opened.
    pub async fn run(config: &DbConfig, raw_sql: &str) -> Result<Vec<Table>> {
        let batch = split_statements(raw_sql);
        validate_batch(&batch)?;

        let client = db::connect(config).await?;
        Self::execute_batch(client, &batch).await
    }

    /// Like [`run`](Self::run), but against an already-open client.
    ///
    /// The validation gate still runs before any statement executes.
    pub async fn run_with_client(
        client: Box<dyn DatabaseClient>,
        raw_sql: &str,
    ) -> Result<Vec<Table>> {
        let batch = split_statements(raw_sql);
        validate_batch(&batch)?;
        Self::execute_batch(client, &batch).await
    }

    /// Executes a validated batch on one client, committing once at the
    /// end. The client is closed on every exit path.
    async fn execute_batch(
        mut client: Box<dyn DatabaseClient>,
        batch: &[String],
    ) -> Result<Vec<Table>> {
        let mut tables = Vec::with_capacity(batch.len());

        for statement in batch {
            match client.execute_query(statement).await {
                Ok(table) => {
                    debug!(
                        columns = table.column_count(),
                        rows = table.row_count(),
                        "statement materialized"
                    );
                    tables.push(table);
                }
                Err(e) => {
                    let _ = client.close().await;
                    return Err(e);
                }
            }
        }

        if let Err(e) = client.commit().await {
            let _ = client.close().await;
            return Err(e);
        }
        client.close().await?;

        info!(statements = batch.len(), "batch committed");
        Ok(tables)
    }
}
