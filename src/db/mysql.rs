//! MySQL database client.
//!
//! Mirrors the PostgreSQL client: one exclusively-owned connection, one
//! transaction per batch, full materialization of each result set.

use crate::config::DbConfig;
use crate::db::{DatabaseClient, Row, Table, Value};
use crate::error::{ReportError, Result};
use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use sqlx::mysql::{MySqlConnection, MySqlRow};
use sqlx::{Column as SqlxColumn, Connection, Executor, Row as SqlxRow, TypeInfo};
use std::time::Instant;
use tracing::debug;

/// MySQL client holding one open connection with an open transaction.
#[derive(Debug)]
pub struct MySqlClient {
    conn: MySqlConnection,
}

impl MySqlClient {
    /// Opens a connection and starts the transaction the batch commits at
    /// the end.
    pub async fn connect(config: &DbConfig) -> Result<Self> {
        let conn_str = config.to_connection_string();

        let mut conn = MySqlConnection::connect(&conn_str)
            .await
            .map_err(|e| map_connection_error(e, config))?;

        sqlx::raw_sql("BEGIN")
            .execute(&mut conn)
            .await
            .map_err(|e| ReportError::connection(format!("Failed to open transaction: {e}")))?;

        debug!("Connected to {}", config.display_string());
        Ok(Self { conn })
    }

    async fn describe_headers(&mut self, sql: &str) -> Result<Vec<String>> {
        let describe = (&mut self.conn)
            .describe(sql)
            .await
            .map_err(|e| ReportError::query(sql, format_query_error(e)))?;

        Ok(describe
            .columns
            .iter()
            .map(|col| col.name().to_string())
            .collect())
    }
}

#[async_trait]
impl DatabaseClient for MySqlClient {
    async fn execute_query(&mut self, sql: &str) -> Result<Table> {
        let start = Instant::now();

        let result = sqlx::query(sql)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| ReportError::query(sql, format_query_error(e)))?;

        let headers: Vec<String> = if let Some(first_row) = result.first() {
            first_row
                .columns()
                .iter()
                .map(|col| col.name().to_string())
                .collect()
        } else {
            self.describe_headers(sql).await?
        };

        let rows: Vec<Row> = result.iter().map(convert_row).collect();

        debug!(
            rows = rows.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "statement executed"
        );

        Ok(Table::new(headers, rows))
    }

    async fn commit(&mut self) -> Result<()> {
        (&mut self.conn)
            .execute(sqlx::raw_sql("COMMIT"))
            .await
            .map_err(|e| ReportError::query("COMMIT", format_query_error(e)))?;
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.conn
            .close()
            .await
            .map_err(|e| ReportError::connection(format!("Failed to close connection: {e}")))
    }
}

/// Converts a sqlx MySqlRow to our Row type.
fn convert_row(row: &MySqlRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert_value(row, i, col.type_info().name()))
        .collect()
}

/// Converts a single column value from a MySqlRow to our Value type.
fn convert_value(row: &MySqlRow, index: usize, type_name: &str) -> Value {
    match type_name.to_uppercase().as_str() {
        "BOOLEAN" => row
            .try_get::<Option<bool>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bool)
            .unwrap_or(Value::Null),

        "TINYINT" => row
            .try_get::<Option<i8>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::Int(v as i64))
            .unwrap_or(Value::Null),

        "SMALLINT" => row
            .try_get::<Option<i16>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::Int(v as i64))
            .unwrap_or(Value::Null),

        "INT" | "MEDIUMINT" => row
            .try_get::<Option<i32>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::Int(v as i64))
            .unwrap_or(Value::Null),

        "BIGINT" => row
            .try_get::<Option<i64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Int)
            .unwrap_or(Value::Null),

        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "INT UNSIGNED" | "MEDIUMINT UNSIGNED" => row
            .try_get::<Option<u32>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::Int(v as i64))
            .unwrap_or(Value::Null),

        // An unsigned bigint can exceed i64; fall back to text when it does.
        "BIGINT UNSIGNED" => row
            .try_get::<Option<u64>, _>(index)
            .ok()
            .flatten()
            .map(|v| match i64::try_from(v) {
                Ok(i) => Value::Int(i),
                Err(_) => Value::String(v.to_string()),
            })
            .unwrap_or(Value::Null),

        "FLOAT" => row
            .try_get::<Option<f32>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::Float(v as f64))
            .unwrap_or(Value::Null),

        "DOUBLE" => row
            .try_get::<Option<f64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Float)
            .unwrap_or(Value::Null),

        "DECIMAL" => row
            .try_get::<Option<rust_decimal::Decimal>, _>(index)
            .ok()
            .flatten()
            .map(|d| match d.to_f64() {
                Some(f) => Value::Float(f),
                None => Value::String(d.to_string()),
            })
            .unwrap_or(Value::Null),

        "DATE" => row
            .try_get::<Option<chrono::NaiveDate>, _>(index)
            .ok()
            .flatten()
            .map(|d| Value::String(d.to_string()))
            .unwrap_or(Value::Null),

        "TIME" => row
            .try_get::<Option<chrono::NaiveTime>, _>(index)
            .ok()
            .flatten()
            .map(|t| Value::String(t.to_string()))
            .unwrap_or(Value::Null),

        "DATETIME" => row
            .try_get::<Option<chrono::NaiveDateTime>, _>(index)
            .ok()
            .flatten()
            .map(|ts| Value::String(ts.to_string()))
            .unwrap_or(Value::Null),

        "TIMESTAMP" => row
            .try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(index)
            .ok()
            .flatten()
            .map(|ts| Value::String(ts.to_rfc3339()))
            .unwrap_or(Value::Null),

        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => row
            .try_get::<Option<Vec<u8>>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bytes)
            .unwrap_or(Value::Null),

        _ => row
            .try_get::<Option<String>, _>(index)
            .ok()
            .flatten()
            .map(Value::String)
            .unwrap_or(Value::Null),
    }
}

/// Maps sqlx connection errors to user-friendly messages.
fn map_connection_error(error: sqlx::Error, config: &DbConfig) -> ReportError {
    let host = &config.host;
    let port = config.port;
    let user = &config.username;
    let database = &config.dbname;

    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        ReportError::connection(format!(
            "Cannot connect to {host}:{port}. Check that the server is running."
        ))
    } else if error_str.contains("access denied") || error_str.contains("authentication") {
        ReportError::connection(format!(
            "Authentication failed for user '{user}'. Check your credentials."
        ))
    } else if error_str.contains("unknown database") {
        ReportError::connection(format!("Database '{database}' does not exist."))
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        ReportError::connection(format!(
            "Connection to {host}:{port} timed out. The server may be overloaded or unreachable."
        ))
    } else {
        ReportError::connection(error.to_string())
    }
}

/// Formats a query error, including the server error number when present.
fn format_query_error(error: sqlx::Error) -> String {
    if let Some(db_error) = error.as_database_error() {
        match db_error.code() {
            Some(code) => format!("ERROR {}: {}", code, db_error.message()),
            None => format!("ERROR: {}", db_error.message()),
        }
    } else {
        error.to_string()
    }
}
