//! Database abstraction layer for the report pipeline.
//!
//! Provides a trait-based interface for database clients, allowing the
//! Postgres and MySQL backends (and the in-memory mock used in tests) to be
//! used interchangeably by the batch runner.

mod mock;
mod mysql;
mod postgres;
mod types;

pub use mock::{FailingDatabaseClient, MockDatabaseClient};
pub use mysql::MySqlClient;
pub use postgres::PostgresClient;
pub use types::{Row, Table, Value};

use crate::config::DbConfig;
use crate::error::Result;
use async_trait::async_trait;

/// Supported database backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    Postgres,
    MySql,
}

impl DatabaseBackend {
    /// Returns the backend as a string for display and persistence.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::MySql => "mysql",
        }
    }

    /// Parses a backend from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Some(Self::Postgres),
            "mysql" => Some(Self::MySql),
            _ => None,
        }
    }

    /// Returns the default port for this backend.
    pub fn default_port(&self) -> u16 {
        match self {
            Self::Postgres => 5432,
            Self::MySql => 3306,
        }
    }

    /// Returns the URL scheme for this backend.
    pub fn url_scheme(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::MySql => "mysql",
        }
    }
}

/// Opens a database client for the configured backend.
///
/// This is the central factory function for database connections. Each call
/// opens one fresh connection; clients are never pooled or reused across
/// runs.
pub async fn connect(config: &DbConfig) -> Result<Box<dyn DatabaseClient>> {
    match config.backend {
        DatabaseBackend::Postgres => {
            let client = PostgresClient::connect(config).await?;
            Ok(Box::new(client))
        }
        DatabaseBackend::MySql => {
            let client = MySqlClient::connect(config).await?;
            Ok(Box::new(client))
        }
    }
}

/// Interface the batch runner drives a database through.
///
/// A client wraps exactly one open connection with an open transaction.
/// Calls are sequential; the runner owns the client exclusively for the
/// duration of one batch.
#[async_trait]
pub trait DatabaseClient: Send {
    /// Executes one validated statement and materializes the full result
    /// set into a [`Table`].
    async fn execute_query(&mut self, sql: &str) -> Result<Table>;

    /// Commits the transaction opened at connect time.
    async fn commit(&mut self) -> Result<()>;

    /// Closes the connection.
    async fn close(self: Box<Self>) -> Result<()>;
}
