//! Mock database clients for testing.
//!
//! `MockDatabaseClient` replays scripted results and records everything the
//! batch runner does to it, so tests can assert that validation failures
//! execute nothing and that commits happen exactly once.
//! `FailingDatabaseClient` fails a chosen statement to exercise the abort
//! path.

use super::{DatabaseClient, Table};
use crate::error::{ReportError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Shared, externally observable record of what a mock client was asked to
/// do.
#[derive(Debug, Default)]
pub struct MockLog {
    executed: Mutex<Vec<String>>,
    committed: AtomicBool,
    closed: AtomicBool,
}

impl MockLog {
    /// Statements executed so far, in order.
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().expect("mock log lock").clone()
    }

    /// True once the client committed.
    pub fn committed(&self) -> bool {
        self.committed.load(Ordering::SeqCst)
    }

    /// True once the client was closed.
    pub fn closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// A mock client that returns predefined tables, one per executed
/// statement, in order.
pub struct MockDatabaseClient {
    results: VecDeque<Table>,
    log: Arc<MockLog>,
}

impl MockDatabaseClient {
    /// Creates a mock that answers every statement with an empty table.
    pub fn new() -> Self {
        Self::with_results(Vec::new())
    }

    /// Creates a mock that answers the first N statements with the given
    /// tables and any further statements with empty tables.
    pub fn with_results(results: Vec<Table>) -> Self {
        Self {
            results: results.into(),
            log: Arc::new(MockLog::default()),
        }
    }

    /// Returns a handle to the client's log, valid after the client has
    /// been consumed by the runner.
    pub fn log(&self) -> Arc<MockLog> {
        Arc::clone(&self.log)
    }
}

impl Default for MockDatabaseClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    async fn execute_query(&mut self, sql: &str) -> Result<Table> {
        self.log
            .executed
            .lock()
            .expect("mock log lock")
            .push(sql.to_string());
        Ok(self.results.pop_front().unwrap_or_default())
    }

    async fn commit(&mut self) -> Result<()> {
        self.log.committed.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.log.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// A mock client that fails the statement at a given index (0-based) and
/// succeeds before it.
pub struct FailingDatabaseClient {
    fail_at: usize,
    seen: usize,
    log: Arc<MockLog>,
}

impl FailingDatabaseClient {
    /// Fails the `fail_at`-th executed statement.
    pub fn new(fail_at: usize) -> Self {
        Self {
            fail_at,
            seen: 0,
            log: Arc::new(MockLog::default()),
        }
    }

    /// Returns a handle to the client's log.
    pub fn log(&self) -> Arc<MockLog> {
        Arc::clone(&self.log)
    }
}

#[async_trait]
impl DatabaseClient for FailingDatabaseClient {
    async fn execute_query(&mut self, sql: &str) -> Result<Table> {
        let index = self.seen;
        self.seen += 1;

        if index == self.fail_at {
            return Err(ReportError::query(sql, "simulated execution failure"));
        }

        self.log
            .executed
            .lock()
            .expect("mock log lock")
            .push(sql.to_string());
        Ok(Table::default())
    }

    async fn commit(&mut self) -> Result<()> {
        self.log.committed.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.log.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
