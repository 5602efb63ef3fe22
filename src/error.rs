//! Error types for sqlreport.
//!
//! Defines the single error enum used throughout the report pipeline.

use thiserror::Error;

/// Main error type for report operations.
///
/// Every variant is fatal for the current run: nothing is retried, and each
/// one aborts the pipeline stage it occurred in.
#[derive(Error, Debug)]
pub enum ReportError {
    /// A submitted statement failed the read-only check, or the batch itself
    /// is unusable (e.g. empty after splitting).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The database connection could not be opened.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A statement failed during execution against an open connection.
    /// Carries the offending statement so the run can be diagnosed without
    /// re-executing it.
    #[error("Query error in `{statement}`: {message}")]
    Query { statement: String, message: String },

    /// Malformed or missing configuration, or mismatched positional inputs
    /// (e.g. sheet-name count vs. table count).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The workbook could not be serialized to bytes, or the serialized
    /// artifact could not be written out.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Mail authentication or submission failure.
    #[error("Delivery error: {0}")]
    Delivery(String),
}

impl ReportError {
    /// Creates a validation error with the given message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a validation error for a statement that failed the read-only
    /// check.
    pub fn not_read_only(statement: impl Into<String>) -> Self {
        Self::Validation(format!(
            "statement `{}` is not a read-only query; only SELECT statements may be executed",
            statement.into()
        ))
    }

    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error for the given statement.
    pub fn query(statement: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Query {
            statement: statement.into(),
            message: message.into(),
        }
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a serialization error with the given message.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Creates a delivery error with the given message.
    pub fn delivery(msg: impl Into<String>) -> Self {
        Self::Delivery(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Validation Error",
            Self::Connection(_) => "Connection Error",
            Self::Query { .. } => "Query Error",
            Self::Config(_) => "Configuration Error",
            Self::Serialization(_) => "Serialization Error",
            Self::Delivery(_) => "Delivery Error",
        }
    }
}

/// Result type alias using ReportError.
pub type Result<T> = std::result::Result<T, ReportError>;
