//! Read-only statement check.
//!
//! The batch is committed automatically, so every statement must be vetted
//! as a read-only query before anything executes. This is a shape check on
//! the statement text, not a SQL parser and not a security boundary: a
//! syntactically read-only statement can still smuggle side effects through
//! a function call, and the real defense is running the report under a
//! read-only database role.

use regex::Regex;
use std::sync::LazyLock;

/// Matches statements that start, after leading whitespace and
/// case-insensitively, with the `select` keyword.
///
/// A FROM clause is not required: `select 1` is a legitimate read-only
/// query.
static READ_ONLY_QUERY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*select\b").expect("hardcoded pattern compiles"));

/// Returns true if the statement passes the read-only shape check.
///
/// Empty and whitespace-only statements fail the check the same way a
/// non-SELECT statement does. The caller decides how to surface the failure.
pub fn is_read_only_query(sql: &str) -> bool {
    READ_ONLY_QUERY.is_match(sql)
}
