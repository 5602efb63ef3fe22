//! Command-line argument parsing.
//!
//! The binary mirrors the report pipeline: `--sql` always, `--xlsx` +
//! `--sheets` for a spreadsheet, `--mail-to` + `--mail-subject` for
//! delivery. Cross-argument rules live in [`Cli::validate`] so the error
//! messages stay in the pipeline's taxonomy.

use crate::config::{DbConfig, MailConfig};
use crate::error::{ReportError, Result};
use clap::Parser;
use std::path::PathBuf;

/// Generate a tabular report from SQL SELECT statements.
#[derive(Parser, Debug)]
#[command(name = "sqlreport")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// SQL statements to report on, separated by ';'
    #[arg(long, value_name = "SQL")]
    pub sql: Option<String>,

    /// Database config file (TOML)
    #[arg(long, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Database connection string (postgres://... or mysql://...); takes
    /// precedence over --db
    #[arg(long, value_name = "URL", env = "SQLREPORT_DB_URL")]
    pub db_url: Option<String>,

    /// Workbook file name to write (e.g. report.xlsx)
    #[arg(long, value_name = "FILENAME")]
    pub xlsx: Option<String>,

    /// Directory the workbook is saved into (default: current directory)
    #[arg(long, value_name = "DIR", default_value = "")]
    pub save_dir: PathBuf,

    /// Sheet names, separated by ','; one per SQL statement
    #[arg(long, value_name = "NAMES")]
    pub sheets: Option<String>,

    /// Mail config file (TOML)
    #[arg(long, value_name = "PATH")]
    pub mail: Option<PathBuf>,

    /// Recipient addresses, separated by ','
    #[arg(long, value_name = "ADDRS")]
    pub mail_to: Option<String>,

    /// Mail subject; required when --mail-to is given
    #[arg(long, value_name = "SUBJECT")]
    pub mail_subject: Option<String>,

    /// Mail body text
    #[arg(long, value_name = "TEXT", default_value = "")]
    pub mail_body: String,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Checks the cross-argument rules the pipeline depends on.
    pub fn validate(&self) -> Result<()> {
        if self.sql.as_deref().map_or(true, |s| s.trim().is_empty()) {
            return Err(ReportError::config(
                "at least one SQL statement is required (--sql)",
            ));
        }

        if self.xlsx.is_some() && self.sheets.is_none() {
            return Err(ReportError::config(
                "sheet names are required when writing a workbook (--sheets)",
            ));
        }

        if self.mail_to.is_some() {
            if self.xlsx.is_none() {
                return Err(ReportError::config(
                    "mail delivery requires a workbook to attach (--xlsx)",
                ));
            }
            if self.mail_subject.is_none() {
                return Err(ReportError::config(
                    "a subject is required when mailing a report (--mail-subject)",
                ));
            }
        }

        Ok(())
    }

    /// Returns the database config file path to use.
    pub fn db_config_path(&self) -> PathBuf {
        self.db.clone().unwrap_or_else(DbConfig::default_path)
    }

    /// Returns the mail config file path to use.
    pub fn mail_config_path(&self) -> PathBuf {
        self.mail.clone().unwrap_or_else(MailConfig::default_path)
    }

    /// Splits `--sheets` into the positional sheet assignment.
    ///
    /// Segments are trimmed but never dropped: the count has to line up
    /// with the statement count, so an accidental empty name should fail
    /// loudly later rather than silently shift the pairing.
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets
            .as_deref()
            .map(|names| names.split(',').map(|name| name.trim().to_string()).collect())
            .unwrap_or_default()
    }

    /// Splits `--mail-to` into recipient addresses, dropping empty
    /// segments.
    pub fn recipients(&self) -> Vec<String> {
        self.mail_to
            .as_deref()
            .map(|addrs| {
                addrs
                    .split(',')
                    .map(str::trim)
                    .filter(|addr| !addr.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the full path the workbook is written to, if one was
    /// requested.
    pub fn workbook_path(&self) -> Option<PathBuf> {
        self.xlsx
            .as_deref()
            .map(|filename| self.save_dir.join(filename))
    }
}
