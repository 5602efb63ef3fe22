//! sqlreport binary entry point.

use sqlreport::batch::BatchRunner;
use sqlreport::cli::Cli;
use sqlreport::config::{DbConfig, MailConfig};
use sqlreport::error::Result;
use sqlreport::mail::ReportMailer;
use sqlreport::render::render_table;
use sqlreport::workbook::Workbook;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Logs go to stderr so stdout stays clean for rendered tables.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse_args();
    cli.validate()?;

    let db_config = match &cli.db_url {
        Some(url) => DbConfig::from_connection_string(url)?,
        None => DbConfig::load_from_file(&cli.db_config_path())?,
    };
    info!("Running batch against {}", db_config.display_string());

    let sql = cli.sql.as_deref().unwrap_or_default();
    let tables = BatchRunner::run(&db_config, sql).await?;

    for table in &tables {
        println!("{}", render_table(table));
    }

    // Without a spreadsheet target the rendered tables are the whole
    // report.
    let Some(workbook_path) = cli.workbook_path() else {
        return Ok(());
    };

    let workbook = Workbook::assemble(tables, cli.sheet_names())?;
    workbook.save(&workbook_path)?;

    let recipients = cli.recipients();
    if recipients.is_empty() {
        return Ok(());
    }

    let mail_config = MailConfig::load_from_file(&cli.mail_config_path())?;
    let mailer = ReportMailer::new(mail_config)?;
    let filename = cli.xlsx.as_deref().unwrap_or_default();
    let subject = cli.mail_subject.as_deref().unwrap_or_default();
    mailer.send(&recipients, subject, &cli.mail_body, &workbook, filename)?;

    Ok(())
}
