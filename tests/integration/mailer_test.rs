//! Mail delivery tests against substitute transports.

use lettre::Message;
use sqlreport::config::MailConfig;
use sqlreport::db::{Table, Value};
use sqlreport::error::{ReportError, Result};
use sqlreport::mail::{MailTransport, ReportMailer};
use sqlreport::workbook::Workbook;
use std::sync::{Arc, Mutex};

/// Rejects every submission the way a failed SMTP login does.
struct AuthFailingTransport;

impl MailTransport for AuthFailingTransport {
    fn deliver(&self, _message: &Message) -> Result<()> {
        Err(ReportError::delivery(
            "535 5.7.8 authentication credentials invalid",
        ))
    }
}

/// Records every delivered message.
#[derive(Clone, Default)]
struct RecordingTransport {
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl MailTransport for RecordingTransport {
    fn deliver(&self, message: &Message) -> Result<()> {
        self.sent.lock().unwrap().push(message.formatted());
        Ok(())
    }
}

fn mail_config() -> MailConfig {
    MailConfig {
        smtp_server: "smtp.example.com:587".to_string(),
        account: "reports@example.com".to_string(),
        password: "secret".to_string(),
        sender: "reports@example.com".to_string(),
    }
}

fn report_workbook() -> Workbook {
    let table = Table::new(
        vec!["id".to_string(), "name".to_string()],
        vec![vec![Value::Int(1), Value::String("A".to_string())]],
    );
    Workbook::assemble(vec![table], vec!["Food".to_string()]).unwrap()
}

#[test]
fn test_auth_failure_surfaces_delivery_error_and_sends_nothing() {
    let mailer = ReportMailer::with_transport(mail_config(), Box::new(AuthFailingTransport));

    let err = mailer
        .send(
            &["a@example.com".to_string(), "b@example.com".to_string()],
            "Weekly report",
            "See attached.",
            &report_workbook(),
            "report.xlsx",
        )
        .unwrap_err();

    assert!(matches!(err, ReportError::Delivery(_)));
    assert!(err.to_string().contains("authentication"));
}

#[test]
fn test_delivery_carries_attachment_and_all_recipients() {
    let recording = RecordingTransport::default();
    let mailer = ReportMailer::with_transport(mail_config(), Box::new(recording.clone()));

    mailer
        .send(
            &["a@example.com".to_string(), "b@example.com".to_string()],
            "Weekly report",
            "See attached.",
            &report_workbook(),
            "report.xlsx",
        )
        .unwrap();

    let sent = recording.sent.lock().unwrap();
    assert_eq!(sent.len(), 1, "all recipients share one message");

    let raw = String::from_utf8_lossy(&sent[0]).to_string();
    assert!(raw.contains("Subject: Weekly report"));
    assert!(raw.contains("a@example.com"));
    assert!(raw.contains("b@example.com"));
    assert!(raw.contains("multipart/mixed"));
    assert!(raw.contains("report.xlsx"));
}

#[test]
fn test_workbook_serializes_identically_for_save_and_mail() {
    let workbook = report_workbook();
    let recording = RecordingTransport::default();
    let mailer = ReportMailer::with_transport(mail_config(), Box::new(recording.clone()));

    // Mailing must not consume or mutate the workbook.
    mailer
        .send(
            &["a@example.com".to_string()],
            "Weekly report",
            "",
            &workbook,
            "report.xlsx",
        )
        .unwrap();

    assert!(workbook.to_bytes().is_ok());
    assert_eq!(recording.sent.lock().unwrap().len(), 1);
}
