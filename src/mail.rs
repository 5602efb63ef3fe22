//! Mail packaging and delivery.
//!
//! Serializes a workbook to bytes, wraps it as the single attachment of a
//! multipart message, and submits the message over SMTP. Delivery performs
//! real network I/O with no idempotence guarantee; resending is the
//! caller's decision and may duplicate mail.

use crate::config::MailConfig;
use crate::error::{ReportError, Result};
use crate::workbook::Workbook;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::info;

/// MIME type of the serialized workbook attachment.
const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Transport seam between message construction and actual submission.
///
/// Production uses [`SmtpMailer`]; tests substitute failing or recording
/// transports.
pub trait MailTransport: Send + Sync {
    /// Submits one fully built message.
    fn deliver(&self, message: &Message) -> Result<()>;
}

/// SMTP transport that authenticates with the configured account over
/// STARTTLS.
pub struct SmtpMailer {
    transport: SmtpTransport,
}

impl SmtpMailer {
    /// Builds the transport from the mail configuration.
    pub fn new(config: &MailConfig) -> Result<Self> {
        let (host, port) = config.smtp_endpoint()?;

        let transport = SmtpTransport::starttls_relay(&host)
            .map_err(|e| ReportError::delivery(format!("Invalid SMTP endpoint `{host}`: {e}")))?
            .port(port)
            .credentials(Credentials::new(
                config.account.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self { transport })
    }
}

impl MailTransport for SmtpMailer {
    fn deliver(&self, message: &Message) -> Result<()> {
        self.transport
            .send(message)
            .map(|_| ())
            .map_err(|e| ReportError::delivery(e.to_string()))
    }
}

/// Packages a workbook as a mail attachment and delivers it.
pub struct ReportMailer {
    config: MailConfig,
    transport: Box<dyn MailTransport>,
}

impl ReportMailer {
    /// Creates a mailer that submits via SMTP per the given configuration.
    pub fn new(config: MailConfig) -> Result<Self> {
        let transport = SmtpMailer::new(&config)?;
        Ok(Self {
            config,
            transport: Box::new(transport),
        })
    }

    /// Creates a mailer with a caller-supplied transport.
    pub fn with_transport(config: MailConfig, transport: Box<dyn MailTransport>) -> Self {
        Self { config, transport }
    }

    /// Serializes the workbook and mails it to every recipient from the
    /// configured sender.
    ///
    /// The attachment carries `filename`. Serialization failure surfaces
    /// before any transport session is opened; authentication and
    /// submission failures surface as delivery errors and are not retried.
    pub fn send(
        &self,
        recipients: &[String],
        subject: &str,
        body: &str,
        workbook: &Workbook,
        filename: &str,
    ) -> Result<()> {
        if recipients.is_empty() {
            return Err(ReportError::config("at least one recipient is required"));
        }

        let payload = workbook.to_bytes()?;
        let message = build_message(
            &self.config.sender,
            recipients,
            subject,
            body,
            payload,
            filename,
        )?;

        self.transport.deliver(&message)?;

        info!(
            recipients = recipients.len(),
            attachment = filename,
            "report mailed"
        );
        Ok(())
    }
}

/// Builds the multipart message: a plain-text body part plus one binary
/// attachment part carrying the serialized workbook.
fn build_message(
    sender: &str,
    recipients: &[String],
    subject: &str,
    body: &str,
    payload: Vec<u8>,
    filename: &str,
) -> Result<Message> {
    let from: Mailbox = sender
        .parse()
        .map_err(|e| ReportError::config(format!("Invalid sender address `{sender}`: {e}")))?;

    let mut builder = Message::builder().from(from).subject(subject);
    for recipient in recipients {
        let to: Mailbox = recipient.parse().map_err(|e| {
            ReportError::config(format!("Invalid recipient address `{recipient}`: {e}"))
        })?;
        builder = builder.to(to);
    }

    let content_type = ContentType::parse(XLSX_MIME)
        .map_err(|e| ReportError::delivery(format!("Invalid attachment MIME type: {e}")))?;
    let attachment = Attachment::new(filename.to_string()).body(payload, content_type);

    builder
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(body.to_string()))
                .singlepart(attachment),
        )
        .map_err(|e| ReportError::delivery(format!("Failed to build message: {e}")))
}
