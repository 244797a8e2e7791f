use futures::future::BoxFuture;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

use crate::config::SmtpConfig;
use crate::models::contact_models::ContactSubmission;
use crate::models::language::Language;

const COMPANY_SIGNATURE: &str = "HENQ Technologies";

#[derive(Error, Debug)]
pub enum MailError {
    #[error("Invalid email address {0}: {1}")]
    Address(String, String),
    #[error("Failed to build email message: {0}")]
    Build(String),
    #[error("Failed to create SMTP relay: {0}")]
    Relay(String),
    #[error("SMTP send failed: {0}")]
    Send(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Outbound mail transport. Returns a boxed future so both notifications can be
/// polled together and the trait stays object safe.
pub trait Mailer: Send + Sync {
    fn send(&self, email: OutgoingEmail) -> BoxFuture<'_, Result<(), MailError>>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let from = config
            .username
            .parse::<Mailbox>()
            .map_err(|e| MailError::Address(config.username.clone(), e.to_string()))?;
        let creds = Credentials::new(config.username.clone(), config.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.server)
            .map_err(|e| MailError::Relay(e.to_string()))?
            .port(config.port)
            .credentials(creds)
            .timeout(Some(config.timeout))
            .build();
        tracing::info!("SMTP Configuration - Server: {}, Port: {}", config.server, config.port);
        Ok(Self { transport, from })
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, email: OutgoingEmail) -> BoxFuture<'_, Result<(), MailError>> {
        Box::pin(async move {
            let to = email
                .to
                .parse::<Mailbox>()
                .map_err(|e| MailError::Address(email.to.clone(), e.to_string()))?;
            let message = Message::builder()
                .from(self.from.clone())
                .to(to)
                .subject(email.subject)
                .header(ContentType::TEXT_HTML)
                .body(email.html)
                .map_err(|e| MailError::Build(e.to_string()))?;
            self.transport
                .send(message)
                .await
                .map_err(|e| MailError::Send(e.to_string()))?;
            Ok(())
        })
    }
}

/// Stand-in transport for development without SMTP credentials.
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, email: OutgoingEmail) -> BoxFuture<'_, Result<(), MailError>> {
        Box::pin(async move {
            tracing::info!(to = %email.to, subject = %email.subject, "Email not sent (no SMTP configured)");
            Ok(())
        })
    }
}

fn html_lines(text: &str) -> String {
    text.replace('\n', "<br>")
}

pub fn compose_company_email(submission: &ContactSubmission, recipient: &str) -> OutgoingEmail {
    let sent_at = submission.timestamp.format("%-d.%-m.%Y, %H:%M:%S");
    OutgoingEmail {
        to: recipient.to_string(),
        subject: format!("Neue Kontaktanfrage von {}", submission.name),
        html: format!(
            "<h2>Neue Kontaktanfrage</h2>\n\
             <p><strong>Name:</strong> {name}</p>\n\
             <p><strong>E-Mail:</strong> {email}</p>\n\
             <p><strong>Sprache:</strong> {language}</p>\n\
             <p><strong>Newsletter:</strong> {newsletter}</p>\n\
             <p><strong>Nachricht:</strong></p>\n\
             <p>{message}</p>\n\
             <hr>\n\
             <p><small>Gesendet am: {sent_at}</small></p>",
            name = submission.name,
            email = submission.email,
            language = submission.language.code(),
            newsletter = if submission.newsletter { "Ja" } else { "Nein" },
            message = html_lines(&submission.message),
        ),
    }
}

pub fn compose_confirmation_email(submission: &ContactSubmission) -> OutgoingEmail {
    let message = html_lines(&submission.message);
    let (subject, html) = match submission.language {
        Language::En => (
            format!("Thank you for your inquiry - {COMPANY_SIGNATURE}"),
            format!(
                "<h2>Thank you for your inquiry!</h2>\n\
                 <p>Dear {name},</p>\n\
                 <p>We have received your message and will get back to you as soon as possible.</p>\n\
                 <p><strong>Your message:</strong></p>\n\
                 <p>{message}</p>\n\
                 <hr>\n\
                 <p>Best regards,<br>{COMPANY_SIGNATURE} GbR Team</p>\n\
                 <p><small>This is an automated confirmation email.</small></p>",
                name = submission.name,
            ),
        ),
        Language::De => (
            format!("Vielen Dank für Ihre Anfrage - {COMPANY_SIGNATURE}"),
            format!(
                "<h2>Vielen Dank für Ihre Anfrage!</h2>\n\
                 <p>Liebe/r {name},</p>\n\
                 <p>Wir haben Ihre Nachricht erhalten und werden uns schnellstmöglich bei Ihnen melden.</p>\n\
                 <p><strong>Ihre Nachricht:</strong></p>\n\
                 <p>{message}</p>\n\
                 <hr>\n\
                 <p>Mit freundlichen Grüßen,<br>{COMPANY_SIGNATURE} GbR Team</p>\n\
                 <p><small>Dies ist eine automatische Bestätigungsmail.</small></p>",
                name = submission.name,
            ),
        ),
    };
    OutgoingEmail {
        to: submission.email.clone(),
        subject,
        html,
    }
}

/// Sends the business notification and the submitter's confirmation concurrently.
/// Each failure is logged on its own; the first one is returned so the caller can
/// log the overall outcome. Nothing here retries.
pub async fn send_contact_notifications(
    mailer: &dyn Mailer,
    recipient: &str,
    submission: &ContactSubmission,
    contact_id: &str,
) -> Result<(), MailError> {
    let company_email = compose_company_email(submission, recipient);
    let confirmation_email = compose_confirmation_email(submission);

    let (company, confirmation) =
        tokio::join!(mailer.send(company_email), mailer.send(confirmation_email));

    if let Err(e) = &company {
        tracing::error!(id = %contact_id, error = %e, "Failed to send company notification email");
    }
    if let Err(e) = &confirmation {
        tracing::error!(id = %contact_id, error = %e, "Failed to send confirmation email");
    }
    company.and(confirmation)
}
