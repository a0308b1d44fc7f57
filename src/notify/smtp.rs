//! SMTP notifier — emails each saved lead to the operator.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::{ExposeSecret, SecretString};

use crate::error::NotifyError;
use crate::flow::model::LeadRecord;
use crate::notify::Notifier;

/// Subject line of the operator report.
const REPORT_SUBJECT: &str = "New lead!";

/// Mailer configuration.
#[derive(Debug, Clone)]
pub struct MailerConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: SecretString,
    pub from_address: String,
    /// Operator address that receives the lead reports.
    pub notify_address: String,
}

impl MailerConfig {
    /// Build config from environment variables.
    /// Returns `None` if `EMAIL_SMTP_HOST` or `NOTIFY_EMAIL` is not set
    /// (notification disabled).
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("EMAIL_SMTP_HOST").ok()?;
        let notify_address = std::env::var("NOTIFY_EMAIL").ok()?;

        let smtp_port: u16 = std::env::var("EMAIL_SMTP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(587);

        let username = std::env::var("EMAIL_USERNAME").unwrap_or_default();
        let password = SecretString::from(std::env::var("EMAIL_PASSWORD").unwrap_or_default());
        let from_address = std::env::var("EMAIL_FROM_ADDRESS").unwrap_or_else(|_| username.clone());

        Some(Self {
            smtp_host,
            smtp_port,
            username,
            password,
            from_address,
            notify_address,
        })
    }
}

/// SMTP notifier — one pooled transport built at startup.
pub struct SmtpNotifier {
    transport: SmtpTransport,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpNotifier {
    /// Build the transport and parse both mail addresses up front, so
    /// a misconfigured mailer fails at startup rather than on the
    /// first lead.
    pub fn new(config: &MailerConfig) -> Result<Self, NotifyError> {
        let creds = Credentials::new(
            config.username.clone(),
            config.password.expose_secret().to_string(),
        );

        let transport = SmtpTransport::relay(&config.smtp_host)
            .map_err(|e| NotifyError::SendFailed(format!("SMTP relay error: {e}")))?
            .port(config.smtp_port)
            .credentials(creds)
            .build();

        let from = config
            .from_address
            .parse()
            .map_err(|e| NotifyError::InvalidAddress(format!("from address: {e}")))?;
        let to = config
            .notify_address
            .parse()
            .map_err(|e| NotifyError::InvalidAddress(format!("notify address: {e}")))?;

        Ok(Self {
            transport,
            from,
            to,
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, record: &LeadRecord) -> Result<(), NotifyError> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(REPORT_SUBJECT)
            .body(lead_report(record))
            .map_err(|e| NotifyError::BuildFailed(e.to_string()))?;

        let transport = self.transport.clone();
        let sent = tokio::task::spawn_blocking(move || transport.send(&email))
            .await
            .map_err(|e| NotifyError::SendFailed(format!("send task failed: {e}")))?;

        match sent {
            Ok(_) => {
                tracing::info!(to = %self.to, "Lead report sent");
                Ok(())
            }
            Err(e) => Err(NotifyError::SendFailed(e.to_string())),
        }
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Render the plain-text report body listing every captured field.
fn lead_report(record: &LeadRecord) -> String {
    format!(
        "A new lead has arrived:\n\n\
         Task: {}\n\
         Plan: {}\n\
         Budget: {}\n\
         Timeline: {}\n\
         Preferences: {}\n\
         Contact: {}\n\
         User contact: {}",
        record.task,
        record.plan,
        record.budget,
        record.timeline,
        record.tech_preferences,
        record.contact,
        record.user_contact
    )
}

// ── Tests ───────────────────────────────────────────────────────────
