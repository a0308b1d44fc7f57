//! Operator notification — the report seam and its SMTP mailer.

pub mod smtp;

use async_trait::async_trait;

use crate::error::NotifyError;
use crate::flow::model::LeadRecord;

pub use smtp::{MailerConfig, SmtpNotifier};

/// The collaborator that reports a saved lead to the operator.
///
/// Invoked only after a successful save. Failures are logged by the
/// caller and never reach the respondent.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, record: &LeadRecord) -> Result<(), NotifyError>;
}
