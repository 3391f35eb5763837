//! Log Mailer
//!
//! `MailSender` that records outgoing mail in the log instead of delivering
//! it. Stands in until a real transport is wired up.

use crate::domain::repository::MailSender;
use crate::error::MailError;

#[derive(Debug, Clone, Default)]
pub struct LogMailer;

impl MailSender for LogMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailError> {
        // Body carries one-shot tokens; only its size is logged
        tracing::info!(to, subject, body_len = html_body.len(), "Mail queued");
        Ok(())
    }
}
