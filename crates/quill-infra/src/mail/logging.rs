//! Mailer that only writes the message to the log - used in development.

use async_trait::async_trait;

use quill_core::ports::{MailError, Mailer, OutgoingEmail};

#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        tracing::info!(
            from = %email.from,
            to = ?email.to,
            subject = %email.subject,
            "Email (not delivered)\n{}",
            email.body
        );
        Ok(())
    }
}
