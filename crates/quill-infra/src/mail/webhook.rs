//! Webhook mail transport - hands the message to an HTTP mail relay as JSON.

use async_trait::async_trait;

use quill_core::ports::{MailError, Mailer, OutgoingEmail};

/// Posts each message as JSON to a relay endpoint.
///
/// Payload: `{"from", "to", "subject", "body"}`. Any non-2xx reply is a rejection.
pub struct WebhookMailer {
    url: String,
    client: reqwest::Client,
}

impl WebhookMailer {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Mailer for WebhookMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        let response = self
            .client
            .post(&self.url)
            .json(&email)
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!(%status, subject = %email.subject, "Mail relay rejected message");
            return Err(MailError::Rejected(format!("{status}: {detail}")));
        }

        tracing::debug!(to = ?email.to, "Mail handed to relay");
        Ok(())
    }
}
