//! In-memory outbox - keeps every sent message for later inspection.

use async_trait::async_trait;
use tokio::sync::RwLock;

use quill_core::ports::{MailError, Mailer, OutgoingEmail};

/// Collects outgoing mail instead of delivering it.
///
/// Set `fail_with` to simulate a broken transport.
#[derive(Default)]
pub struct InMemoryMailer {
    outbox: RwLock<Vec<OutgoingEmail>>,
    fail_with: Option<String>,
}

impl InMemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose every send fails with a transport error.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            outbox: RwLock::new(Vec::new()),
            fail_with: Some(reason.into()),
        }
    }

    /// Messages sent so far, oldest first.
    pub async fn sent(&self) -> Vec<OutgoingEmail> {
        self.outbox.read().await.clone()
    }
}

#[async_trait]
impl Mailer for InMemoryMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        if let Some(reason) = &self.fail_with {
            return Err(MailError::Transport(reason.clone()));
        }
        self.outbox.write().await.push(email);
        Ok(())
    }
}
