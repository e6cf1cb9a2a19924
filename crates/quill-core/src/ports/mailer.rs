//! Outbound mail port.

use async_trait::async_trait;
use serde::Serialize;

/// A plain-text message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Mail transport abstraction.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError>;
}

/// Mail delivery errors.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Transport failed: {0}")]
    Transport(String),

    #[error("Rejected by mail service: {0}")]
    Rejected(String),
}
