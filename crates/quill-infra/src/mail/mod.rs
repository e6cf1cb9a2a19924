//! Mail transports - webhook delivery plus log and in-memory fallbacks.

mod logging;
mod memory;

pub use logging::LogMailer;
pub use memory::InMemoryMailer;

#[cfg(feature = "http-mail")]
mod webhook;
#[cfg(feature = "http-mail")]
pub use webhook::WebhookMailer;
