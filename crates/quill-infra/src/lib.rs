//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`.
//! This crate contains the blog storage and mail transports.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL storage via SeaORM
//! - `http-mail` - Mail delivery through an HTTP relay via reqwest

pub mod database;
pub mod mail;

// Re-exports - In-Memory
pub use database::{DatabaseConfig, InMemoryStore};
pub use mail::{InMemoryMailer, LogMailer};

// Re-exports - PostgreSQL
#[cfg(feature = "postgres")]
pub use database::{
    PostgresCommentRepository, PostgresPostRepository, PostgresTagRepository, connect,
};

#[cfg(feature = "http-mail")]
pub use mail::WebhookMailer;
#[cfg(test)]
mod tests;
