//! # Quill Core
//!
//! The domain layer of the Quill blog.
//! Entities, ports and the query rules behind listing, search and
//! recommendations live here, with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod forms;
pub mod pagination;
pub mod ports;
pub mod search;
pub mod service;
pub mod similar;

pub use error::DomainError;
pub use service::BlogService;
