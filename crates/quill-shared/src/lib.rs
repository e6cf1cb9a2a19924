//! # Quill Shared
//!
//! Request and response types exchanged with the blog server.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
