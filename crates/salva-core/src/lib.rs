//! Domain layer for Salva Shop.
//!
//! Holds the chat data model, the scripted dialogue table and its static
//! validation, the product keyword table used for shelf highlights, the
//! product/shelf model and configuration. Nothing in this crate performs
//! network I/O.

pub mod chat;
pub mod config;
pub mod dialogue;
pub mod error;
pub mod highlight;
pub mod product;

// Re-export common error type
pub use error::{Result, SalvaError};
