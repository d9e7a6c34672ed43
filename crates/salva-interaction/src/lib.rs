//! External collaborators of the chat core.
//!
//! Each collaborator is a trait so the application layer can be driven by
//! test doubles; the `Http*` types are the production implementations.
//!
//! - [`ConversationService`]: the remote conversational AI
//! - [`LogSink`]: the append-only session log
//! - [`ProductCatalog`]: the product list

pub mod catalog;
pub mod conversation;
mod http;
pub mod session_log;

pub use catalog::{FileProductCatalog, HttpProductCatalog, ProductCatalog};
pub use conversation::{ChatRequest, ConversationService, HttpConversationService};
pub use session_log::{HttpLogSink, LogPayload, LogSink};
