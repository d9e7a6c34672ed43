//! Application layer for Salva Shop.
//!
//! Wires the domain model to its external collaborators: the chat session
//! state store, the dialogue engine that advances it, the shelf highlight
//! timer and the background session logger.

pub mod bootstrap;
pub mod engine;
pub mod highlight;
pub mod logger;
pub mod session;

pub use bootstrap::ChatApp;
pub use engine::{Advance, DialogueEngine};
pub use highlight::HighlightController;
pub use logger::SessionLogger;
pub use session::ChatSession;
