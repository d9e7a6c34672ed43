//! Chat domain module.
//!
//! # Module Structure
//!
//! - `message`: Lines and choice buttons (`ChatMessage`, `ChatOption`, `Speaker`)
//! - `action`: Routing of an option's action id (`OptionAction`)
//! - `transcript`: The session's ordered message list (`Transcript`)
//! - `event`: Notifications published to rendering surfaces (`SessionEvent`)

mod action;
mod event;
mod message;
mod transcript;

// Re-export public API
pub use action::{OptionAction, RESET_ACTION, SCRIPTED_PREFIX};
pub use event::SessionEvent;
pub use message::{ChatMessage, ChatOption, Speaker};
pub use transcript::{GREETING, ServiceRole, ServiceTurn, Transcript};
