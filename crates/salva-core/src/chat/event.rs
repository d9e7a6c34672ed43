use serde::{Deserialize, Serialize};

use super::message::ChatMessage;

/// Changes published by a chat session to whatever renders it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A line was added to the end of the transcript.
    MessageAppended { message: ChatMessage },
    /// The transcript was replaced by the greeting.
    TranscriptReset {
        #[serde(default)]
        note: Option<String>,
    },
    /// The typing indicator turned on or off.
    AwaitingChanged { awaiting: bool },
    /// A shelf highlight started (`Some`) or expired (`None`).
    HighlightChanged { product_id: Option<u32> },
}
