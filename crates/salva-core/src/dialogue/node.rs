//! Dialogue node definitions.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::chat::{ChatMessage, ChatOption, OptionAction};

/// Key of a node in the dialogue table (`dating_1_confess`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Which scripted sub-flow a node belongs to.
///
/// This tag is the single source of truth for "are we inside the dating
/// narrative"; nothing inspects message text to find out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DialogueFlow {
    #[default]
    Dating,
}

/// One entry of the dialogue table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueNode {
    pub id: NodeId,
    #[serde(default)]
    pub flow: DialogueFlow,
    /// Character line shown when the node is entered.
    pub message: String,
    /// Choices offered under the line, in display order.
    #[serde(rename = "options")]
    pub next_options: Vec<ChatOption>,
}

impl DialogueNode {
    /// Terminal nodes offer exactly one option and it resets the session.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.next_options.as_slice(),
            [only] if only.parsed_action() == OptionAction::Reset
        )
    }

    /// Ending classification of a terminal node.
    pub fn ending_note(&self) -> Option<&str> {
        if self.is_terminal() {
            self.next_options[0].note.as_deref()
        } else {
            None
        }
    }

    /// The character message appended when this node is entered.
    pub fn to_message(&self) -> ChatMessage {
        ChatMessage::character_with_options(self.message.clone(), self.next_options.clone())
    }
}
