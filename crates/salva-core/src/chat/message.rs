//! Chat message types.
//!
//! A message is what the chat window shows: who said it, what was said and,
//! for character lines, the choice buttons offered underneath.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use super::action::OptionAction;

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Speaker {
    /// The shopper.
    User,
    /// Salva, the shop keeper.
    #[serde(rename = "salva")]
    #[strum(serialize = "salva")]
    Character,
    /// Internal-only entries. Never logged, never sent upstream.
    System,
}

/// One choice button under a character line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatOption {
    /// Text on the button.
    pub label: String,
    /// Text sent as the user's spoken line when the button is picked.
    pub value: String,
    /// Internal branch identifier. `None` means the line goes to the
    /// conversational service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Ending classification used when the session log is shipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ChatOption {
    /// Creates an option that routes to `action`.
    pub fn new(label: impl Into<String>, value: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            action: Some(action.into()),
            note: None,
        }
    }

    /// Creates an option without an action, as produced by typed input.
    pub fn freeform(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            label: text.clone(),
            value: text,
            action: None,
            note: None,
        }
    }

    /// Attaches an ending note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Parses the raw `action` string.
    pub fn parsed_action(&self) -> OptionAction {
        OptionAction::parse(self.action.as_deref())
    }
}

/// A single line in the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "role")]
    pub speaker: Speaker,
    #[serde(rename = "content")]
    pub text: String,
    /// Present only on character lines that offer choices.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<ChatOption>>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
            options: None,
        }
    }

    /// A character line with no choices; the UI switches to free-text input.
    pub fn character(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Character,
            text: text.into(),
            options: None,
        }
    }

    pub fn character_with_options(text: impl Into<String>, options: Vec<ChatOption>) -> Self {
        Self {
            speaker: Speaker::Character,
            text: text.into(),
            options: Some(options),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::System,
            text: text.into(),
            options: None,
        }
    }

    /// Choices offered by this message, empty when it has none.
    pub fn choices(&self) -> &[ChatOption] {
        self.options.as_deref().unwrap_or_default()
    }
}
