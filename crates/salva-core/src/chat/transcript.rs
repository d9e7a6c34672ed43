//! The ordered message list of the active session.

use serde::{Deserialize, Serialize};

use super::message::{ChatMessage, ChatOption, Speaker};

/// Greeting shown when a session starts or is reset.
pub const GREETING: &str = "こんにちは〜";

/// Role names understood by the conversational service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceRole {
    User,
    Bot,
}

/// A transcript line in the shape the conversational service expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceTurn {
    pub role: ServiceRole,
    pub content: String,
}

/// Ordered sequence of messages.
///
/// Transcripts are values: every change produces a new transcript via
/// [`Transcript::appended`], and the session swaps the whole thing in one
/// step so observers never see a half-applied update.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }

    /// The fixed greeting with its four top-level choices.
    pub fn initial() -> Self {
        Self::new(vec![ChatMessage::character_with_options(
            GREETING,
            vec![
                ChatOption::new(
                    "1. おすすめのコーヒーを聞きたい",
                    "おすすめのコーヒーは？",
                    "recommend",
                ),
                ChatOption::new(
                    "2. オリジナルブレンドを一緒に作りたい",
                    "オリジナルブレンドを作りたい",
                    "blend",
                ),
                ChatOption::new(
                    "3. その他のことについて聞きたい",
                    "ちょっと聞きたいことがあります",
                    "chat",
                ),
                ChatOption::new("4. ときめき…", "…", "dating_start"),
            ],
        )])
    }

    /// Returns a copy of this transcript with `message` at the end.
    pub fn appended(&self, message: ChatMessage) -> Self {
        let mut messages = Vec::with_capacity(self.messages.len() + 1);
        messages.extend(self.messages.iter().cloned());
        messages.push(message);
        Self { messages }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// True when this is exactly the greeting a fresh session starts with.
    pub fn is_initial(&self) -> bool {
        *self == Self::initial()
    }

    /// Maps the visible lines to the conversational service's role names.
    /// System entries are internal and dropped.
    pub fn to_service_history(&self) -> Vec<ServiceTurn> {
        self.messages
            .iter()
            .filter_map(|msg| {
                let role = match msg.speaker {
                    Speaker::User => ServiceRole::User,
                    Speaker::Character => ServiceRole::Bot,
                    Speaker::System => return None,
                };
                Some(ServiceTurn {
                    role,
                    content: msg.text.clone(),
                })
            })
            .collect()
    }

    /// User and character lines only, as shipped to the session log.
    pub fn logged_entries(&self) -> Vec<ChatMessage> {
        self.messages
            .iter()
            .filter(|msg| matches!(msg.speaker, Speaker::User | Speaker::Character))
            .cloned()
            .collect()
    }
}
