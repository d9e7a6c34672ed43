//! The dialogue engine.
//!
//! Every option the user picks, and every line they type, goes through
//! [`DialogueEngine::advance`]. Scripted options are resolved from the
//! dialogue table, reset options end the session, and everything else is
//! relayed to the conversational service.

use std::sync::Arc;
use std::time::Duration;

use salva_core::chat::{ChatMessage, ChatOption, OptionAction};
use salva_core::dialogue::{DialogueTable, NodeId};
use salva_core::highlight::KeywordTable;
use salva_core::{Result, SalvaError};
use salva_interaction::{ChatRequest, ConversationService};

use crate::highlight::HighlightController;
use crate::logger::SessionLogger;
use crate::session::ChatSession;

/// Shown when the conversational service fails.
pub const APOLOGY: &str = "すみません、今ちょっと調子が悪くて…もう一度話しかけてくれる？";
/// Shown when the conversational service answers with nothing.
pub const MISHEARD: &str = "すみません、うまく聞き取れませんでした。";
/// Log note of a reset option that carries none.
pub const RESET_NOTE: &str = "Reset Action";
/// Log note of the "start over" button.
pub const MANUAL_RESET_NOTE: &str = "Manual Reset";

/// Default pause before a scripted line appears.
pub const DEFAULT_TYPING_DELAY: Duration = Duration::from_millis(600);

/// What a call to [`DialogueEngine::advance`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Another turn is in flight; nothing changed.
    Busy,
    /// Blank input; nothing changed.
    Ignored,
    /// The conversational service answered.
    Replied { message: ChatMessage },
    /// The conversational service failed and the apology was shown.
    Fallback,
    /// A scripted node was entered.
    Scripted { node: NodeId },
    /// The session was logged and restored to the greeting.
    Reset { note: String },
    /// The session was reset while this turn was in flight; its result was
    /// dropped.
    Discarded,
}

/// Drives one [`ChatSession`].
pub struct DialogueEngine {
    session: Arc<ChatSession>,
    table: Arc<DialogueTable>,
    conversation: Arc<dyn ConversationService>,
    logger: Arc<SessionLogger>,
    highlight: HighlightController,
    typing_delay: Duration,
}

impl DialogueEngine {
    pub fn new(
        session: Arc<ChatSession>,
        table: Arc<DialogueTable>,
        conversation: Arc<dyn ConversationService>,
        logger: Arc<SessionLogger>,
    ) -> Self {
        let highlight = HighlightController::new(Arc::clone(&session));
        Self {
            session,
            table,
            conversation,
            logger,
            highlight,
            typing_delay: DEFAULT_TYPING_DELAY,
        }
    }

    pub fn with_typing_delay(mut self, delay: Duration) -> Self {
        self.typing_delay = delay;
        self
    }

    pub fn with_highlight_ttl(mut self, ttl: Duration) -> Self {
        self.highlight = self.highlight.with_ttl(ttl);
        self
    }

    pub fn with_keywords(mut self, keywords: KeywordTable) -> Self {
        self.highlight = self.highlight.with_keywords(keywords);
        self
    }

    pub fn session(&self) -> &Arc<ChatSession> {
        &self.session
    }

    pub fn table(&self) -> &DialogueTable {
        &self.table
    }

    /// Handles typed input. Blank text is ignored.
    pub async fn send_text(&self, text: &str) -> Result<Advance> {
        if text.trim().is_empty() {
            return Ok(Advance::Ignored);
        }
        self.advance(ChatOption::freeform(text)).await
    }

    /// Handles a picked option.
    ///
    /// Returns [`Advance::Busy`] without touching the transcript while
    /// another turn is in flight.
    pub async fn advance(&self, option: ChatOption) -> Result<Advance> {
        let action = option.parsed_action();
        tracing::debug!(
            "[DialogueEngine] Advancing with {:?} (session {})",
            action,
            self.session.id()
        );

        match action {
            OptionAction::Reset => Ok(self.finish(option)),
            OptionAction::Scripted(node_id) => self.enter_node(option, node_id).await,
            relayed => {
                debug_assert!(relayed.is_relayed());
                self.relay(option).await
            }
        }
    }

    /// Logs the session as it stands and restores the greeting.
    ///
    /// Allowed while a turn is in flight; that turn's result is discarded.
    pub fn reset_manual(&self) -> Advance {
        self.reset_with_note(MANUAL_RESET_NOTE)
    }

    fn finish(&self, option: ChatOption) -> Advance {
        if self.session.is_awaiting() {
            return Advance::Busy;
        }
        self.session.append(ChatMessage::user(option.value));
        let note = option.note.as_deref().unwrap_or(RESET_NOTE);
        self.reset_with_note(note)
    }

    fn reset_with_note(&self, note: &str) -> Advance {
        let previous = self.session.reset(Some(note));
        self.logger.log(&previous, note);
        tracing::info!("[DialogueEngine] Session reset ({})", note);
        Advance::Reset {
            note: note.to_string(),
        }
    }

    async fn enter_node(&self, option: ChatOption, node_id: NodeId) -> Result<Advance> {
        // Resolve first so a bad id leaves the transcript as it was.
        debug_assert!(
            self.table.contains(node_id.as_str()),
            "dialogue node '{}' is not in the table",
            node_id
        );
        let Some(node) = self.table.get(node_id.as_str()) else {
            tracing::error!("[DialogueEngine] Unknown dialogue node '{}'", node_id);
            return Err(SalvaError::not_found("DialogueNode", node_id.as_str()));
        };

        let Some(guard) = self.session.begin_awaiting() else {
            return Ok(Advance::Busy);
        };
        self.session.append(ChatMessage::user(option.value));

        tokio::time::sleep(self.typing_delay).await;

        if !self
            .session
            .append_if_current(guard.epoch(), node.to_message())
        {
            return Ok(Advance::Discarded);
        }
        self.session.set_flow(Some(node.flow));

        Ok(Advance::Scripted { node: node_id })
    }

    async fn relay(&self, option: ChatOption) -> Result<Advance> {
        let Some(guard) = self.session.begin_awaiting() else {
            return Ok(Advance::Busy);
        };

        // History is what was said before this line; the line itself travels
        // as `message`.
        let history = self.session.transcript().to_service_history();
        let request = ChatRequest::new(option.value.clone(), history);
        self.session.append(ChatMessage::user(option.value));

        let (reply, replied) = match self.conversation.reply(&request).await {
            Ok(text) => {
                let text = strip_markdown(&text);
                if text.is_empty() {
                    (MISHEARD.to_string(), true)
                } else {
                    (text, true)
                }
            }
            Err(e) => {
                tracing::warn!("[DialogueEngine] Conversational service failed: {}", e);
                (APOLOGY.to_string(), false)
            }
        };

        let message = ChatMessage::character(reply);
        if !self
            .session
            .append_if_current(guard.epoch(), message.clone())
        {
            return Ok(Advance::Discarded);
        }
        self.session.set_flow(None);

        if !replied {
            return Ok(Advance::Fallback);
        }
        self.highlight.on_reply(&message.text);
        Ok(Advance::Replied { message })
    }
}

/// Removes bold markers the service sometimes emits.
pub fn strip_markdown(text: &str) -> String {
    text.replace("**", "")
}
