//! Session-scoped chat state.
//!
//! `ChatSession` owns everything a rendering surface observes: the
//! transcript, the typing indicator and the shelf highlight. Each is held in
//! a `watch` channel so observers always see the latest whole value, and
//! every change is also published as a [`SessionEvent`] on a broadcast
//! channel for surfaces that prefer an event stream.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use salva_core::chat::{ChatMessage, SessionEvent, Transcript};
use salva_core::dialogue::DialogueFlow;
use salva_core::highlight::{HighlightState, ProductId};
use tokio::sync::{broadcast, watch};
use uuid::Uuid;

const EVENT_CAPACITY: usize = 64;

/// State of one chat session.
pub struct ChatSession {
    id: Uuid,
    transcript: watch::Sender<Arc<Transcript>>,
    awaiting: watch::Sender<bool>,
    highlight: watch::Sender<HighlightState>,
    events: broadcast::Sender<SessionEvent>,
    /// Bumped on every reset. Work started in an older epoch must not touch
    /// the current transcript.
    epoch: AtomicU64,
    /// Scripted flow of the latest character line, if any.
    flow: Mutex<Option<DialogueFlow>>,
}

impl ChatSession {
    /// Creates an idle session showing the greeting.
    pub fn new() -> Self {
        let (transcript, _) = watch::channel(Arc::new(Transcript::initial()));
        let (awaiting, _) = watch::channel(false);
        let (highlight, _) = watch::channel(HighlightState::default());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let id = Uuid::new_v4();
        tracing::debug!("[ChatSession] Created session {}", id);

        Self {
            id,
            transcript,
            awaiting,
            highlight,
            events,
            epoch: AtomicU64::new(0),
            flow: Mutex::new(None),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    // ============================================================================
    // Transcript
    // ============================================================================

    /// Snapshot of the current transcript.
    pub fn transcript(&self) -> Arc<Transcript> {
        self.transcript.borrow().clone()
    }

    pub fn subscribe_transcript(&self) -> watch::Receiver<Arc<Transcript>> {
        self.transcript.subscribe()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Appends a message to the current transcript.
    pub fn append(&self, message: ChatMessage) {
        self.transcript.send_modify(|current| {
            *current = Arc::new(current.appended(message.clone()));
        });
        self.publish(SessionEvent::MessageAppended { message });
    }

    /// Appends only if no reset happened since `epoch` was read.
    ///
    /// Returns `false` when the message was discarded.
    pub fn append_if_current(&self, epoch: u64, message: ChatMessage) -> bool {
        let appended = self.transcript.send_if_modified(|current| {
            if self.epoch.load(Ordering::SeqCst) != epoch {
                return false;
            }
            *current = Arc::new(current.appended(message.clone()));
            true
        });

        if appended {
            self.publish(SessionEvent::MessageAppended { message });
        } else {
            tracing::debug!(
                "[ChatSession] Discarding message from stale epoch {} (session {})",
                epoch,
                self.id
            );
        }
        appended
    }

    /// Restores the greeting and returns the transcript it replaced.
    ///
    /// Also clears the typing indicator and the scripted flow marker.
    pub fn reset(&self, note: Option<&str>) -> Arc<Transcript> {
        let fresh = Arc::new(Transcript::initial());
        let mut previous = None;
        self.transcript.send_modify(|current| {
            self.epoch.fetch_add(1, Ordering::SeqCst);
            previous = Some(std::mem::replace(current, fresh));
        });

        self.set_flow(None);
        self.set_awaiting(false);
        self.publish(SessionEvent::TranscriptReset {
            note: note.map(str::to_string),
        });

        previous.unwrap_or_else(|| Arc::new(Transcript::default()))
    }

    // ============================================================================
    // Typing indicator
    // ============================================================================

    pub fn is_awaiting(&self) -> bool {
        *self.awaiting.borrow()
    }

    pub fn subscribe_awaiting(&self) -> watch::Receiver<bool> {
        self.awaiting.subscribe()
    }

    /// Turns the typing indicator on unless it already is.
    ///
    /// The returned guard turns it off again when dropped, whatever happened
    /// in between.
    pub fn begin_awaiting(&self) -> Option<AwaitingGuard<'_>> {
        let started = self.awaiting.send_if_modified(|awaiting| {
            if *awaiting {
                false
            } else {
                *awaiting = true;
                true
            }
        });
        if !started {
            return None;
        }
        self.publish(SessionEvent::AwaitingChanged { awaiting: true });
        Some(AwaitingGuard {
            session: self,
            epoch: self.epoch(),
        })
    }

    fn set_awaiting(&self, value: bool) {
        let changed = self.awaiting.send_if_modified(|awaiting| {
            if *awaiting == value {
                false
            } else {
                *awaiting = value;
                true
            }
        });
        if changed {
            self.publish(SessionEvent::AwaitingChanged { awaiting: value });
        }
    }

    // ============================================================================
    // Highlight
    // ============================================================================

    pub fn highlight(&self) -> HighlightState {
        *self.highlight.borrow()
    }

    pub fn subscribe_highlight(&self) -> watch::Receiver<HighlightState> {
        self.highlight.subscribe()
    }

    pub fn set_highlight(&self, product_id: Option<ProductId>) {
        self.highlight.send_replace(HighlightState { product_id });
        self.publish(SessionEvent::HighlightChanged { product_id });
    }

    // ============================================================================
    // Scripted flow
    // ============================================================================

    pub fn set_flow(&self, flow: Option<DialogueFlow>) {
        if let Ok(mut current) = self.flow.lock() {
            *current = flow;
        }
    }

    /// True while the latest character line came from the dating story.
    pub fn is_dating_flow(&self) -> bool {
        self.flow
            .lock()
            .map(|flow| *flow == Some(DialogueFlow::Dating))
            .unwrap_or(false)
    }

    // ============================================================================
    // Events
    // ============================================================================

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: SessionEvent) {
        // No subscribers is fine; the watch channels still hold the state.
        let _ = self.events.send(event);
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps the typing indicator on for the duration of a turn.
pub struct AwaitingGuard<'a> {
    session: &'a ChatSession,
    epoch: u64,
}

impl AwaitingGuard<'_> {
    /// Epoch the turn started in.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

impl Drop for AwaitingGuard<'_> {
    fn drop(&mut self) {
        // A reset already cleared the indicator, and a newer turn may own it.
        if self.session.epoch() == self.epoch {
            self.session.set_awaiting(false);
        }
    }
}
