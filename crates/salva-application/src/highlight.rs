//! Timed shelf highlight driven by free-form replies.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use salva_core::highlight::{KeywordTable, ProductId};
use tokio_util::sync::CancellationToken;

use crate::session::ChatSession;

/// Default time a highlight stays on.
pub const DEFAULT_HIGHLIGHT_TTL: Duration = Duration::from_secs(5);

#[derive(Default)]
struct TimerSlot {
    generation: u64,
    cancel: Option<CancellationToken>,
}

/// Highlights the product a reply mentions and clears it after a TTL.
///
/// A new match replaces the current highlight and restarts the timer, so at
/// most one expiry timer is live at a time.
pub struct HighlightController {
    session: Arc<ChatSession>,
    keywords: KeywordTable,
    ttl: Duration,
    timer: Arc<Mutex<TimerSlot>>,
}

impl HighlightController {
    pub fn new(session: Arc<ChatSession>) -> Self {
        Self {
            session,
            keywords: KeywordTable::default(),
            ttl: DEFAULT_HIGHLIGHT_TTL,
            timer: Arc::new(Mutex::new(TimerSlot::default())),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_keywords(mut self, keywords: KeywordTable) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Scans a reply for a product keyword.
    ///
    /// Leaves the current highlight untouched when nothing matches. Must be
    /// called inside a Tokio runtime.
    pub fn on_reply(&self, text: &str) -> Option<ProductId> {
        let product_id = self.keywords.detect(text)?;
        tracing::debug!("[HighlightController] Highlighting product {}", product_id);

        self.session.set_highlight(Some(product_id));
        self.restart_timer();
        Some(product_id)
    }

    /// Cancels any pending expiry and clears the highlight now.
    pub fn clear(&self) {
        if let Ok(mut slot) = self.timer.lock() {
            slot.generation += 1;
            if let Some(cancel) = slot.cancel.take() {
                cancel.cancel();
            }
        }
        if self.session.highlight().product_id.is_some() {
            self.session.set_highlight(None);
        }
    }

    fn restart_timer(&self) {
        let (generation, cancel) = {
            let Ok(mut slot) = self.timer.lock() else {
                tracing::warn!(
                    "[HighlightController] Timer lock poisoned, highlight will not expire"
                );
                return;
            };
            if let Some(previous) = slot.cancel.take() {
                previous.cancel();
            }
            slot.generation += 1;
            let cancel = CancellationToken::new();
            slot.cancel = Some(cancel.clone());
            (slot.generation, cancel)
        };

        let session = Arc::clone(&self.session);
        let timer = Arc::clone(&self.timer);
        let ttl = self.ttl;
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(ttl) => {
                    // Expire only if no newer highlight took over meanwhile.
                    let current = timer
                        .lock()
                        .map(|slot| slot.generation == generation)
                        .unwrap_or(false);
                    if current {
                        session.set_highlight(None);
                    }
                }
            }
        });
    }
}
