//! Fire-and-forget shipping of finished sessions.
//!
//! Logging must never hold up the chat: [`SessionLogger::log`] only queues a
//! job, and a background worker submits it. Failures are reported through
//! `tracing` and otherwise dropped.

use std::sync::{Arc, Mutex};

use rand::Rng;
use salva_core::chat::Transcript;
use salva_interaction::{LogPayload, LogSink};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const USER_ID_PREFIX: &str = "user_";
const USER_ID_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Pseudo-random submission id such as `user_k3x9q0a2b`.
pub fn generate_user_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..USER_ID_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{}{}", USER_ID_PREFIX, suffix)
}

/// Queues session logs for a background worker.
pub struct SessionLogger {
    tx: Mutex<Option<mpsc::UnboundedSender<LogPayload>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl SessionLogger {
    /// Starts the worker on the current Tokio runtime.
    pub fn spawn(sink: Arc<dyn LogSink>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<LogPayload>();

        let worker = tokio::spawn(async move {
            while let Some(payload) = rx.recv().await {
                match sink.submit(&payload).await {
                    Ok(()) => tracing::debug!(
                        "[SessionLogger] Logged {} entries as {} ({})",
                        payload.history.len(),
                        payload.user_id,
                        payload.note
                    ),
                    Err(e) => tracing::warn!(
                        "[SessionLogger] Failed to log session ({}): {}",
                        payload.note,
                        e
                    ),
                }
            }
            tracing::debug!("[SessionLogger] Worker stopped");
        });

        Self {
            tx: Mutex::new(Some(tx)),
            worker: Mutex::new(Some(worker)),
        }
    }

    /// A logger that drops everything, used when no endpoint is configured.
    pub fn disabled() -> Self {
        Self {
            tx: Mutex::new(None),
            worker: Mutex::new(None),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.sender().is_some()
    }

    fn sender(&self) -> Option<mpsc::UnboundedSender<LogPayload>> {
        self.tx.lock().ok().and_then(|tx| tx.clone())
    }

    /// Queues `transcript` for submission under `note`.
    ///
    /// Returns immediately. Transcripts with nothing to log are skipped.
    pub fn log(&self, transcript: &Transcript, note: &str) {
        let Some(tx) = self.sender() else {
            tracing::debug!("[SessionLogger] Logging disabled, dropping '{}'", note);
            return;
        };

        let history = transcript.logged_entries();
        if history.is_empty() {
            return;
        }

        let payload = LogPayload {
            history,
            user_id: generate_user_id(),
            note: note.to_string(),
        };
        if tx.send(payload).is_err() {
            tracing::warn!("[SessionLogger] Worker gone, dropping '{}'", note);
        }
    }

    /// Stops accepting jobs and waits for queued ones to finish.
    ///
    /// Later calls to [`SessionLogger::log`] drop their job.
    pub async fn shutdown(&self) {
        if let Ok(mut tx) = self.tx.lock() {
            tx.take();
        }
        let worker = self.worker.lock().ok().and_then(|mut worker| worker.take());
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                tracing::warn!("[SessionLogger] Worker task failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use salva_core::SalvaError;
    use salva_core::chat::ChatMessage;

    #[derive(Default)]
    struct RecordingSink {
        payloads: Mutex<Vec<LogPayload>>,
    }

    #[async_trait]
    impl LogSink for RecordingSink {
        async fn submit(&self, payload: &LogPayload) -> salva_core::Result<()> {
            self.payloads.lock().unwrap().push(payload.clone());
            Ok(())
        }
    }

    struct FailingSink;

    #[async_trait]
    impl LogSink for FailingSink {
        async fn submit(&self, _payload: &LogPayload) -> salva_core::Result<()> {
            Err(SalvaError::transport("session-log", "connection refused"))
        }
    }

    #[test]
    fn test_user_id_shape() {
        let id = generate_user_id();
        assert!(id.starts_with("user_"));
        assert_eq!(id.len(), "user_".len() + 9);
        assert!(
            id["user_".len()..]
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
        );
    }

    #[tokio::test]
    async fn test_log_submits_user_and_character_lines() {
        let sink = Arc::new(RecordingSink::default());
        let logger = SessionLogger::spawn(sink.clone());

        let transcript = Transcript::initial()
            .appended(ChatMessage::user("はい…"))
            .appended(ChatMessage::system("internal"));
        logger.log(&transcript, "BAD END: 諦め");
        logger.shutdown().await;

        let payloads = sink.payloads.lock().unwrap();
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].note, "BAD END: 諦め");
        assert_eq!(payloads[0].history.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_transcript_is_skipped() {
        let sink = Arc::new(RecordingSink::default());
        let logger = SessionLogger::spawn(sink.clone());

        logger.log(&Transcript::default(), "Reset Action");
        logger.shutdown().await;

        assert!(sink.payloads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failing_sink_is_swallowed() {
        let logger = SessionLogger::spawn(Arc::new(FailingSink));
        logger.log(&Transcript::initial(), "HAPPY END");
        logger.shutdown().await;
    }

    #[tokio::test]
    async fn test_disabled_logger_drops_jobs() {
        let logger = SessionLogger::disabled();
        assert!(!logger.is_enabled());
        logger.log(&Transcript::initial(), "HAPPY END");
        logger.shutdown().await;
    }
}
