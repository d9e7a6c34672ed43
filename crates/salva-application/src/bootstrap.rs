//! Wires a chat session to its collaborators from configuration.

use std::sync::Arc;

use salva_core::Result;
use salva_core::config::SalvaConfig;
use salva_core::dialogue::DialogueTable;
use salva_interaction::{
    ConversationService, HttpConversationService, HttpLogSink, HttpProductCatalog, LogSink,
    ProductCatalog,
};

use crate::engine::DialogueEngine;
use crate::logger::SessionLogger;
use crate::session::ChatSession;

/// One fully wired chat widget: session, engine, logger and catalog.
pub struct ChatApp {
    pub session: Arc<ChatSession>,
    pub engine: Arc<DialogueEngine>,
    pub logger: Arc<SessionLogger>,
    pub catalog: Arc<dyn ProductCatalog>,
}

impl ChatApp {
    /// Builds the HTTP-backed app. Must run inside a Tokio runtime because the
    /// logger worker is spawned here.
    pub fn from_config(config: &SalvaConfig) -> Result<Self> {
        let conversation = Arc::new(HttpConversationService::from_config(&config.conversation)?);
        let sink: Option<Arc<dyn LogSink>> = match &config.logging.endpoint {
            Some(endpoint) => Some(Arc::new(HttpLogSink::with_endpoint(endpoint.clone())?)),
            None => {
                tracing::info!("[Bootstrap] No log endpoint configured, session logs are dropped");
                None
            }
        };
        let catalog = Arc::new(HttpProductCatalog::from_config(&config.catalog)?);

        Self::with_services(config, conversation, sink, catalog)
    }

    /// Builds the app around the given collaborators.
    pub fn with_services(
        config: &SalvaConfig,
        conversation: Arc<dyn ConversationService>,
        sink: Option<Arc<dyn LogSink>>,
        catalog: Arc<dyn ProductCatalog>,
    ) -> Result<Self> {
        let table = match &config.dialogue.table_path {
            Some(path) => {
                tracing::info!("[Bootstrap] Loading dialogue table from {}", path.display());
                DialogueTable::from_path(path)?
            }
            None => DialogueTable::dating()?,
        };

        let logger = Arc::new(match sink {
            Some(sink) => SessionLogger::spawn(sink),
            None => SessionLogger::disabled(),
        });

        let session = Arc::new(ChatSession::new());
        let engine = DialogueEngine::new(
            Arc::clone(&session),
            Arc::new(table),
            conversation,
            Arc::clone(&logger),
        )
        .with_typing_delay(config.dialogue.typing_delay())
        .with_highlight_ttl(config.highlight.ttl());

        tracing::info!("[Bootstrap] Chat session {} ready", session.id());

        Ok(Self {
            session,
            engine: Arc::new(engine),
            logger,
            catalog,
        })
    }

    /// Waits for queued session logs to be submitted.
    pub async fn shutdown(&self) {
        self.logger.shutdown().await;
    }
}
