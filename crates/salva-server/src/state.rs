//! Shared state of the request handlers.

use std::sync::Arc;

use salva_core::Result;
use salva_core::config::SalvaConfig;
use salva_core::dialogue::DialogueTable;
use salva_interaction::{
    ConversationService, FileProductCatalog, HttpConversationService, ProductCatalog,
};

pub struct AppState {
    /// Product list behind `/api/products`.
    pub catalog: Arc<dyn ProductCatalog>,
    /// Voice of Salva behind `/api/chat`.
    pub conversation: Arc<dyn ConversationService>,
    pub table: Arc<DialogueTable>,
}

impl AppState {
    pub fn from_config(config: &SalvaConfig) -> Result<Self> {
        let table = match &config.dialogue.table_path {
            Some(path) => DialogueTable::from_path(path)?,
            None => DialogueTable::dating()?,
        };
        tracing::info!(
            "[Server] Serving products from {}",
            config.server.products_path.display()
        );

        Ok(Self {
            catalog: Arc::new(FileProductCatalog::new(&config.server.products_path)),
            conversation: Arc::new(HttpConversationService::from_config(&config.conversation)?),
            table: Arc::new(table),
        })
    }
}
