//! Client for the append-only session log (a spreadsheet web app).

use async_trait::async_trait;
use reqwest::Client;
use salva_core::Result;
use salva_core::chat::ChatMessage;
use serde::{Deserialize, Serialize};

const SERVICE: &str = "session-log";

/// One finished session, as appended to the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogPayload {
    pub history: Vec<ChatMessage>,
    /// Pseudo-random id generated per submission.
    pub user_id: String,
    /// Ending classification or reset reason.
    pub note: String,
}

/// Destination of finished sessions.
#[async_trait]
pub trait LogSink: Send + Sync {
    async fn submit(&self, payload: &LogPayload) -> Result<()>;
}

/// [`LogSink`] over HTTP. The response, including its status, is ignored.
#[derive(Clone)]
pub struct HttpLogSink {
    client: Client,
    endpoint: String,
}

impl HttpLogSink {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self> {
        let client = crate::http::build_client(SERVICE, None)?;
        Ok(Self::new(client, endpoint))
    }
}

#[async_trait]
impl LogSink for HttpLogSink {
    async fn submit(&self, payload: &LogPayload) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await
            .map_err(|e| crate::http::transport_error(SERVICE, e))?;

        // One-way: the spreadsheet app answers with redirects and HTML that
        // nobody reads.
        tracing::debug!(
            "[HttpLogSink] Session log submitted (status {})",
            response.status()
        );
        Ok(())
    }
}
