//! Client for the remote conversational AI that voices Salva.

use async_trait::async_trait;
use reqwest::Client;
use salva_core::chat::ServiceTurn;
use salva_core::config::ConversationConfig;
use salva_core::{Result, SalvaError};
use serde::{Deserialize, Serialize};

const SERVICE: &str = "conversation";

/// Request body understood by the conversational service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// The user's latest line.
    pub message: String,
    /// Everything said before it.
    pub history: Vec<ServiceTurn>,
    /// Asks the service for the short replies used by the shop widget.
    pub is_external: bool,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>, history: Vec<ServiceTurn>) -> Self {
        Self {
            message: message.into(),
            history,
            is_external: true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    response: Option<String>,
}

/// Produces Salva's free-form replies.
#[async_trait]
pub trait ConversationService: Send + Sync {
    /// Returns the raw reply text. An empty string means the service answered
    /// without content.
    async fn reply(&self, request: &ChatRequest) -> Result<String>;
}

/// [`ConversationService`] over HTTP.
#[derive(Clone)]
pub struct HttpConversationService {
    client: Client,
    endpoint: String,
}

impl HttpConversationService {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn from_config(config: &ConversationConfig) -> Result<Self> {
        let client = crate::http::build_client(SERVICE, config.timeout())?;
        Ok(Self::new(client, config.endpoint.clone()))
    }
}

#[async_trait]
impl ConversationService for HttpConversationService {
    async fn reply(&self, request: &ChatRequest) -> Result<String> {
        tracing::debug!(
            "[HttpConversationService] POST {} (history: {} turns)",
            self.endpoint,
            request.history.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| crate::http::transport_error(SERVICE, e))?;

        let response = crate::http::ensure_success(SERVICE, response).await?;

        let body: ChatResponse = response.json().await.map_err(|e| {
            SalvaError::transport(SERVICE, format!("Failed to parse chat response: {}", e))
        })?;

        Ok(body.response.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use salva_core::chat::ServiceRole;

    #[test]
    fn test_request_wire_shape() {
        let request = ChatRequest::new(
            "おすすめは？",
            vec![ServiceTurn {
                role: ServiceRole::Bot,
                content: "こんにちは〜".into(),
            }],
        );
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["message"], "おすすめは？");
        assert_eq!(value["isExternal"], true);
        assert_eq!(value["history"][0]["role"], "bot");
    }
}
