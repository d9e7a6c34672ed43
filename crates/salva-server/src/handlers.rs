//! HTTP route handlers.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use salva_application::engine::{APOLOGY, strip_markdown};
use salva_interaction::ChatRequest;
use serde::{Deserialize, Serialize};

use super::json_error;
use super::state::AppState;

pub(crate) const BANNER: &str = "RPG E-commerce API is Running!";

/// Body of `POST /api/chat`.
#[derive(Debug, Deserialize)]
pub(crate) struct ChatBody {
    user_message: String,
    #[serde(default)]
    cart_context: Vec<CartItem>,
}

/// Only quantities are read; the product ids ride along unused.
///
/// The storefront sends plain JSON numbers, so fractional or huge counts
/// are accepted as-is.
#[derive(Debug, Deserialize)]
pub(crate) struct CartItem {
    #[serde(default)]
    quantity: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatReply {
    role: &'static str,
    content: String,
    emotion_tag: &'static str,
}

/// Fallback handler for unmatched routes.
pub(crate) async fn handle_not_found() -> impl IntoResponse {
    json_error(StatusCode::NOT_FOUND, "not found")
}

/// GET /
pub(crate) async fn handle_root() -> &'static str {
    BANNER
}

/// GET /api/products
pub(crate) async fn handle_products(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.catalog.list().await {
        Ok(products) => (StatusCode::OK, Json(products)).into_response(),
        Err(e) => {
            tracing::warn!("[Server] Failed to load products: {}", e);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch products")
                .into_response()
        }
    }
}

/// POST /api/chat
pub(crate) async fn handle_chat(State(state): State<Arc<AppState>>, body: Bytes) -> impl IntoResponse {
    let body: ChatBody = match serde_json::from_slice(&body) {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!("[Server] Rejected chat request: {}", e);
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Chat failed").into_response();
        }
    };

    let items: f64 = body.cart_context.iter().map(|item| item.quantity).sum();
    tracing::debug!(
        "[Server] Chat request with {} items in cart ({} lines)",
        items,
        body.cart_context.len()
    );

    let request = ChatRequest::new(body.user_message, Vec::new());
    let reply = match state.conversation.reply(&request).await {
        Ok(text) => {
            let text = strip_markdown(&text);
            if text.is_empty() {
                None
            } else {
                Some(text)
            }
        }
        Err(e) => {
            tracing::warn!("[Server] Conversational service failed: {}", e);
            None
        }
    };

    let reply = match reply {
        Some(content) => ChatReply {
            role: "salva",
            content,
            emotion_tag: "happy",
        },
        None => ChatReply {
            role: "salva",
            content: APOLOGY.to_string(),
            emotion_tag: "sorry",
        },
    };
    (StatusCode::OK, Json(reply)).into_response()
}

/// GET /api/dialogue/endings
pub(crate) async fn handle_endings(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let endings = state.table.endings();
    (
        StatusCode::OK,
        Json(serde_json::json!({ "endings": endings })),
    )
}
