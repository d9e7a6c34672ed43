//! Minimal storefront backend.
//!
//! Endpoints:
//! - GET  /                      - Banner text
//! - GET  /api/products          - Product list from the seed catalog
//! - POST /api/chat              - One-shot reply from Salva
//! - GET  /api/dialogue/endings  - Ending notes of the dating story
//!
//! CORS is permissive; the storefront is served from another origin.

mod handlers;
mod state;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use salva_core::config::SalvaConfig;
use tower_http::cors::{Any, CorsLayer};

pub use self::state::AppState;

use self::handlers::{
    handle_chat, handle_endings, handle_not_found, handle_products, handle_root,
};

/// Construct a JSON error response with the given status code and message.
fn json_error(status: StatusCode, message: &str) -> impl IntoResponse {
    (status, Json(serde_json::json!({ "error": message })))
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_root))
        .route("/api/products", get(handle_products))
        .route("/api/chat", post(handle_chat))
        .route("/api/dialogue/endings", get(handle_endings))
        .fallback(handle_not_found)
        .layer(cors)
        .with_state(state)
}

/// Binds `config.server.bind` and serves until the process is stopped.
pub async fn serve(config: &SalvaConfig) -> anyhow::Result<()> {
    let state = Arc::new(AppState::from_config(config)?);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!("[Server] Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
