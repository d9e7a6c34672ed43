//! Shared reqwest plumbing.

use std::time::Duration;

use reqwest::{Client, Response};
use salva_core::{Result, SalvaError};

/// Builds a client, optionally with a whole-request timeout.
pub(crate) fn build_client(service: &'static str, timeout: Option<Duration>) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| SalvaError::transport(service, format!("Failed to build HTTP client: {}", e)))
}

/// Maps a send failure to a transport error.
pub(crate) fn transport_error(service: &'static str, err: reqwest::Error) -> SalvaError {
    SalvaError::transport(service, err.to_string())
}

/// Turns a non-2xx response into an upstream error carrying the body text.
pub(crate) async fn ensure_success(service: &'static str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(SalvaError::upstream(service, status.as_u16(), error_text))
}
