//! HTTP surface: the proposal endpoint plus the funnel's lead passthrough
//! and a configuration presence report.
//!
//! Requests are fully independent - shared state is configuration and HTTP
//! clients only, never mutated after startup.

pub mod debug;
pub mod lead;
pub mod proposal;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::config::Config;
use crate::proposal::client::GroqClient;

pub struct AppState {
    pub config: Config,
    pub groq: GroqClient,
    /// Client for webhook forwarding, separate from the provider client.
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let groq = GroqClient::new(&config);
        Self { config, groq, http: reqwest::Client::new() }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/proposal", post(proposal::handle).fallback(method_not_allowed))
        .route("/api/lead", post(lead::handle).fallback(method_not_allowed))
        .route("/api/debug", get(debug::handle))
        .with_state(state)
}

pub async fn serve(listener: tokio::net::TcpListener, state: Arc<AppState>) -> anyhow::Result<()> {
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// Non-POST on a POST-only endpoint: 405 with an explicit envelope instead
/// of axum's bare status.
async fn method_not_allowed() -> (StatusCode, Json<Value>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "success": false, "error": "METHOD_NOT_ALLOWED" })),
    )
}
