//! Configuration presence report. Secrets are reported as SET / NOT SET and
//! never echoed; the webhook URL itself is not a secret.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use super::AppState;

pub async fn handle(State(state): State<Arc<AppState>>) -> Json<Value> {
    let config = &state.config;
    Json(json!({
        "N8N_WEBHOOK_URL": config.webhook_url.clone().unwrap_or_else(|| "NOT SET".to_string()),
        "N8N_WEBHOOK_SECRET": if config.webhook_secret.is_some() { "SET" } else { "NOT SET" },
        "GROQ_API_KEY": if config.has_api_key() { "SET" } else { "NOT SET" },
    }))
}
