//! Lead passthrough: forwards the captured lead body to the automation
//! webhook with the shared secret. The webhook owns all downstream handling;
//! this endpoint only relays.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use super::AppState;

const SECRET_HEADER: &str = "x-flowstack-secret";

pub async fn handle(State(state): State<Arc<AppState>>, body: Option<Json<Value>>) -> Response {
    let (Some(url), Some(secret)) = (
        state.config.webhook_url.as_deref(),
        state.config.webhook_secret.as_deref(),
    ) else {
        tracing::error!("lead forwarding is not configured");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Missing N8N_WEBHOOK_URL or N8N_WEBHOOK_SECRET" })),
        )
            .into_response();
    };

    let body = body.map(|Json(value)| value).unwrap_or_else(|| json!({}));

    let sent = state
        .http
        .post(url)
        .header("Content-Type", "application/json")
        .header(SECRET_HEADER, secret)
        .json(&body)
        .send()
        .await;

    let upstream = match sent {
        Ok(response) => response,
        Err(err) => {
            tracing::error!(error = %err, "lead forwarding failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error", "details": err.to_string() })),
            )
                .into_response();
        }
    };

    let status = upstream.status();
    let data = upstream.text().await.unwrap_or_default();

    if !status.is_success() {
        tracing::error!(status = status.as_u16(), "webhook rejected lead");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to forward lead to n8n", "details": data })),
        )
            .into_response();
    }

    tracing::info!("lead forwarded");
    (StatusCode::OK, data).into_response()
}
