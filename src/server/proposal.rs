//! The proposal endpoint: defensive defaulting of the inbound payload,
//! pipeline invocation, and envelope shaping. Leakage figures arrive
//! precomputed from the funnel; this handler never derives them.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use super::AppState;
use crate::proposal::{self, ProposalInput, ProposalOutcome, PLACEHOLDER_MARKDOWN};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProposalBody {
    payload: Payload,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Payload {
    request_id: Option<String>,
    ingest: Ingest,
    calculated_metrics: Metrics,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Ingest {
    agency_name: Option<String>,
    niche: Option<String>,
    contact_email: Option<String>,
    bottleneck: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Metrics {
    monthly_leakage: Option<f64>,
    annual_leakage: Option<f64>,
}

pub async fn handle(
    State(state): State<Arc<AppState>>,
    body: Option<Json<ProposalBody>>,
) -> Json<Value> {
    let ProposalBody { payload } = body.map(|Json(parsed)| parsed).unwrap_or_default();

    let request_id = payload
        .request_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| format!("fs_{}", Uuid::new_v4().simple()));

    let ingest = payload.ingest;
    let monthly = finite_or_zero(payload.calculated_metrics.monthly_leakage);
    let annual = finite_or_zero(payload.calculated_metrics.annual_leakage);

    let input = ProposalInput {
        agency: non_empty_or(ingest.agency_name.as_deref(), "Lead"),
        niche: non_empty_or(ingest.niche.as_deref(), "Unknown"),
        bottleneck: non_empty_or(ingest.bottleneck.as_deref(), "Not provided"),
        monthly_leakage: monthly,
        annual_leakage: annual,
    };

    tracing::info!(%request_id, agency = %input.agency, "generating proposal");
    let outcome = proposal::generate(&state.groq, &input).await;

    let ingest_echo = ingest_echo(&ingest, &input.bottleneck);
    let metrics_echo = json!({ "monthlyLeakage": monthly, "annualLeakage": annual });

    // Failure is signaled in-body; the HTTP status stays 200 either way.
    let envelope = match outcome {
        ProposalOutcome::Generated { markdown, debug } => json!({
            "success": true,
            "payload": {
                "proposalMarkdown": markdown,
                "ingest": ingest_echo,
                "calculatedMetrics": metrics_echo,
            },
            "debug": {
                "requestId": request_id,
                "modelsUsed": { "pass1": debug.pass1_model, "pass2": debug.pass2_model },
                "tried": { "pass1": debug.tried_pass1, "pass2": debug.tried_pass2 },
            },
        }),
        ProposalOutcome::Failed { message, retry_after_seconds, tried } => json!({
            "success": false,
            "error": "PROPOSAL_GENERATION_FAILED",
            "message": message,
            "retryAfterSeconds": retry_after_seconds,
            "debug": { "requestId": request_id, "tried": tried },
            "payload": {
                "proposalMarkdown": PLACEHOLDER_MARKDOWN,
                "ingest": ingest_echo,
                "calculatedMetrics": metrics_echo,
            },
        }),
    };

    Json(envelope)
}

/// Echo the caller's contact fields back, with the bottleneck pinned to the
/// defaulted value the prompt actually used.
fn ingest_echo(ingest: &Ingest, bottleneck: &str) -> Value {
    let mut echo = Map::new();
    if let Some(agency_name) = &ingest.agency_name {
        echo.insert("agencyName".to_string(), json!(agency_name));
    }
    if let Some(niche) = &ingest.niche {
        echo.insert("niche".to_string(), json!(niche));
    }
    if let Some(contact_email) = &ingest.contact_email {
        echo.insert("contactEmail".to_string(), json!(contact_email));
    }
    echo.insert("bottleneck".to_string(), json!(bottleneck));
    Value::Object(echo)
}

fn non_empty_or(value: Option<&str>, default: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => default.to_string(),
    }
}

fn finite_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_or_defaults() {
        assert_eq!(non_empty_or(None, "Lead"), "Lead");
        assert_eq!(non_empty_or(Some(""), "Lead"), "Lead");
        assert_eq!(non_empty_or(Some("  "), "Lead"), "Lead");
        assert_eq!(non_empty_or(Some("Acme"), "Lead"), "Acme");
    }

    #[test]
    fn test_finite_or_zero() {
        assert_eq!(finite_or_zero(None), 0.0);
        assert_eq!(finite_or_zero(Some(f64::NAN)), 0.0);
        assert_eq!(finite_or_zero(Some(1250.5)), 1250.5);
    }

    #[test]
    fn test_ingest_echo_skips_absent_fields_but_pins_bottleneck() {
        let ingest = Ingest {
            agency_name: Some("Acme".to_string()),
            niche: None,
            contact_email: None,
            bottleneck: None,
        };
        let echo = ingest_echo(&ingest, "Not provided");
        assert_eq!(echo["agencyName"], json!("Acme"));
        assert_eq!(echo["bottleneck"], json!("Not provided"));
        assert!(echo.get("niche").is_none());
    }

    #[test]
    fn test_body_deserializes_with_camel_case_and_defaults() {
        let body: ProposalBody = serde_json::from_str(
            r#"{"payload":{"requestId":"fs_1","ingest":{"agencyName":"Acme"},"calculatedMetrics":{"monthlyLeakage":100}}}"#,
        )
        .unwrap();
        assert_eq!(body.payload.request_id.as_deref(), Some("fs_1"));
        assert_eq!(body.payload.ingest.agency_name.as_deref(), Some("Acme"));
        assert_eq!(body.payload.calculated_metrics.monthly_leakage, Some(100.0));
        assert!(body.payload.calculated_metrics.annual_leakage.is_none());

        let empty: ProposalBody = serde_json::from_str("{}").unwrap();
        assert!(empty.payload.request_id.is_none());
    }
}
