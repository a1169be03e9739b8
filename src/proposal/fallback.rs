use serde::Serialize;

use super::client::{CallOutcome, GroqClient, Message, ProviderError};
use super::models::{Model, PassParams};

/// Minimum content length for a response to count as a usable document.
/// Anything shorter is a refusal, an apology, or a truncated stub.
pub const MIN_ACCEPT_CHARS: usize = 200;

/// One audit-trail entry per model tried, appended in trial order.
#[derive(Debug, Clone, Serialize)]
pub struct Attempt {
    pub model: &'static str,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Result of driving one ordered model lineup to acceptance or exhaustion.
#[derive(Debug)]
pub struct FallbackResult {
    pub ok: bool,
    /// The accepted model, or the last one tried on failure.
    pub model: Model,
    pub content: String,
    pub tried: Vec<Attempt>,
    /// Error detail from a fail-fast attempt. Exhaustion deliberately carries
    /// none; callers supply their own messaging.
    pub error: Option<ProviderError>,
}

/// Should a failed attempt advance to the next model?
///
/// Kept pure over (status, code) so the policy is testable on its own:
/// provider overload and rate limits are worth trying elsewhere, anything
/// else (bad request, auth) would fail identically on every model.
pub fn should_retry(status: u16, code: Option<&str>) -> bool {
    if status == 429 {
        return true;
    }
    if matches!(status, 500 | 502 | 503 | 504) {
        return true;
    }
    code == Some("rate_limit_exceeded")
}

fn accepted(outcome: &CallOutcome) -> bool {
    outcome.ok && outcome.content.chars().count() >= MIN_ACCEPT_CHARS
}

/// Try each model in order until one produces an acceptable document.
///
/// Every attempt lands in the audit trail before the next decision. A
/// non-retryable failure stops the loop immediately - including the odd case
/// of an ok-but-short response with a non-retryable status, which comes back
/// as the final unsuccessful result without trying the remaining models.
pub async fn call_with_fallback(
    client: &GroqClient,
    lineup: &[Model],
    messages: &[Message],
    params: PassParams,
) -> FallbackResult {
    let mut tried = Vec::with_capacity(lineup.len());

    for &model in lineup {
        let outcome = client.call(model, messages, params).await;
        tried.push(Attempt {
            model: model.id(),
            status: outcome.status,
            code: outcome.error_code().map(str::to_string),
        });

        if accepted(&outcome) {
            tracing::info!(model = model.id(), attempts = tried.len(), "model accepted");
            return FallbackResult { ok: true, model, content: outcome.content, tried, error: None };
        }

        if !should_retry(outcome.status, outcome.error_code()) {
            tracing::warn!(model = model.id(), status = outcome.status, "non-retryable failure, stopping");
            return FallbackResult {
                ok: false,
                model,
                content: outcome.content,
                tried,
                error: outcome.error,
            };
        }

        tracing::warn!(model = model.id(), status = outcome.status, "retryable failure, advancing");
    }

    let last = *lineup.last().expect("model lineup is never empty");
    FallbackResult { ok: false, model: last, content: String::new(), tried, error: None }
}
