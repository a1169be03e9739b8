//! Two-pass proposal generation.
//!
//! Pass 1 produces the full diagnostic document through the model fallback
//! chain. Pass 2 regenerates only the Executive Summary and Solution
//! Architecture sections and merges them back when the rewrite is usable; a
//! failed polish never sinks the request. Only Pass 1 exhaustion is terminal,
//! and even then the caller receives a well-formed placeholder document.

pub mod client;
pub mod fallback;
pub mod models;
pub mod prompts;
pub mod sections;

use std::sync::LazyLock;

use regex::Regex;

use client::{GroqClient, Message};
use fallback::{call_with_fallback, Attempt};
use models::{PASS1_LINEUP, PASS1_PARAMS, PASS2_LINEUP, PASS2_PARAMS};
use sections::Section;

/// Polish output at or below this length is discarded and Pass 1 stands.
const POLISH_MIN_CHARS: usize = 100;

/// Returned on terminal failure so downstream consumers always get
/// well-formed markdown.
pub const PLACEHOLDER_MARKDOWN: &str = "## Executive Summary\n- Proposal generation failed temporarily.\n\n## Next Steps\n- Retry in a few minutes.\n";

/// Prospect context the prompts embed. Figures arrive precomputed; this
/// module never derives them.
#[derive(Debug, Clone)]
pub struct ProposalInput {
    pub agency: String,
    pub niche: String,
    pub bottleneck: String,
    pub monthly_leakage: f64,
    pub annual_leakage: f64,
}

/// Which models answered and everything that was tried along the way.
#[derive(Debug)]
pub struct ProposalDebug {
    pub pass1_model: &'static str,
    /// `None` when the polish pass was skipped or its output discarded.
    pub pass2_model: Option<&'static str>,
    pub tried_pass1: Vec<Attempt>,
    pub tried_pass2: Vec<Attempt>,
}

#[derive(Debug)]
pub enum ProposalOutcome {
    Generated {
        markdown: String,
        debug: ProposalDebug,
    },
    Failed {
        message: String,
        retry_after_seconds: Option<u64>,
        tried: Vec<Attempt>,
    },
}

/// Run the full two-pass pipeline for one request.
pub async fn generate(client: &GroqClient, input: &ProposalInput) -> ProposalOutcome {
    let pass1_messages = [
        Message::system(prompts::PASS1_SYSTEM),
        Message::user(prompts::pass1_user(
            &input.agency,
            &input.niche,
            &input.bottleneck,
            input.monthly_leakage,
            input.annual_leakage,
        )),
    ];

    let pass1 = call_with_fallback(client, &PASS1_LINEUP, &pass1_messages, PASS1_PARAMS).await;

    if !pass1.ok {
        let message = pass1
            .error
            .as_ref()
            .and_then(|e| e.message.clone())
            .unwrap_or_else(|| "Upstream failure".to_string());
        let retry_after_seconds = extract_retry_after_seconds(&message);
        tracing::warn!(attempts = pass1.tried.len(), %message, "pass 1 exhausted, returning placeholder");
        return ProposalOutcome::Failed { message, retry_after_seconds, tried: pass1.tried };
    }

    let base = pass1.content;
    let exec = sections::extract(&base, Section::ExecutiveSummary);
    let solution = sections::extract(&base, Section::SolutionArchitecture);

    if exec.is_none() && solution.is_none() {
        // Nothing recognizable to rewrite; ship the Pass 1 document as-is.
        tracing::info!("no polishable sections found, skipping polish pass");
        return ProposalOutcome::Generated {
            markdown: base,
            debug: ProposalDebug {
                pass1_model: pass1.model.id(),
                pass2_model: None,
                tried_pass1: pass1.tried,
                tried_pass2: Vec::new(),
            },
        };
    }

    let pass2_messages = [
        Message::system(prompts::PASS2_SYSTEM),
        Message::user(prompts::pass2_user(
            exec.unwrap_or(""),
            solution.unwrap_or(""),
        )),
    ];

    let pass2 = call_with_fallback(client, &PASS2_LINEUP, &pass2_messages, PASS2_PARAMS).await;

    let polished = pass2.ok && pass2.content.chars().count() > POLISH_MIN_CHARS;
    let markdown = if polished {
        sections::merge(&base, &pass2.content)
    } else {
        base
    };

    ProposalOutcome::Generated {
        markdown,
        debug: ProposalDebug {
            pass1_model: pass1.model.id(),
            pass2_model: polished.then(|| pass2.model.id()),
            tried_pass1: pass1.tried,
            tried_pass2: pass2.tried,
        },
    }
}

static RETRY_AFTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)try again in\s+(\d+)m([\d.]+)s").unwrap());

/// Parse the provider's "try again in <m>m<s>s" hint into whole seconds.
/// Absent or unparseable hints yield `None`, never an error.
pub fn extract_retry_after_seconds(message: &str) -> Option<u64> {
    let caps = RETRY_AFTER.captures(message)?;
    let mins: f64 = caps[1].parse().ok()?;
    let secs: f64 = caps[2].parse().ok()?;
    let total = (mins * 60.0 + secs).round_ties_even();
    Some(total.max(0.0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use super::models::Model;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_retry_after_minutes_and_fractional_seconds() {
        assert_eq!(
            extract_retry_after_seconds("Rate limit reached. Please try again in 1m30.5s."),
            Some(90)
        );
        assert_eq!(extract_retry_after_seconds("try again in 2m3.2s"), Some(123));
        assert_eq!(extract_retry_after_seconds("Try Again In 0m5s"), Some(5));
    }

    #[test]
    fn test_retry_after_absent_or_garbled() {
        assert_eq!(extract_retry_after_seconds("Upstream failure"), None);
        assert_eq!(extract_retry_after_seconds("try again later"), None);
        assert_eq!(extract_retry_after_seconds("try again in 1m..s"), None);
    }

    fn test_client(url: String, api_key: Option<&str>) -> GroqClient {
        GroqClient::new(&Config {
            groq_api_key: api_key.map(str::to_string),
            groq_url: url,
            webhook_url: None,
            webhook_secret: None,
        })
    }

    fn input() -> ProposalInput {
        ProposalInput {
            agency: "Acme Media".to_string(),
            niche: "B2B SaaS".to_string(),
            bottleneck: "Slow follow-up".to_string(),
            monthly_leakage: 12_500.0,
            annual_leakage: 150_000.0,
        }
    }

    fn full_document() -> String {
        format!(
            "## Executive Summary\n- Monthly Leakage: $12,500\n{filler}\n## Diagnosis\n- Follow-up gaps.\n\n## Revenue at Risk\n- Annual Leakage: $150,000\n\n## SOLUTION ARCHITECTURE: \u{201c}FlowStackOS 3-Module System\u{201d}\n- Module details.\n\n## Next Steps\n- Book a call.\n",
            filler = "- Supporting evidence line.\n".repeat(8)
        )
    }

    fn completion(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200)
            .set_body_json(json!({"choices": [{"message": {"content": content}}]}))
    }

    fn model_mock(model: Model, template: ResponseTemplate) -> Mock {
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "model": model.id() })))
            .respond_with(template)
    }

    #[tokio::test]
    async fn test_two_pass_merge_happy_path() {
        let server = MockServer::start().await;
        model_mock(Model::Scout, completion(&full_document())).mount(&server).await;
        let polished = format!(
            "## Executive Summary\n- Monthly Leakage: $12,500\n{}\n",
            "- Sharper, client-ready summary of the leak.\n".repeat(4)
        );
        model_mock(Model::Qwen32b, completion(&polished)).mount(&server).await;

        let client = test_client(server.uri(), Some("test-key"));
        let outcome = generate(&client, &input()).await;

        let ProposalOutcome::Generated { markdown, debug } = outcome else {
            panic!("expected success");
        };
        assert!(markdown.contains("Sharper, client-ready summary"));
        assert!(!markdown.contains("Supporting evidence line."));
        // Untouched sections survive from Pass 1.
        assert!(markdown.contains("- Follow-up gaps."));
        assert!(markdown.contains("- Book a call."));
        assert_eq!(debug.pass1_model, Model::Scout.id());
        assert_eq!(debug.pass2_model, Some(Model::Qwen32b.id()));
        assert_eq!(debug.tried_pass1.len(), 1);
        assert_eq!(debug.tried_pass2.len(), 1);
    }

    #[tokio::test]
    async fn test_pass1_falls_back_twice_then_succeeds() {
        let server = MockServer::start().await;
        let limited = ResponseTemplate::new(429).set_body_json(json!({
            "error": {"message": "Rate limit reached", "code": "rate_limit_exceeded"}
        }));
        model_mock(Model::Scout, limited.clone()).mount(&server).await;
        model_mock(Model::Qwen32b, limited).mount(&server).await;
        model_mock(Model::Llama8b, completion(&full_document())).mount(&server).await;

        let client = test_client(server.uri(), Some("test-key"));
        let outcome = generate(&client, &input()).await;

        let ProposalOutcome::Generated { debug, .. } = outcome else {
            panic!("expected success");
        };
        assert_eq!(debug.pass1_model, Model::Llama8b.id());
        assert_eq!(debug.tried_pass1.len(), 3);
        // Pass 2 leads with Qwen, which is still rate-limited here, then
        // Scout (also limited), then the 8B again.
        assert_eq!(debug.tried_pass2.len(), 3);
    }

    #[tokio::test]
    async fn test_short_polish_output_keeps_pass1_document() {
        let server = MockServer::start().await;
        model_mock(Model::Scout, completion(&full_document())).mount(&server).await;
        // Under the acceptance threshold: the polish fallback rejects it and
        // the pipeline keeps the Pass 1 document.
        model_mock(Model::Qwen32b, completion("## Executive Summary\n- Meh."))
            .mount(&server)
            .await;

        let client = test_client(server.uri(), Some("test-key"));
        let outcome = generate(&client, &input()).await;

        let ProposalOutcome::Generated { markdown, debug } = outcome else {
            panic!("expected success");
        };
        // The client trims completions, so Pass 1's document comes back
        // without the trailing newline but otherwise untouched.
        assert_eq!(markdown, full_document().trim());
        assert_eq!(debug.pass2_model, None);
    }

    #[tokio::test]
    async fn test_pass1_exhaustion_returns_failure_with_retry_hint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {
                    "message": "Rate limit reached for model. Please try again in 2m59.56s.",
                    "code": "invalid_request_error"
                }
            })))
            .mount(&server)
            .await;

        let client = test_client(server.uri(), Some("test-key"));
        let outcome = generate(&client, &input()).await;

        let ProposalOutcome::Failed { message, retry_after_seconds, tried } = outcome else {
            panic!("expected failure");
        };
        assert!(message.contains("try again in 2m59.56s"));
        assert_eq!(retry_after_seconds, Some(180));
        // 400 is non-retryable: one attempt only.
        assert_eq!(tried.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_credential_exhausts_and_fails_without_hint() {
        let client = test_client("http://127.0.0.1:1/never".to_string(), None);
        let outcome = generate(&client, &input()).await;

        let ProposalOutcome::Failed { message, retry_after_seconds, tried } = outcome else {
            panic!("expected failure");
        };
        // Exhaustion deliberately discards error detail, so the generic
        // message stands even though every attempt was a misconfig.
        assert_eq!(message, "Upstream failure");
        assert_eq!(retry_after_seconds, None);
        assert_eq!(tried.len(), 3);
        assert!(tried.iter().all(|a| a.code.as_deref() == Some("server_misconfig")));
    }

    #[tokio::test]
    async fn test_document_without_known_sections_skips_polish() {
        let server = MockServer::start().await;
        let unstructured = format!("Report without headings.\n{}", "More prose. ".repeat(30));
        model_mock(Model::Scout, completion(&unstructured)).mount(&server).await;

        let client = test_client(server.uri(), Some("test-key"));
        let outcome = generate(&client, &input()).await;

        let ProposalOutcome::Generated { markdown, debug } = outcome else {
            panic!("expected success");
        };
        assert_eq!(markdown, unstructured.trim());
        assert_eq!(debug.pass2_model, None);
        assert!(debug.tried_pass2.is_empty());
    }
}
