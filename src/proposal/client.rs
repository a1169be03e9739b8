use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::models::{Model, PassParams};
use crate::config::Config;

/// One chat message in provider wire format.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: &'static str,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system", content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user", content: content.into() }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    max_tokens: u32,
}

/// Machine-readable error detail, either from the provider's error envelope
/// or synthesized locally (missing key, transport failure).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderError {
    pub code: Option<String>,
    pub message: Option<String>,
}

impl ProviderError {
    fn local(code: &str, message: impl Into<String>) -> Self {
        Self { code: Some(code.to_string()), message: Some(message.into()) }
    }
}

/// Classified result of a single provider call.
///
/// Never an `Err`: transport failures, provider errors, and misconfiguration
/// are all folded into the outcome so the fallback loop can always make a
/// forward decision.
#[derive(Debug)]
pub struct CallOutcome {
    pub ok: bool,
    pub status: u16,
    pub error: Option<ProviderError>,
    /// Generated text, trimmed; empty when the call failed or the body had
    /// no recognizable completion.
    pub content: String,
    pub raw: Option<Value>,
}

impl CallOutcome {
    fn failed(status: u16, error: ProviderError) -> Self {
        Self { ok: false, status, error: Some(error), content: String::new(), raw: None }
    }

    pub fn error_code(&self) -> Option<&str> {
        self.error.as_ref().and_then(|e| e.code.as_deref())
    }
}

/// Client for Groq's OpenAI-compatible chat completions endpoint.
///
/// Credentials and URL are captured at construction; per-call state is
/// limited to the request itself, so one client serves concurrent requests.
pub struct GroqClient {
    http: reqwest::Client,
    api_key: Option<String>,
    url: String,
}

impl GroqClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: config.groq_api_key.clone(),
            url: config.groq_url.clone(),
        }
    }

    /// Issue exactly one chat-completion call and classify the result.
    ///
    /// The request is aborted at `params.timeout`; timeouts and network
    /// failures come back as a synthesized 504 / `fetch_failed` outcome.
    pub async fn call(&self, model: Model, messages: &[Message], params: PassParams) -> CallOutcome {
        let Some(api_key) = self.api_key.as_deref() else {
            return CallOutcome::failed(
                500,
                ProviderError::local("server_misconfig", "Missing GROQ_API_KEY on server"),
            );
        };

        let request = ChatRequest {
            model: model.id(),
            messages,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        let sent = self
            .http
            .post(&self.url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", api_key))
            .timeout(params.timeout)
            .json(&request)
            .send()
            .await;

        let response = match sent {
            Ok(response) => response,
            Err(err) => {
                return CallOutcome::failed(504, ProviderError::local("fetch_failed", err.to_string()));
            }
        };

        let status = response.status().as_u16();
        let ok = response.status().is_success();
        let raw: Option<Value> = response.json().await.ok();

        let content = first_choice_text(raw.as_ref()).trim().to_string();
        let error = raw
            .as_ref()
            .and_then(|body| body.get("error"))
            .and_then(|envelope| serde_json::from_value(envelope.clone()).ok());

        CallOutcome { ok, status, error, content, raw }
    }
}

/// Pull the generated text out of the first completion choice, accepting both
/// the structured `message.content` shape and the legacy plain `text` field.
fn first_choice_text(raw: Option<&Value>) -> &str {
    raw.and_then(|body| body.get("choices")?.get(0))
        .and_then(|choice| choice.pointer("/message/content").or_else(|| choice.get("text")))
        .and_then(Value::as_str)
        .unwrap_or("")
}
