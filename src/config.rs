//! Process configuration for the proposal service.
//!
//! Everything comes from the environment once at startup and is passed down
//! explicitly; nothing re-reads the environment mid-request. A missing API
//! key is not a startup error - the model client synthesizes a
//! `server_misconfig` outcome per call so the caller still gets a well-formed
//! response envelope.

/// Groq's OpenAI-compatible chat completions endpoint.
const DEFAULT_GROQ_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

#[derive(Debug, Clone)]
pub struct Config {
    /// Bearer token for the LLM provider. Absent => every generation attempt
    /// reports `server_misconfig` without touching the network.
    pub groq_api_key: Option<String>,
    /// Provider chat-completions URL. Overridable for tests and self-hosted
    /// gateways.
    pub groq_url: String,
    /// Automation webhook the lead endpoint forwards to.
    pub webhook_url: Option<String>,
    /// Shared secret sent alongside forwarded leads.
    pub webhook_secret: Option<String>,
}

impl Config {
    /// Load configuration from the environment. Empty values count as unset.
    pub fn from_env() -> Self {
        Self {
            groq_api_key: env_non_empty("GROQ_API_KEY"),
            groq_url: env_non_empty("GROQ_API_URL").unwrap_or_else(|| DEFAULT_GROQ_URL.to_string()),
            webhook_url: env_non_empty("N8N_WEBHOOK_URL"),
            webhook_secret: env_non_empty("N8N_WEBHOOK_SECRET"),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.groq_api_key.is_some()
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
