use std::time::Duration;

/// Models available for proposal generation, all served by Groq.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Model {
    /// Llama 4 Scout - strongest at following the must-include figure rules
    Scout,
    /// Qwen 3 32B - best prose, used first for the polish pass
    Qwen32b,
    /// Llama 3.1 8B - cheap last resort when the larger models are saturated
    Llama8b,
}

impl Model {
    pub fn id(&self) -> &'static str {
        match self {
            Model::Scout => "meta-llama/llama-4-scout-17b-16e-instruct",
            Model::Qwen32b => "qwen/qwen3-32b",
            Model::Llama8b => "llama-3.1-8b-instant",
        }
    }
}

/// Pass 1 writes the full report: Scout leads for figure faithfulness.
pub const PASS1_LINEUP: [Model; 3] = [Model::Scout, Model::Qwen32b, Model::Llama8b];

/// Pass 2 rewrites two sections: Qwen leads for prose quality.
pub const PASS2_LINEUP: [Model; 3] = [Model::Qwen32b, Model::Scout, Model::Llama8b];

/// Generation parameters shared by every attempt within one pass.
#[derive(Debug, Clone, Copy)]
pub struct PassParams {
    pub max_tokens: u32,
    pub temperature: f32,
    /// Wall-clock budget per provider call; the in-flight request is aborted
    /// when it expires.
    pub timeout: Duration,
}

/// Full document: larger budget, low temperature so figures survive intact.
pub const PASS1_PARAMS: PassParams = PassParams {
    max_tokens: 1200,
    temperature: 0.2,
    timeout: Duration::from_secs(25),
};

/// Targeted rewrite: smaller budget, slightly warmer for better prose.
pub const PASS2_PARAMS: PassParams = PassParams {
    max_tokens: 700,
    temperature: 0.25,
    timeout: Duration::from_secs(20),
};
