/// LLM access for answer generation and judging.
///
/// Both answers and the judge verdict come from the same OpenAI-compatible
/// chat completion endpoint (OpenRouter by default). The [`LanguageModel`]
/// trait is the seam the pipeline and judge depend on, so tests can swap in
/// scripted models without a network.
use anyhow::Result;

pub mod openai;
pub mod prompts;
pub mod validation;

pub use openai::OpenAiClient;

/// System prompt used when the caller has nothing more specific.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// A chat model that turns a prompt into text.
pub trait LanguageModel: Send + Sync {
    /// Free-form completion used for the Non-RAG and RAG answers.
    fn complete(&self, prompt: &str, system: &str) -> Result<String>;

    /// Completion that must come back as a JSON document.
    fn complete_json(&self, prompt: &str, system: &str) -> Result<String>;

    /// Model identifier for logs and reports.
    fn model_name(&self) -> &str;
}
