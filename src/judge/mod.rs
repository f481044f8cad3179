//! LLM-as-a-judge scoring of a Non-RAG answer against a RAG answer.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::evaluation::Verdict;
use crate::llm::LanguageModel;
use crate::llm::prompts::{JUDGE_SYSTEM_PROMPT, judge_user_prompt};
use crate::llm::validation::{excerpt, extract_json_object};

/// How much raw judge output to keep in a parse error.
const RAW_EXCERPT_CHARS: usize = 300;

/// Scores two answers with a language model.
pub struct Judge {
    llm: Arc<dyn LanguageModel>,
}

impl Judge {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    /// Ask the model for a verdict and parse it.
    ///
    /// Fails when the model call fails, when the output holds no JSON
    /// object, when the JSON does not match the verdict shape, or when the
    /// model answered with an `{"error": ...}` document.
    pub fn evaluate(
        &self,
        question: &str,
        answer_non_rag: &str,
        answer_rag: &str,
        rag_context: &str,
    ) -> Result<Verdict> {
        let prompt = judge_user_prompt(question, rag_context, answer_non_rag, answer_rag);
        let raw = self
            .llm
            .complete_json(&prompt, JUDGE_SYSTEM_PROMPT)
            .context("judge request failed")?;

        parse_verdict(&raw)
    }
}

/// Parse raw judge output into a [`Verdict`].
pub fn parse_verdict(raw: &str) -> Result<Verdict> {
    let json = extract_json_object(raw)
        .with_context(|| format!("failed to parse JSON from judge: {}", excerpt(raw, RAW_EXCERPT_CHARS)))?;

    let value: serde_json::Value = serde_json::from_str(json)
        .with_context(|| format!("failed to parse JSON from judge: {}", excerpt(raw, RAW_EXCERPT_CHARS)))?;

    if let Some(err) = value.get("error") {
        anyhow::bail!("judge reported an error: {err}");
    }

    Verdict::from_judge_value(value).context("judge output does not match the verdict structure")
}
