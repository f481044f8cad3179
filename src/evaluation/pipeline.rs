//! Server-side evaluation: answer twice, judge once.
//!
//! For one question the pipeline
//!
//! 1. asks the model for a concise answer with no context (Non-RAG),
//! 2. retrieves the top-k documents and asks again with them as context (RAG),
//! 3. has the judge score both answers,
//!
//! and assembles an [`EvaluationResponse`]. Every run is appended to the
//! evaluation log when one is configured.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};

use super::{Answers, EvaluationResponse};
use crate::analytics::logger::{EvaluationLog, EvaluationLogEntry};
use crate::config::RagJudgeConfig;
use crate::controller::transport::Transport;
use crate::judge::Judge;
use crate::llm::prompts::{non_rag_prompt, rag_prompt};
use crate::llm::{DEFAULT_SYSTEM_PROMPT, LanguageModel, OpenAiClient};
use crate::rag::{RagEngine, format_context};

/// Message for a missing or blank question.
pub const QUESTION_REQUIRED: &str = "Question is required";

/// The full RAG vs Non-RAG evaluation pipeline.
pub struct Pipeline {
    llm: Arc<dyn LanguageModel>,
    rag: RagEngine,
    judge: Judge,
    top_k: usize,
    log: Option<EvaluationLog>,
}

impl Pipeline {
    /// Assemble a pipeline from its parts. The judge shares the answer model.
    pub fn new(llm: Arc<dyn LanguageModel>, rag: RagEngine, top_k: usize) -> Self {
        Self {
            judge: Judge::new(Arc::clone(&llm)),
            llm,
            rag,
            top_k,
            log: None,
        }
    }

    /// Build the production pipeline from configuration: OpenAI-compatible
    /// client, documents from `retrieval.docs_path`, optional log.
    pub fn from_config(config: &RagJudgeConfig) -> Result<Self> {
        let llm = OpenAiClient::from_config(&config.llm).context("failed to create LLM client")?;
        let rag = RagEngine::load(&config.retrieval.docs_path)?;

        let mut pipeline = Self::new(Arc::new(llm), rag, config.retrieval.top_k);
        if config.logging.enabled
            && let Some(path) = config.evaluation_log_path()
        {
            pipeline = pipeline.with_log(EvaluationLog::new(path));
        }
        Ok(pipeline)
    }

    /// Record every evaluation to `log`.
    pub fn with_log(mut self, log: EvaluationLog) -> Self {
        self.log = Some(log);
        self
    }

    /// Number of documents currently available for retrieval.
    pub fn document_count(&self) -> usize {
        self.rag.documents().len()
    }

    /// Evaluate one question.
    ///
    /// A blank question fails with [`QUESTION_REQUIRED`] before any model
    /// call and is not logged.
    pub fn evaluate(&self, question: &str) -> Result<EvaluationResponse> {
        let question = question.trim();
        if question.is_empty() {
            anyhow::bail!(QUESTION_REQUIRED);
        }

        let start = Instant::now();
        let result = self.run(question);
        let latency_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(response) => tracing::info!(
                winner = %response.evaluation.final_winner,
                docs_used = response.answers.docs_used,
                latency_ms,
                "evaluation complete"
            ),
            Err(e) => tracing::error!(error = %format!("{e:#}"), latency_ms, "evaluation failed"),
        }

        if let Some(log) = &self.log {
            log.record(&EvaluationLogEntry::from_result(
                question,
                self.llm.model_name(),
                &result,
                latency_ms,
            ));
        }

        result
    }

    fn run(&self, question: &str) -> Result<EvaluationResponse> {
        let non_rag = self
            .llm
            .complete(&non_rag_prompt(question), DEFAULT_SYSTEM_PROMPT)
            .context("failed to generate Non-RAG answer")?;

        let docs = self.rag.retrieve(question, self.top_k);
        let context = format_context(&docs);
        tracing::debug!(docs = docs.len(), "documents retrieved");

        let rag = self
            .llm
            .complete(&rag_prompt(&context, question), DEFAULT_SYSTEM_PROMPT)
            .context("failed to generate RAG answer")?;

        let verdict = self.judge.evaluate(question, &non_rag, &rag, &context)?;

        Ok(EvaluationResponse {
            question: question.to_string(),
            answers: Answers {
                non_rag,
                rag,
                docs_used: docs.len(),
            },
            evaluation: verdict,
        })
    }
}

/// Lets the controller run against the pipeline in-process, without HTTP.
impl Transport for Pipeline {
    fn evaluate(&self, question: &str) -> Result<String> {
        let response = Pipeline::evaluate(self, question)?;
        serde_json::to_string(&response).context("failed to serialize evaluation response")
    }
}
