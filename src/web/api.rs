//! JSON API handlers.
//!
//! Each handler corresponds to an endpoint and returns a
//! `Response<Cursor<Vec<u8>>>` with JSON content.

use std::io::Cursor;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tiny_http::{Response, StatusCode};

use crate::config::{self, RagJudgeConfig};
use crate::evaluation::pipeline::{Pipeline, QUESTION_REQUIRED};

use super::{AppState, content_type_json, json_error};

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// `POST /evaluate` body. A missing question is treated as empty.
#[derive(Debug, Deserialize)]
struct EvaluateRequest {
    #[serde(default)]
    question: Option<String>,
}

/// Health API response.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    model: String,
    base_url: String,
    api_key_env: String,
    api_key_set: bool,
    documents: usize,
    docs_path: String,
    config_exists: bool,
    log_exists: bool,
}

/// Config API response: the effective config as JSON plus its TOML form.
#[derive(Debug, Serialize)]
struct ConfigResponse<'a> {
    config: &'a RagJudgeConfig,
    toml_text: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a JSON success response.
fn json_response<T: Serialize>(data: &T) -> Result<Response<Cursor<Vec<u8>>>> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(200)))
}

/// Pull the trimmed question out of a request body; `None` when missing,
/// blank or not JSON.
fn question_from_body(body: &str) -> Option<String> {
    let req: EvaluateRequest = serde_json::from_str(body).ok()?;
    let question = req.question?.trim().to_string();
    (!question.is_empty()).then_some(question)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `POST /evaluate` — answer with and without retrieval, then judge.
///
/// Expects JSON body: `{ "question": "What is RAG?" }`
pub fn post_evaluate(pipeline: &Pipeline, body: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let Some(question) = question_from_body(body) else {
        return Ok(json_error(StatusCode(400), QUESTION_REQUIRED));
    };

    tracing::info!(question = %question, "evaluating");
    let response = pipeline.evaluate(&question)?;
    json_response(&response)
}

/// `GET /api/health` — readiness summary.
pub fn get_health(state: &AppState) -> Result<Response<Cursor<Vec<u8>>>> {
    let llm = &state.config.llm;
    let config_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let log_exists = state
        .config
        .evaluation_log_path()
        .map(|p| p.exists())
        .unwrap_or(false);

    let resp = HealthResponse {
        status: "ok",
        model: llm.model.clone(),
        base_url: llm.base_url.clone(),
        api_key_env: llm.api_key_env.clone(),
        api_key_set: std::env::var(&llm.api_key_env).is_ok_and(|v| !v.trim().is_empty()),
        documents: state.pipeline.document_count(),
        docs_path: state.config.retrieval.docs_path.clone(),
        config_exists,
        log_exists,
    };

    json_response(&resp)
}

/// `GET /api/config` — current effective configuration.
pub fn get_config(config: &RagJudgeConfig) -> Result<Response<Cursor<Vec<u8>>>> {
    let toml_text = toml::to_string_pretty(config).context("failed to serialize config")?;
    json_response(&ConfigResponse { config, toml_text })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
