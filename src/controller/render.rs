//! Pure formatting of an evaluation response into view-ready values.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::evaluation::{EvaluationResponse, ModelEvaluation, NON_RAG_MODEL, Verdict};

/// Shown in place of a required criterion the judge did not score.
pub const MISSING_SCORE: &str = "-";

/// Shown in place of an optional criterion (grounding) that does not apply.
pub const NOT_APPLICABLE: &str = "N/A";

/// Placeholder row text for a verdict with no entries.
pub const EMPTY_TABLE_MESSAGE: &str = "No evaluation entries";

/// Keys kept in the JSON preview, in display order.
const PREVIEW_KEYS: [&str; 3] = ["question", "answers", "evaluation"];

/// One row of the score table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRow {
    pub model: String,
    pub accuracy: String,
    pub completeness: String,
    pub relevance: String,
    pub clarity: String,
    pub grounding: String,
    /// Average rounded to one decimal; rendered bold.
    pub average: String,
    /// Whether this row is the declared winner (rendered with emphasis).
    pub winner: bool,
}

/// The score table: one row per evaluation entry, or a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreTable {
    Rows(Vec<ScoreRow>),
    Empty(&'static str),
}

/// Which answer panel a justification belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerSlot {
    NonRag,
    Rag,
}

impl AnswerSlot {
    /// `Non-RAG` goes to the Non-RAG panel; every other label to the RAG one.
    pub fn for_model(model: &str) -> Self {
        if model == NON_RAG_MODEL {
            Self::NonRag
        } else {
            Self::Rag
        }
    }
}

/// Format a criterion score. Missing and zero scores show `placeholder`.
pub fn format_score(score: Option<f64>, placeholder: &str) -> String {
    match score {
        Some(v) if v != 0.0 => format!("{v}"),
        _ => placeholder.to_string(),
    }
}

/// Format an average to exactly one decimal, rounding halves away from
/// zero (`8` → `8.0`, `4.25` → `4.3`).
pub fn format_average(average: f64) -> String {
    let rounded = (average * 10.0).round() / 10.0;
    format!("{rounded:.1}")
}

/// Build one table row.
pub fn score_row(entry: &ModelEvaluation, final_winner: &str) -> ScoreRow {
    let s = &entry.scores;
    ScoreRow {
        model: entry.model.clone(),
        accuracy: format_score(s.accuracy, MISSING_SCORE),
        completeness: format_score(s.completeness, MISSING_SCORE),
        relevance: format_score(s.relevance, MISSING_SCORE),
        clarity: format_score(s.clarity, MISSING_SCORE),
        grounding: format_score(s.grounding, NOT_APPLICABLE),
        average: entry
            .effective_average()
            .map(format_average)
            .unwrap_or_else(|| MISSING_SCORE.to_string()),
        winner: entry.is_winner(final_winner),
    }
}

/// Build the score table in input order.
pub fn score_table(verdict: &Verdict) -> ScoreTable {
    if verdict.evaluation.is_empty() {
        return ScoreTable::Empty(EMPTY_TABLE_MESSAGE);
    }
    ScoreTable::Rows(
        verdict
            .evaluation
            .iter()
            .map(|entry| score_row(entry, &verdict.final_winner))
            .collect(),
    )
}

/// Justifications keyed by answer panel. When several entries map to the
/// same panel the last one wins.
pub fn justifications(verdict: &Verdict) -> Vec<(AnswerSlot, &str)> {
    verdict
        .evaluation
        .iter()
        .map(|e| (AnswerSlot::for_model(&e.model), e.justification.as_str()))
        .collect()
}

/// The reduced `{question, answers, evaluation}` view of the raw response,
/// pretty-printed with two-space indentation. Values are copied verbatim
/// from the server's JSON, so nothing the typed model drops is lost.
pub fn json_preview(raw: &Value) -> Result<String> {
    let object = raw
        .as_object()
        .context("evaluation response is not a JSON object")?;

    let mut reduced = Map::new();
    for key in PREVIEW_KEYS {
        reduced.insert(key.to_string(), object.get(key).cloned().unwrap_or(Value::Null));
    }

    serde_json::to_string_pretty(&Value::Object(reduced)).context("failed to format JSON preview")
}

/// A response that parsed both as raw JSON and as the typed model.
#[derive(Debug, Clone)]
pub struct ParsedResponse {
    pub response: EvaluationResponse,
    pub raw: Value,
}

/// Parse a response body. Any failure here counts as a request failure.
pub fn parse_response(body: &str) -> Result<ParsedResponse> {
    let raw: Value = serde_json::from_str(body).context("evaluation response is not valid JSON")?;
    let response = EvaluationResponse::deserialize(&raw)
        .context("evaluation response has an unexpected shape")?;
    Ok(ParsedResponse { response, raw })
}
