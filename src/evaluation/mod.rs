//! Evaluation data model shared by the server pipeline and the controller.
//!
//! The wire shape of a successful `POST /evaluate` response:
//!
//! ```json
//! {
//!   "question": "...",
//!   "answers": { "non_rag": "...", "rag": "...", "docs_used": 2 },
//!   "evaluation": {
//!     "evaluation": [
//!       { "model": "Non-RAG", "scores": { "accuracy": 4, ... },
//!         "average_score": 3.75, "justification": "..." }
//!     ],
//!     "final_winner": "RAG",
//!     "reason": "..."
//!   }
//! }
//! ```
//!
//! Judge output is not always tidy, so deserialization is lenient: scores
//! may arrive as integers, floats, numeric strings or `"N/A"`, and missing
//! verdict fields fall back to defaults.

pub mod pipeline;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Model label the judge uses for the plain answer.
pub const NON_RAG_MODEL: &str = "Non-RAG";

/// Model label the judge uses for the retrieval-augmented answer.
pub const RAG_MODEL: &str = "RAG";

/// Complete response body of `POST /evaluate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResponse {
    pub question: String,
    pub answers: Answers,
    pub evaluation: Verdict,
}

/// The two generated answers plus the number of documents fed to RAG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answers {
    pub non_rag: String,
    pub rag: String,
    pub docs_used: usize,
}

/// The judge's verdict over both answers.
///
/// When built from judge output, `raw` keeps the judge's JSON exactly as
/// written and is what gets serialized, so integer scores, `"N/A"` and any
/// extra fields reach the client untouched. The typed fields only drive
/// rendering, logging and stats.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Verdict {
    #[serde(default)]
    pub evaluation: Vec<ModelEvaluation>,
    #[serde(default = "default_winner")]
    pub final_winner: String,
    #[serde(default = "default_reason")]
    pub reason: String,
    #[serde(skip)]
    pub raw: Option<serde_json::Value>,
}

impl Verdict {
    /// Parse a judge JSON document, keeping the original alongside.
    pub fn from_judge_value(value: serde_json::Value) -> serde_json::Result<Self> {
        let mut verdict = Self::deserialize(&value)?;
        verdict.raw = Some(value);
        Ok(verdict)
    }
}

impl Serialize for Verdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if let Some(raw) = &self.raw {
            return raw.serialize(serializer);
        }

        #[derive(Serialize)]
        struct Typed<'a> {
            evaluation: &'a [ModelEvaluation],
            final_winner: &'a str,
            reason: &'a str,
        }

        Typed {
            evaluation: &self.evaluation,
            final_winner: &self.final_winner,
            reason: &self.reason,
        }
        .serialize(serializer)
    }
}

fn default_winner() -> String {
    "Unknown".to_string()
}

fn default_reason() -> String {
    "No reason provided.".to_string()
}

/// Per-model score record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEvaluation {
    pub model: String,
    #[serde(default)]
    pub scores: Scores,
    #[serde(
        default,
        deserialize_with = "lenient_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub average_score: Option<f64>,
    #[serde(default)]
    pub justification: String,
}

impl ModelEvaluation {
    /// The judge's average, or the mean of the scored criteria when the
    /// judge left it out.
    pub fn effective_average(&self) -> Option<f64> {
        self.average_score.or_else(|| self.scores.mean())
    }

    /// Whether this record belongs to the given winner label.
    pub fn is_winner(&self, final_winner: &str) -> bool {
        self.model == final_winner
    }
}

/// Named numeric criteria. `grounding` only applies to the RAG answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    #[serde(default, deserialize_with = "lenient_score", skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(default, deserialize_with = "lenient_score", skip_serializing_if = "Option::is_none")]
    pub completeness: Option<f64>,
    #[serde(default, deserialize_with = "lenient_score", skip_serializing_if = "Option::is_none")]
    pub relevance: Option<f64>,
    #[serde(default, deserialize_with = "lenient_score", skip_serializing_if = "Option::is_none")]
    pub clarity: Option<f64>,
    #[serde(default, deserialize_with = "lenient_score", skip_serializing_if = "Option::is_none")]
    pub grounding: Option<f64>,
}

impl Scores {
    /// All criteria in display order.
    pub fn criteria(&self) -> [(&'static str, Option<f64>); 5] {
        [
            ("accuracy", self.accuracy),
            ("completeness", self.completeness),
            ("relevance", self.relevance),
            ("clarity", self.clarity),
            ("grounding", self.grounding),
        ]
    }

    /// Mean of the criteria that carry a real score. `0` counts as unscored
    /// because the judge is told to use it for "not applicable".
    pub fn mean(&self) -> Option<f64> {
        let scored: Vec<f64> = self
            .criteria()
            .iter()
            .filter_map(|(_, v)| *v)
            .filter(|v| *v > 0.0)
            .collect();
        if scored.is_empty() {
            None
        } else {
            Some(scored.iter().sum::<f64>() / scored.len() as f64)
        }
    }
}

/// Accept numbers, numeric strings, `"N/A"` and `null` for a score.
fn lenient_score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
