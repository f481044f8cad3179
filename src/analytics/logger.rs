use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::evaluation::EvaluationResponse;

// ---------------------------------------------------------------------------
// Evaluation log entry (JSONL)
// ---------------------------------------------------------------------------

/// A single entry in the evaluation log (`~/.ragjudge/evaluation-log.jsonl`).
///
/// One line per `/evaluate` call, successful or not. Read back by the
/// reporter for `ragjudge stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationLogEntry {
    pub timestamp: String,
    pub question: String,
    /// Model that generated the answers and the verdict.
    pub model: String,
    #[serde(default = "default_true")]
    pub success: bool,
    /// Winner label (only set on success).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub final_winner: Option<String>,
    /// Per-model averages in verdict order (only set on success).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scores: Vec<ModelScore>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub docs_used: Option<usize>,
    pub latency_ms: u64,
    /// Error chain (only set on failure).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

/// Average score of one model in one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelScore {
    pub model: String,
    pub average: f64,
}

fn default_true() -> bool {
    true
}

impl EvaluationLogEntry {
    /// Build an entry from a pipeline result.
    pub fn from_result(
        question: &str,
        model: &str,
        result: &Result<EvaluationResponse>,
        latency_ms: u64,
    ) -> Self {
        let mut entry = Self {
            timestamp: Utc::now().to_rfc3339(),
            question: question.to_string(),
            model: model.to_string(),
            success: result.is_ok(),
            final_winner: None,
            scores: Vec::new(),
            docs_used: None,
            latency_ms,
            error: None,
        };

        match result {
            Ok(response) => {
                entry.final_winner = Some(response.evaluation.final_winner.clone());
                entry.docs_used = Some(response.answers.docs_used);
                entry.scores = response
                    .evaluation
                    .evaluation
                    .iter()
                    .filter_map(|e| {
                        e.effective_average().map(|average| ModelScore {
                            model: e.model.clone(),
                            average,
                        })
                    })
                    .collect();
            }
            Err(e) => entry.error = Some(format!("{e:#}")),
        }

        entry
    }
}

// ---------------------------------------------------------------------------
// Log file
// ---------------------------------------------------------------------------

/// Append-only JSONL evaluation log.
///
/// All writes are best-effort: a full disk or a read-only home never fails
/// an evaluation.
#[derive(Debug, Clone)]
pub struct EvaluationLog {
    path: PathBuf,
}

impl EvaluationLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an entry, logging (not returning) any I/O failure.
    pub fn record(&self, entry: &EvaluationLogEntry) {
        if let Err(e) = self.append(entry) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to write evaluation log");
        }
    }

    fn append(&self, entry: &EvaluationLogEntry) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let json = serde_json::to_string(entry)?;
        writeln!(file, "{json}")?;

        Ok(())
    }

    /// Read all entries. Malformed lines are skipped; a missing file yields
    /// an empty list.
    pub fn read_all(&self) -> Vec<EvaluationLogEntry> {
        let Ok(file) = fs::File::open(&self.path) else {
            return Vec::new();
        };

        BufReader::new(file)
            .lines()
            .map_while(Result::ok)
            .filter_map(|line| serde_json::from_str::<EvaluationLogEntry>(&line).ok())
            .collect()
    }

    /// Read entries from the last `days` days, or all when `None`.
    pub fn read_since_days(&self, days: Option<u32>) -> Vec<EvaluationLogEntry> {
        let entries = self.read_all();

        let Some(days) = days else {
            return entries;
        };

        let cutoff = (Utc::now() - chrono::Duration::days(i64::from(days))).to_rfc3339();
        entries
            .into_iter()
            .filter(|e| e.timestamp >= cutoff)
            .collect()
    }
}
