//! Evaluation reporter — aggregates the JSONL evaluation log for
//! `ragjudge stats`.

use std::collections::HashMap;

use crate::analytics::logger::EvaluationLogEntry;

// ---------------------------------------------------------------------------
// Aggregated stats
// ---------------------------------------------------------------------------

/// Summary statistics over a set of evaluations.
#[derive(Debug, Default)]
pub struct Stats {
    pub total_evaluations: usize,
    pub failures: usize,
    pub avg_latency_ms: f64,
    /// Per-model aggregates, sorted by wins then name.
    pub model_stats: Vec<ModelStat>,
}

impl Stats {
    /// Number of successful evaluations.
    pub fn successes(&self) -> usize {
        self.total_evaluations - self.failures
    }
}

/// Aggregates for one model label (e.g. `RAG`).
#[derive(Debug, Clone, PartialEq)]
pub struct ModelStat {
    pub model: String,
    /// Evaluations this model was declared winner of.
    pub wins: usize,
    /// Evaluations in which this model received an average score.
    pub scored: usize,
    pub mean_average: f64,
}

impl ModelStat {
    /// Win rate over all successful evaluations, in percent.
    pub fn win_pct(&self, successes: usize) -> f64 {
        if successes == 0 {
            0.0
        } else {
            (self.wins as f64 / successes as f64) * 100.0
        }
    }
}

/// Build stats from log entries.
pub fn build_stats(entries: &[EvaluationLogEntry]) -> Stats {
    if entries.is_empty() {
        return Stats::default();
    }

    let failures = entries.iter().filter(|e| !e.success).count();
    let total_latency: u64 = entries.iter().map(|e| e.latency_ms).sum();

    #[derive(Default)]
    struct Acc {
        wins: usize,
        scored: usize,
        sum: f64,
    }

    let mut per_model: HashMap<String, Acc> = HashMap::new();
    for entry in entries.iter().filter(|e| e.success) {
        for score in &entry.scores {
            let acc = per_model.entry(score.model.clone()).or_default();
            acc.scored += 1;
            acc.sum += score.average;
        }
        if let Some(winner) = &entry.final_winner {
            per_model.entry(winner.clone()).or_default().wins += 1;
        }
    }

    let mut model_stats: Vec<ModelStat> = per_model
        .into_iter()
        .map(|(model, acc)| ModelStat {
            model,
            wins: acc.wins,
            scored: acc.scored,
            mean_average: if acc.scored == 0 {
                0.0
            } else {
                acc.sum / acc.scored as f64
            },
        })
        .collect();
    model_stats.sort_by(|a, b| b.wins.cmp(&a.wins).then_with(|| a.model.cmp(&b.model)));

    Stats {
        total_evaluations: entries.len(),
        failures,
        avg_latency_ms: total_latency as f64 / entries.len() as f64,
        model_stats,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
