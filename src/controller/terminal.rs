//! Terminal rendering of the evaluation page for `ragjudge ask`.
//!
//! [`TerminalView`] prints each render target as the controller fills it:
//! answers side by side in order, the score table, justifications, the
//! verdict and finally the JSON preview on stdout (so it can be piped).
//! Status and alerts go to stderr.

use anyhow::{Context, Result};
use colored::Colorize;

use super::render::{AnswerSlot, ScoreRow, ScoreTable};
use super::{Clipboard, View};

/// Label of the copy action before any copy.
pub const COPY_LABEL: &str = "Copy JSON";

/// Terminal-backed [`View`].
#[derive(Debug)]
pub struct TerminalView {
    input: String,
    loading: bool,
    results_visible: bool,
    submit_enabled: bool,
    json_output: String,
    copy_label: String,
    /// Print the JSON preview when it is rendered.
    print_json: bool,
}

impl Default for TerminalView {
    fn default() -> Self {
        Self {
            input: String::new(),
            loading: false,
            results_visible: false,
            submit_enabled: true,
            json_output: String::new(),
            copy_label: COPY_LABEL.to_string(),
            print_json: true,
        }
    }
}

impl TerminalView {
    pub fn new(print_json: bool) -> Self {
        Self {
            print_json,
            ..Self::default()
        }
    }

    /// Replace the question input.
    pub fn set_input(&mut self, text: &str) {
        self.input = text.to_string();
    }

    /// Append a line to the question input (newline-separated).
    pub fn push_line(&mut self, line: &str) {
        if !self.input.is_empty() {
            self.input.push('\n');
        }
        self.input.push_str(line);
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn results_visible(&self) -> bool {
        self.results_visible
    }

    pub fn submit_enabled(&self) -> bool {
        self.submit_enabled
    }
}

impl View for TerminalView {
    fn question_input(&self) -> String {
        self.input.clone()
    }

    fn alert(&mut self, message: &str) {
        eprintln!("{} {}", "!".red().bold(), message.red());
    }

    fn set_loading(&mut self, visible: bool) {
        if visible && !self.loading {
            eprintln!("{}", "Judge is evaluating...".dimmed());
        }
        self.loading = visible;
    }

    fn set_results_visible(&mut self, visible: bool) {
        self.results_visible = visible;
    }

    fn set_submit_enabled(&mut self, enabled: bool) {
        self.submit_enabled = enabled;
    }

    fn show_answers(&mut self, non_rag: &str, rag: &str, docs_used: usize) {
        println!();
        println!("{}", "Non-RAG Answer".bold().cyan());
        println!("{}", "-".repeat(60));
        println!("{non_rag}");
        println!();
        println!("{}", "RAG Answer".bold().magenta());
        println!("{}", "-".repeat(60));
        println!("{rag}");
        println!("{}", format!("Docs used: {docs_used}").dimmed());
        println!();
    }

    fn show_scores(&mut self, table: &ScoreTable) {
        println!("{}", "Evaluation Results".bold().cyan());
        for (i, line) in table_lines(table).into_iter().enumerate() {
            let winner = matches!(table, ScoreTable::Rows(rows) if i >= 2 && rows[i - 2].winner);
            if winner {
                println!("{}", line.bold().green());
            } else {
                println!("{line}");
            }
        }
        println!();
    }

    fn show_justification(&mut self, slot: AnswerSlot, text: &str) {
        let title = match slot {
            AnswerSlot::NonRag => "Non-RAG justification:",
            AnswerSlot::Rag => "RAG justification:",
        };
        println!("  {} {}", title.bold(), text);
    }

    fn show_winner(&mut self, name: &str, reason: &str) {
        println!();
        println!("{}", "Final Verdict".bold().cyan());
        println!("{}", "=".repeat(60));
        let colored_name = if name == crate::evaluation::RAG_MODEL {
            name.green().bold()
        } else {
            name.blue().bold()
        };
        println!("  {} {}", "Winner:".bold(), colored_name);
        println!("  {} {}", "Reason:".bold(), reason);
        println!();
    }

    fn set_json_output(&mut self, text: &str) {
        self.json_output = text.to_string();
        if self.print_json {
            println!("{}", "Programmatic Output (JSON):".dimmed());
            println!("{text}");
        }
    }

    fn json_output(&self) -> String {
        self.json_output.clone()
    }

    fn copy_label(&self) -> String {
        self.copy_label.clone()
    }

    fn set_copy_label(&mut self, label: &str) {
        if label != self.copy_label && label == super::COPIED_LABEL {
            eprintln!("{} {}", "✓".green().bold(), "JSON copied to clipboard".dimmed());
        }
        self.copy_label = label.to_string();
    }
}

/// Lay out the score table as fixed-width lines: header, rule, rows.
/// Winner rows carry a `*` marker after the model name.
pub fn table_lines(table: &ScoreTable) -> Vec<String> {
    let mut lines = vec![
        format!(
            "  {:<12} {:>8} {:>12} {:>9} {:>7} {:>9} {:>9}",
            "Model", "Accuracy", "Completeness", "Relevance", "Clarity", "Grounding", "Avg Score"
        ),
        format!("  {}", "-".repeat(72)),
    ];

    match table {
        ScoreTable::Rows(rows) => lines.extend(rows.iter().map(row_line)),
        ScoreTable::Empty(message) => lines.push(format!("  {message}")),
    }

    lines
}

fn row_line(row: &ScoreRow) -> String {
    let model = if row.winner {
        format!("{} *", row.model)
    } else {
        row.model.clone()
    };
    format!(
        "  {:<12} {:>8} {:>12} {:>9} {:>7} {:>9} {:>9}",
        model, row.accuracy, row.completeness, row.relevance, row.clarity, row.grounding, row.average
    )
}

// ---------------------------------------------------------------------------
// System clipboard
// ---------------------------------------------------------------------------

/// Writes to the OS clipboard through `arboard`.
///
/// A fresh handle is opened per copy so nothing holds the display connection
/// between copies.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        let mut clipboard = arboard::Clipboard::new().context("Failed to access clipboard")?;
        clipboard
            .set_text(text)
            .context("Failed to set clipboard text")?;
        Ok(())
    }
}
