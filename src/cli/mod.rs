//! CLI command implementations.
//!
//! Provides subcommand handlers for:
//! - `ragjudge serve` — HTTP server with the embedded evaluation page
//! - `ragjudge ask` — terminal client driving the page controller
//! - `ragjudge stats` — summary of the evaluation log
//! - `ragjudge health` — API key, documents, server, config
//! - `ragjudge config show|init|set|reset` — configuration management

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::analytics::logger::EvaluationLog;
use crate::analytics::reporter::{self, Stats};
use crate::config::{self, RagJudgeConfig};
use crate::controller::terminal::{SystemClipboard, TerminalView};
use crate::controller::transport::{HttpTransport, Transport};
use crate::controller::{Controller, Key, KeyOutcome, KeyPress, SubmitOutcome};
use crate::evaluation::pipeline::Pipeline;
use crate::rag::RagEngine;
use crate::web::{self, AppState};

/// Output format for report commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// ragjudge serve
// ---------------------------------------------------------------------------

/// Run the HTTP server until interrupted.
pub fn run_serve(addr: Option<String>, no_browser: bool) -> Result<()> {
    let cfg = config::load();
    let addr = addr.unwrap_or_else(|| cfg.server.addr.clone());
    let open = cfg.server.open_browser && !no_browser;

    let pipeline = Pipeline::from_config(&cfg)?;
    web::serve(AppState::new(pipeline, cfg), &addr, open)
}

// ---------------------------------------------------------------------------
// ragjudge ask
// ---------------------------------------------------------------------------

/// Asked when `--default` is given without a question.
pub const DEFAULT_QUESTION: &str = "What is Retrieval-Augmented Generation?";

/// Built-in question set for `ask --batch` without a file.
pub const SAMPLE_QUESTIONS: [&str; 3] = [
    "What is Retrieval-Augmented Generation?",
    "What is the capital of France?",
    "How does LLM-as-a-Judge work?",
];

/// Where `ask --batch` takes its questions from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchSource {
    /// [`SAMPLE_QUESTIONS`].
    Samples,
    /// One question per line; blank lines and `#` comments are skipped.
    File(PathBuf),
}

/// Options for `ragjudge ask`.
#[derive(Debug, Clone, Default)]
pub struct AskOptions {
    pub question: Option<String>,
    pub endpoint: Option<String>,
    pub local: bool,
    pub copy: bool,
    /// Fall back to [`DEFAULT_QUESTION`] when no question is given.
    pub use_default: bool,
    pub batch: Option<BatchSource>,
}

/// Evaluate one question, or read questions interactively.
///
/// With `--local` the pipeline runs in-process; otherwise requests go to
/// the configured (or given) `/evaluate` endpoint.
pub fn run_ask(opts: AskOptions) -> Result<()> {
    let cfg = config::load();

    if opts.local {
        let pipeline = Pipeline::from_config(&cfg)?;
        ask_with(pipeline, &cfg, &opts)
    } else {
        let endpoint = opts
            .endpoint
            .clone()
            .unwrap_or_else(|| cfg.client.endpoint.clone());
        let transport = HttpTransport::new(endpoint, Duration::from_millis(cfg.client.timeout_ms));
        ask_with(transport, &cfg, &opts)
    }
}

fn ask_with<T: Transport>(transport: T, cfg: &RagJudgeConfig, opts: &AskOptions) -> Result<()> {
    let controller = Controller::new(TerminalView::new(true), transport, SystemClipboard)
        .with_copy_revert(Duration::from_millis(cfg.client.copy_revert_ms));

    if let Some(source) = &opts.batch {
        let questions = match source {
            BatchSource::Samples => SAMPLE_QUESTIONS.iter().map(|q| q.to_string()).collect(),
            BatchSource::File(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read questions from {}", path.display()))?;
                parse_question_list(&text)
            }
        };
        return run_batch(&controller, &questions, opts.copy);
    }

    let question = resolve_question(opts.question.as_deref(), opts.use_default);
    if opts.use_default && opts.question.as_deref().is_none_or(|q| q.trim().is_empty()) {
        eprintln!("{}", format!("Using default question: {DEFAULT_QUESTION}").dimmed());
    }

    match &question {
        Some(question) => {
            controller.with_view(|v| v.set_input(question));
            match controller.submit() {
                SubmitOutcome::Rendered => {
                    if opts.copy {
                        controller.copy()?;
                    }
                    Ok(())
                }
                SubmitOutcome::EmptyInput => anyhow::bail!("no question given"),
                _ => anyhow::bail!("evaluation failed"),
            }
        }
        None => interactive(&controller, opts.copy),
    }
}

/// The question to ask: the given one, or [`DEFAULT_QUESTION`] when
/// `use_default` is set and none (or only whitespace) was given.
fn resolve_question(given: Option<&str>, use_default: bool) -> Option<String> {
    match given {
        Some(q) if !q.trim().is_empty() => Some(q.to_string()),
        _ if use_default => Some(DEFAULT_QUESTION.to_string()),
        other => other.map(str::to_string),
    }
}

/// Questions from a batch file: one per line, trimmed, skipping blank lines
/// and `#` comments.
fn parse_question_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Evaluate each question in turn. A failure is reported and the run
/// carries on; the command fails at the end if any question failed.
fn run_batch<T: Transport>(
    controller: &Controller<TerminalView, T, SystemClipboard>,
    questions: &[String],
    copy_each: bool,
) -> Result<()> {
    if questions.is_empty() {
        anyhow::bail!("no questions to evaluate");
    }

    let total = questions.len();
    let mut failed = 0;

    for (i, question) in questions.iter().enumerate() {
        println!();
        println!(
            "{} {}",
            format!("[{}/{total}]", i + 1).bold().cyan(),
            question.bold()
        );

        controller.with_view(|v| v.set_input(question));
        match controller.submit() {
            SubmitOutcome::Rendered => {
                if copy_each && let Err(e) = controller.copy() {
                    eprintln!("{} {e:#}", "!".red().bold());
                }
            }
            _ => failed += 1,
        }
    }

    println!();
    if failed > 0 {
        anyhow::bail!("{failed} of {total} evaluations failed");
    }
    println!("{} {total} evaluations complete", "✓".green().bold());
    Ok(())
}

/// One line of interactive input.
#[derive(Debug, PartialEq, Eq)]
enum InputLine<'a> {
    /// Ends in `\`: keep the text, insert a newline, do not submit.
    Continue(&'a str),
    /// Plain line: append and submit.
    Submit(&'a str),
    Copy,
    Quit,
}

fn classify_line(line: &str) -> InputLine<'_> {
    let line = line.trim_end_matches(['\r', '\n']);
    match line.trim() {
        ":q" | ":quit" | "exit" => return InputLine::Quit,
        ":copy" => return InputLine::Copy,
        _ => {}
    }
    match line.strip_suffix('\\') {
        Some(text) => InputLine::Continue(text),
        None => InputLine::Submit(line),
    }
}

fn interactive<T: Transport>(
    controller: &Controller<TerminalView, T, SystemClipboard>,
    copy_each: bool,
) -> Result<()> {
    println!("{}", "ragjudge: RAG vs Non-RAG".bold().cyan());
    println!(
        "{}",
        "Enter submits. End a line with \\ to continue on the next line. :copy copies the last JSON, :q quits."
            .dimmed()
    );

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut continuing = false;

    loop {
        print!("{} ", if continuing { "..." } else { ">" }.bold());
        io::stdout().flush().context("failed to flush stdout")?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("failed to read from stdin")?;

        match classify_line(&line) {
            InputLine::Quit => break,
            InputLine::Copy => {
                if let Err(e) = controller.copy() {
                    eprintln!("{} {e:#}", "!".red().bold());
                }
            }
            InputLine::Continue(text) => {
                // Shift+Enter: keep the newline, no submit.
                controller.with_view(|v| v.push_line(text));
                continuing = true;
            }
            InputLine::Submit(text) => {
                controller.with_view(|v| v.push_line(text));
                let outcome = controller.on_key(KeyPress::plain(Key::Enter));
                controller.with_view(|v| v.clear_input());
                continuing = false;

                if copy_each
                    && outcome == KeyOutcome::Submitted(SubmitOutcome::Rendered)
                    && let Err(e) = controller.copy()
                {
                    eprintln!("{} {e:#}", "!".red().bold());
                }
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// ragjudge stats
// ---------------------------------------------------------------------------

/// Show a summary of the evaluation log.
pub fn run_stats(format: OutputFormat, days: Option<u32>) -> Result<()> {
    let cfg = config::load();
    let path = cfg
        .evaluation_log_path()
        .context("could not resolve evaluation log path")?;
    let entries = EvaluationLog::new(path).read_since_days(days);
    let stats = reporter::build_stats(&entries);

    if stats.total_evaluations == 0 {
        println!(
            "{}",
            "No evaluations yet. Run `ragjudge ask` or use the web page to create some.".yellow()
        );
        return Ok(());
    }

    match format {
        OutputFormat::Json => print_stats_json(&stats)?,
        OutputFormat::Csv => print_stats_csv(&stats),
        OutputFormat::Table => print_stats_table(&stats),
    }

    Ok(())
}

fn print_stats_table(stats: &Stats) {
    println!("{}", "ragjudge Evaluation Report".bold().cyan());
    println!("{}", "=".repeat(60));
    println!();

    println!("  {} {}", "Evaluations:".bold(), stats.total_evaluations);
    println!("  {} {}", "Failures:   ".bold(), stats.failures);
    println!("  {} {:.0} ms", "Avg latency:".bold(), stats.avg_latency_ms);
    println!();

    if !stats.model_stats.is_empty() {
        println!("{}", "Per Model".bold().cyan());
        println!(
            "  {:<16} {:>6} {:>8} {:>8} {:>10}",
            "Model", "Wins", "Win %", "Scored", "Avg Score"
        );
        println!("  {}", "-".repeat(52));

        for (i, m) in stats.model_stats.iter().enumerate() {
            let line = format!(
                "  {:<16} {:>6} {:>7.1}% {:>8} {:>10.2}",
                m.model,
                m.wins,
                m.win_pct(stats.successes()),
                m.scored,
                m.mean_average,
            );

            if i % 2 == 0 {
                println!("{}", line);
            } else {
                println!("{}", line.dimmed());
            }
        }
    }
}

fn print_stats_json(stats: &Stats) -> Result<()> {
    let value = serde_json::json!({
        "total_evaluations": stats.total_evaluations,
        "failures": stats.failures,
        "avg_latency_ms": stats.avg_latency_ms,
        "models": stats.model_stats.iter().map(|m| serde_json::json!({
            "model": m.model,
            "wins": m.wins,
            "win_pct": m.win_pct(stats.successes()),
            "scored": m.scored,
            "mean_average": m.mean_average,
        })).collect::<Vec<_>>(),
    });

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_stats_csv(stats: &Stats) {
    println!("model,wins,win_pct,scored,mean_average");
    for m in &stats.model_stats {
        println!(
            "{},{},{:.1},{},{:.2}",
            m.model,
            m.wins,
            m.win_pct(stats.successes()),
            m.scored,
            m.mean_average,
        );
    }
}

// ---------------------------------------------------------------------------
// ragjudge health
// ---------------------------------------------------------------------------

pub fn run_health() -> Result<()> {
    println!("{}", "ragjudge Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let cfg = config::load();

    // 1. Config files
    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.ragjudge/config.toml found"
        } else {
            "not found (run `ragjudge config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".ragjudge.toml found"
        } else {
            "none (optional)"
        },
    );

    // 2. API key
    let key_set = std::env::var(&cfg.llm.api_key_env).is_ok_and(|v| !v.trim().is_empty());
    print_health_item(
        "API key",
        key_set,
        &if key_set {
            format!("{} is set", cfg.llm.api_key_env)
        } else {
            format!("{} is not set", cfg.llm.api_key_env)
        },
    );
    print_health_item("Model", true, &format!("{} via {}", cfg.llm.model, cfg.llm.base_url));

    // 3. Documents
    match RagEngine::load(&cfg.retrieval.docs_path) {
        Ok(engine) => print_health_item(
            "Documents",
            !engine.documents().is_empty(),
            &format!("{} in {}", engine.documents().len(), cfg.retrieval.docs_path),
        ),
        Err(e) => print_health_item("Documents", false, &format!("{e:#}")),
    }

    // 4. Server
    let url = health_url(&cfg.client.endpoint);
    let reachable = ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(2))
        .build()
        .get(&url)
        .call()
        .is_ok();
    print_health_item(
        "Server",
        reachable,
        &if reachable {
            format!("reachable at {url}")
        } else {
            "not reachable (start it with `ragjudge serve`)".to_string()
        },
    );

    // 5. Evaluation log
    let log = cfg.evaluation_log_path().map(EvaluationLog::new);
    let log_exists = log.as_ref().is_some_and(|l| l.path().exists());
    print_health_item(
        "Evaluation log",
        log_exists,
        &match &log {
            Some(l) if log_exists => format!("{} entries", l.read_all().len()),
            _ => "no log file yet".to_string(),
        },
    );

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<18} {}", status, name, detail.dimmed());
}

/// `http://host:port/evaluate` → `http://host:port/api/health`.
fn health_url(endpoint: &str) -> String {
    let base = endpoint.trim_end_matches('/');
    let base = base.strip_suffix("/evaluate").unwrap_or(base);
    format!("{base}/api/health")
}

// ---------------------------------------------------------------------------
// ragjudge config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective ragjudge Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source("~/.ragjudge/config.toml", global_exists);
    print_source(".ragjudge.toml", project_exists);
    println!(
        "  {} {}",
        "·".dimmed(),
        "RAGJUDGE_* environment variables".dimmed()
    );

    Ok(())
}

fn print_source(name: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.ragjudge/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    println!("  {}", "Edit the file to customize ragjudge.".dimmed());
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
