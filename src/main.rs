use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ragjudge::cli;
use ragjudge::config;

#[derive(Debug, Parser)]
#[command(name = "ragjudge")]
#[command(about = "LLM-as-a-Judge: compare RAG and Non-RAG answers")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Serve the evaluation page and the /evaluate API
    Serve {
        /// Listen address (default from config: 127.0.0.1:5000)
        #[arg(long)]
        addr: Option<String>,
        /// Do not open the page in a browser
        #[arg(long)]
        no_browser: bool,
    },
    /// Evaluate a question from the terminal (interactive when none is given)
    Ask {
        /// The question to evaluate
        question: Option<String>,
        /// Evaluate endpoint URL (default from config)
        #[arg(long, conflicts_with = "local")]
        endpoint: Option<String>,
        /// Run the pipeline in-process instead of calling a server
        #[arg(long)]
        local: bool,
        /// Copy the JSON output to the clipboard after each evaluation
        #[arg(long)]
        copy: bool,
        /// Ask "What is Retrieval-Augmented Generation?" when no question is given
        #[arg(long = "default")]
        use_default: bool,
        /// Evaluate a batch of questions: one per line from FILE, or the built-in samples
        #[arg(long, value_name = "FILE", num_args = 0..=1, conflicts_with_all = ["question", "use_default"])]
        batch: Option<Option<PathBuf>>,
    },
    /// Show evaluation statistics from the log
    Stats {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
        /// Only include the last N days of data
        #[arg(long)]
        days: Option<u32>,
    },
    /// Check API key, documents, server and config
    Health,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write a default config file to ~/.ragjudge/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a value, e.g. `llm.model openai/gpt-4o-mini`
    Set { key: String, value: String },
    /// Reset the config file to defaults
    Reset,
}

/// Diagnostics go to stderr so stdout stays clean for JSON output.
/// `RUST_LOG` wins over `[logging].level`.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> Result<()> {
    let app = App::parse();
    init_tracing(&config::load().logging.level);

    match app.command {
        Commands::Serve { addr, no_browser } => cli::run_serve(addr, no_browser),
        Commands::Ask {
            question,
            endpoint,
            local,
            copy,
            use_default,
            batch,
        } => cli::run_ask(cli::AskOptions {
            question,
            endpoint,
            local,
            copy,
            use_default,
            batch: batch.map(|file| file.map_or(cli::BatchSource::Samples, cli::BatchSource::File)),
        }),
        Commands::Stats { format, days } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_stats(fmt, days)
        }
        Commands::Health => cli::run_health(),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
