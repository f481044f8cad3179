/// Configuration schema and defaults for ragjudge.
///
/// Defines the TOML-serializable configuration structure with all sections:
/// `[llm]`, `[retrieval]`, `[server]`, `[client]` and `[logging]`.
///
/// Every field has a built-in default. Users only need to set the values
/// they want to override.
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level ragjudge configuration.
///
/// Maps directly to the `~/.ragjudge/config.toml` and `.ragjudge.toml` file
/// schemas. All sections and fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagJudgeConfig {
    pub llm: LlmConfig,
    pub retrieval: RetrievalConfig,
    pub server: ServerConfig,
    pub client: ClientConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [llm]
// ---------------------------------------------------------------------------

/// OpenAI-compatible chat completion endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the API (the `/chat/completions` path is appended).
    pub base_url: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Name of the environment variable holding the API key. The key itself
    /// is never stored in the config file.
    pub api_key_env: String,
    /// Sampling temperature for the Non-RAG and RAG answers.
    pub answer_temperature: f64,
    /// Sampling temperature for the judge.
    pub judge_temperature: f64,
    /// Per-request timeout in milliseconds. `0` waits indefinitely.
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "google/gemini-2.0-flash-001".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            answer_temperature: 0.7,
            judge_temperature: 0.2,
            timeout_ms: 120_000,
        }
    }
}

impl LlmConfig {
    /// Request timeout, or `None` when `timeout_ms` is `0`.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }
}

// ---------------------------------------------------------------------------
// [retrieval]
// ---------------------------------------------------------------------------

/// Document store and retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Directory scanned for `*.txt` documents.
    pub docs_path: String,
    /// Number of documents passed to the RAG prompt.
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            docs_path: "data/documents".to_string(),
            top_k: 2,
        }
    }
}

// ---------------------------------------------------------------------------
// [server]
// ---------------------------------------------------------------------------

/// Web server settings for `ragjudge serve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address.
    pub addr: String,
    /// Open the UI in the default browser on start.
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:5000".to_string(),
            open_browser: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [client]
// ---------------------------------------------------------------------------

/// Settings for the terminal client (`ragjudge ask`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Full URL of the evaluate endpoint.
    pub endpoint: String,
    /// Request timeout in milliseconds. `0` waits indefinitely.
    pub timeout_ms: u64,
    /// Delay before the copy confirmation label reverts (milliseconds).
    pub copy_revert_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:5000/evaluate".to_string(),
            timeout_ms: 0,
            copy_revert_ms: 2000,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether evaluations are appended to the JSONL evaluation log.
    pub enabled: bool,
    /// Path to the evaluation log. `~` is expanded to the home directory.
    pub path: String,
    /// Diagnostic level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "~/.ragjudge/evaluation-log.jsonl".to_string(),
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl RagJudgeConfig {
    /// Generate the annotated default TOML config file content.
    ///
    /// Used by `ragjudge config init`. Must stay parseable back into
    /// [`RagJudgeConfig`].
    pub fn default_toml() -> String {
        r#"# ragjudge Configuration
# LLM-as-a-Judge: RAG vs Non-RAG evaluator
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (RAGJUDGE_*)
#   2. Project config (.ragjudge.toml in current directory)
#   3. User global config (~/.ragjudge/config.toml)
#   4. Built-in defaults

[llm]
base_url = "https://openrouter.ai/api/v1"
model = "google/gemini-2.0-flash-001"
api_key_env = "OPENAI_API_KEY"   # name of the variable, not the key
answer_temperature = 0.7
judge_temperature = 0.2
timeout_ms = 120000              # 0 = wait indefinitely

[retrieval]
docs_path = "data/documents"     # *.txt files; seeded with a sample if missing
top_k = 2

[server]
addr = "127.0.0.1:5000"
open_browser = true

[client]
endpoint = "http://127.0.0.1:5000/evaluate"
timeout_ms = 0                   # 0 = wait indefinitely
copy_revert_ms = 2000

[logging]
enabled = true
path = "~/.ragjudge/evaluation-log.jsonl"
level = "info"                   # error | warn | info | debug | trace
"#
        .to_string()
    }

    /// Resolve the evaluation log path, expanding a leading `~`.
    pub fn evaluation_log_path(&self) -> Option<std::path::PathBuf> {
        expand_home(&self.logging.path)
    }
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(path: &str) -> Option<std::path::PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
        None if path == "~" => dirs::home_dir(),
        None => Some(std::path::PathBuf::from(path)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
