/// Configuration system for ragjudge.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults** — hardcoded in [`schema::RagJudgeConfig::default()`]
/// 2. **User global config** — `~/.ragjudge/config.toml`
/// 3. **Project local config** — `.ragjudge.toml` in the current working directory
/// 4. **Environment variables** — `RAGJUDGE_*` overrides (highest precedence)
///
/// Later layers override earlier ones. Missing sections in a TOML file fall
/// back to the built-in defaults.
///
/// # Usage
///
/// ```rust,ignore
/// use ragjudge::config;
///
/// let cfg = config::load();
/// let engine = RagEngine::load(&cfg.retrieval.docs_path)?;
/// ```
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::RagJudgeConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars.
pub fn load() -> RagJudgeConfig {
    let mut config = load_layers([
        load_toml_file(global_config_path()),
        load_toml_file(project_config_path()),
    ]);
    apply_env_overrides(&mut config);
    config
}

/// Merge TOML layers over the built-in defaults, key by key, so a project
/// file that only sets `retrieval.top_k` keeps everything else from the
/// global file.
fn load_layers(layers: impl IntoIterator<Item = Option<toml::Value>>) -> RagJudgeConfig {
    let Ok(mut merged) = toml::Value::try_from(RagJudgeConfig::default()) else {
        return RagJudgeConfig::default();
    };

    for layer in layers.into_iter().flatten() {
        merge_toml(&mut merged, layer);
    }

    merged.try_into().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "config layers do not match the schema, using defaults");
        RagJudgeConfig::default()
    })
}

/// Recursively overlay `overlay` onto `base`. Tables merge; any other value
/// replaces.
fn merge_toml(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Load a TOML config file from the given path (if it exists).
///
/// Files that are not valid TOML or do not fit the schema are ignored with a
/// warning so a typo never takes the server down.
fn load_toml_file(path: Option<PathBuf>) -> Option<toml::Value> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    let value = match toml::from_str::<toml::Value>(&content) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config file");
            return None;
        }
    };
    if let Err(e) = value.clone().try_into::<RagJudgeConfig>() {
        tracing::warn!(path = %path.display(), error = %e, "ignoring config file with invalid values");
        return None;
    }
    Some(value)
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.ragjudge/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".ragjudge").join("config.toml"))
}

/// Path to the project local config: `.ragjudge.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".ragjudge.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `RAGJUDGE_MODEL` — model identifier
/// - `RAGJUDGE_BASE_URL` (or `OPENROUTER_BASE_URL`) — API base URL
/// - `RAGJUDGE_DOCS_PATH` — documents directory
/// - `RAGJUDGE_TOP_K` — number of retrieved documents
/// - `RAGJUDGE_ADDR` — server listen address
/// - `RAGJUDGE_ENDPOINT` — evaluate endpoint used by `ragjudge ask`
/// - `RAGJUDGE_LOGGING` — evaluation log on/off (`1`/`true`/`yes`/`on`)
/// - `RAGJUDGE_LOG_LEVEL` — diagnostic level
fn apply_env_overrides(config: &mut RagJudgeConfig) {
    apply_overrides(config, |key| std::env::var(key).ok());
}

/// Apply overrides from an arbitrary key lookup. Split out from
/// [`apply_env_overrides`] so tests don't have to mutate the process
/// environment.
fn apply_overrides(config: &mut RagJudgeConfig, lookup: impl Fn(&str) -> Option<String>) {
    let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

    // LLM
    if let Some(val) = non_empty("RAGJUDGE_MODEL") {
        config.llm.model = val;
    }
    if let Some(val) = non_empty("RAGJUDGE_BASE_URL").or_else(|| non_empty("OPENROUTER_BASE_URL")) {
        config.llm.base_url = val;
    }

    // Retrieval
    if let Some(val) = non_empty("RAGJUDGE_DOCS_PATH") {
        config.retrieval.docs_path = val;
    }
    if let Some(k) = non_empty("RAGJUDGE_TOP_K").and_then(|v| v.parse::<usize>().ok()) {
        config.retrieval.top_k = k;
    }

    // Server / client
    if let Some(val) = non_empty("RAGJUDGE_ADDR") {
        config.server.addr = val;
    }
    if let Some(val) = non_empty("RAGJUDGE_ENDPOINT") {
        config.client.endpoint = val;
    }

    // Logging
    if let Some(val) = lookup("RAGJUDGE_LOGGING") {
        config.logging.enabled = is_truthy(&val);
    }
    if let Some(val) = non_empty("RAGJUDGE_LOG_LEVEL") {
        config.logging.level = val;
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.ragjudge/config.toml`.
///
/// Returns an error if the file already exists (use `force = true` to
/// overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.ragjudge/ directory")?;
    }

    fs::write(&path, RagJudgeConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key to a value in the global config file.
///
/// Supports dotted keys like `retrieval.top_k`. When no file exists yet the
/// defaults are written first and then updated.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let content = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&RagJudgeConfig::default())
            .context("failed to serialize default config")?
    };

    let mut root: toml::Value =
        toml::from_str(&content).context("failed to parse config as TOML value")?;
    set_toml_value(&mut root, key, value)?;

    // Refuse to write something that no longer deserializes into the schema.
    let updated = toml::to_string_pretty(&root).context("failed to serialize config")?;
    toml::from_str::<RagJudgeConfig>(&updated)
        .with_context(|| format!("invalid value for '{key}': {value}"))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, updated).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
///
/// The type of the existing value decides how `raw_value` is parsed.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let Some((section_path, leaf)) = key.rsplit_once('.') else {
        anyhow::bail!("config key must be `section.field`, got '{key}'");
    };

    let mut current = root;
    for part in section_path.split('.') {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let table = current
        .as_table_mut()
        .with_context(|| format!("expected table at '{section_path}'"))?;

    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Float(_)) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        Some(toml::Value::String(_)) => toml::Value::String(raw_value.to_string()),
        Some(_) => anyhow::bail!("'{key}' cannot be set from the command line"),
        None => anyhow::bail!("config key not found: '{key}'"),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
