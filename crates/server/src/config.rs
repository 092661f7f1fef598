//! # Application Configuration
//!
//! This module defines the configuration structure for the `sqlchat-server` and
//! provides the logic for loading it from an optional `config.yml` file and
//! environment variables.

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use regex::Regex;
use serde::Deserialize;
use sqlchat::constants::{DEFAULT_DB_FILE, DEFAULT_EXAMPLES_FILE, DEFAULT_UPLOAD_DIR};
use sqlchat::providers::factory::ProviderConfig;
use sqlchat::types::DEFAULT_RECENT_EXAMPLES;
use std::env;
use std::fs;
use tracing::info;

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
    /// Indicates an explicitly requested configuration file was not found.
    NotFound(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::NotFound(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    /// The path to the SQLite database file. Loaded from `DB_URL` env var.
    #[serde(default = "default_db_url")]
    pub db_url: String,
    /// The static page served at `/`.
    #[serde(default = "default_index_html_path")]
    pub index_html_path: String,
    /// The JSON file holding the training examples.
    #[serde(default = "default_examples_file")]
    pub examples_file: String,
    /// The directory uploaded datasets are stored in.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    /// How many of the most recent examples go into each prompt.
    #[serde(default = "default_recent_examples")]
    pub recent_examples: usize,
    /// Whether foreign-key relationships are part of the schema description.
    #[serde(default = "default_true")]
    pub include_foreign_keys: bool,
    /// The AI provider used for SQL generation and narration.
    pub ai: ProviderConfig,
}

fn default_port() -> u16 {
    9090
}

fn default_db_url() -> String {
    DEFAULT_DB_FILE.to_string()
}

fn default_index_html_path() -> String {
    "index.html".to_string()
}

fn default_examples_file() -> String {
    DEFAULT_EXAMPLES_FILE.to_string()
}

fn default_upload_dir() -> String {
    DEFAULT_UPLOAD_DIR.to_string()
}

fn default_recent_examples() -> usize {
    DEFAULT_RECENT_EXAMPLES
}

fn default_true() -> bool {
    true
}

// Helper to read a file, substitute env vars, and return its content.
// Returns Ok(None) if the file does not exist, or an error if it fails to read.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !std::path::Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(e.to_string()))?;
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_default()
    });

    Ok(Some(expanded_content.to_string()))
}

/// Loads the application configuration from a file and environment variables.
///
/// Layers, lowest priority first:
/// 1. Programmatic defaults (Gemini as the AI provider).
/// 2. `config.yml` next to the crate manifest, or the file given as override.
///    `${VAR}` placeholders are substituted from the environment.
/// 3. Top-level keys from plain environment variables (`PORT`, `DB_URL`, ...).
/// 4. Nested keys from `SQLCHAT_`-prefixed variables (e.g. `SQLCHAT_AI__MODEL_NAME`).
///
/// `GEMINI_API_KEY` fills in `ai.api_key` when nothing else set it.
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = ConfigBuilder::builder()
        // Layer 1: Programmatic defaults.
        .set_default("ai.provider", "gemini")?
        .set_default("ai.model_name", "gemini-1.5-pro")?;

    // Layer 2: Main config file. It is optional unless explicitly requested.
    let main_config_path = match config_path_override {
        Some(path) => path.to_string(),
        None => format!("{}/config.yml", env!("CARGO_MANIFEST_DIR")),
    };
    match read_and_substitute(&main_config_path)? {
        Some(content) => {
            info!("Loading configuration from '{main_config_path}'.");
            builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
        }
        None if config_path_override.is_some() => {
            return Err(ConfigError::NotFound(format!(
                "Config file not found at '{main_config_path}'."
            )));
        }
        None => info!("No config file at '{main_config_path}'. Using defaults and environment."),
    }

    let settings = builder
        // Layer 3: Load environment variables for top-level keys like PORT.
        .add_source(Environment::default())
        // Layer 4: Load prefixed environment variables for deeper overrides.
        .add_source(
            Environment::with_prefix("SQLCHAT")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    let mut config: AppConfig = settings.try_deserialize()?;

    // An unset `${GEMINI_API_KEY}` substitutes to an empty string.
    if config.ai.api_key.as_deref().is_some_and(str::is_empty) {
        config.ai.api_key = None;
    }
    if config.ai.api_key.is_none() {
        if let Ok(key) = env::var("GEMINI_API_KEY") {
            if !key.is_empty() {
                config.ai.api_key = Some(key);
            }
        }
    }

    Ok(config)
}
