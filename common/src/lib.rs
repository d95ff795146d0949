/*!
common/src/lib.rs

Shared configuration types for newsverdict.

This file provides:
- Config data structures (deserialized from TOML)
- An async loader that merges a default config file with an optional override
- The built-in user table and trusted publisher list used when the config omits them
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// HTTP server bind settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: Option<String>,
    pub port: Option<u16>,
}

/// A user allowed to log in. Exactly one of `password` / `password_hash` is expected;
/// when both are present the hash wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    pub username: String,
    /// Plaintext secret (matches the stock demo accounts)
    pub password: Option<String>,
    /// Argon2 PHC string, see the `hash_password` binary
    pub password_hash: Option<String>,
}

impl UserConfig {
    pub fn plaintext(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Some(password.into()),
            password_hash: None,
        }
    }
}

/// Trusted publisher allow-list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_trusted_sources")]
    pub trusted: Vec<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            trusted: default_trusted_sources(),
        }
    }
}

/// Thresholds applied by the analysis pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Trimmed article text shorter than this is rejected
    #[serde(default = "default_min_article_chars")]
    pub min_article_chars: usize,
    /// Only this many leading characters are sent to the summarizer
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
    #[serde(default = "default_max_summary_length")]
    pub max_summary_length: usize,
    #[serde(default = "default_min_summary_length")]
    pub min_summary_length: usize,
    /// Classifier label that marks an article as fake
    #[serde(default = "default_fake_label")]
    pub fake_label: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_article_chars: default_min_article_chars(),
            max_input_chars: default_max_input_chars(),
            max_summary_length: default_max_summary_length(),
            min_summary_length: default_min_summary_length(),
            fake_label: default_fake_label(),
        }
    }
}

/// Article fetching configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapingConfig {
    pub fetch_timeout_seconds: Option<u64>,
    pub user_agent: Option<String>,
}

/// Remote inference endpoint for one model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub api_url: Option<String>,
    pub api_key_env: Option<String>,
    pub model: Option<String>,
    pub timeout_seconds: Option<u64>,
}

/// Model endpoints grouped by task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    pub summarizer: Option<ModelConfig>,
    pub classifier: Option<ModelConfig>,
}

/// Top-level application configuration (deserialized from config.toml)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: Option<ServerConfig>,
    #[serde(default = "default_users")]
    pub users: Vec<UserConfig>,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    pub scraping: Option<ScrapingConfig>,
    pub models: Option<ModelsConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: None,
            users: default_users(),
            sources: SourcesConfig::default(),
            analysis: AnalysisConfig::default(),
            scraping: None,
            models: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file asynchronously.
    ///
    /// Example:
    ///   let cfg = Config::from_file("config.toml").await?;
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = tokio::fs::read_to_string(path.as_ref())
            .await
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let cfg: Config = toml::from_str(&data).context("Failed to parse TOML configuration")?;
        Ok(cfg)
    }

    /// Load configuration with an optional default file and an optional override file.
    /// If both are present, they are merged (override takes precedence).
    pub async fn load_with_defaults(default_path: Option<&Path>, override_path: Option<&Path>) -> Result<Self> {
        let mut config_value = toml::Value::Table(toml::map::Map::new());

        if let Some(path) = default_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path).await
                    .with_context(|| format!("Failed to read default config: {}", path.display()))?;
                let val: toml::Value = toml::from_str(&data)
                    .context("Failed to parse default configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        if let Some(path) = override_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path).await
                    .with_context(|| format!("Failed to read override config: {}", path.display()))?;
                let val: toml::Value = toml::from_str(&data)
                    .context("Failed to parse override configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        let cfg: Config = config_value.try_into().context("Failed to parse merged configuration")?;
        Ok(cfg)
    }

    /// Fetch timeout for article downloads, in seconds.
    pub fn fetch_timeout_seconds(&self) -> u64 {
        self.scraping
            .as_ref()
            .and_then(|s| s.fetch_timeout_seconds)
            .unwrap_or(15)
    }
}

// Tables merge key by key; any other value (arrays included) is replaced wholesale.
fn merge_toml(a: &mut toml::Value, b: toml::Value) {
    match (a, b) {
        (toml::Value::Table(a_map), toml::Value::Table(b_map)) => {
            for (k, v) in b_map {
                if let Some(a_val) = a_map.get_mut(&k) {
                    merge_toml(a_val, v);
                } else {
                    a_map.insert(k, v);
                }
            }
        }
        (a_val, b_val) => *a_val = b_val,
    }
}

/// Stock demo accounts
pub fn default_users() -> Vec<UserConfig> {
    vec![
        UserConfig::plaintext("admin", "admin123"),
        UserConfig::plaintext("guest", "guest"),
        UserConfig::plaintext("user", "user"),
    ]
}

pub fn default_trusted_sources() -> Vec<String> {
    ["bbc.com", "nytimes.com", "apnews.com", "indianexpress.com", "deccanherald.com"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_min_article_chars() -> usize {
    100
}

fn default_max_input_chars() -> usize {
    1024
}

fn default_max_summary_length() -> usize {
    130
}

fn default_min_summary_length() -> usize {
    30
}

fn default_fake_label() -> String {
    "FAKE".to_string()
}
