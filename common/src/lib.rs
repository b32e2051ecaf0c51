/*!
common/src/lib.rs

Shared configuration types for newsdraft.

This file provides:
- Config data structures (deserialized from TOML, every field defaulted)
- A loader that merges a default TOML file with an optional override
- Validation of the few values that have a lower bound
*/

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// HTTP server configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address Rocket binds to (e.g. "127.0.0.1" or "0.0.0.0")
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// News search provider configuration (Google News RSS search)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub base_url: String,
    /// Lookback window appended to the query as `when:<period>` (e.g. "1y", "7d")
    pub period: String,
    /// Maximum number of distinct candidate URLs kept per request
    pub max_results: usize,
    pub language: String,
    pub region: String,
    pub timeout_seconds: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://news.google.com/rss/search".to_string(),
            period: "1y".to_string(),
            max_results: 10,
            language: "en-US".to_string(),
            region: "US".to_string(),
            timeout_seconds: 15,
        }
    }
}

/// Article download / extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingConfig {
    pub timeout_seconds: u64,
    pub user_agent: String,
    /// Wrap width used when converting extracted HTML to text
    pub text_width: usize,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 20,
            user_agent: "Mozilla/5.0 (compatible; Newsdraft/0.1.0)".to_string(),
            text_width: 80,
        }
    }
}

/// Remote text-generation config (OpenAI-compatible chat completions)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_url: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub model: String,
    pub system_prompt: String,
    pub timeout_seconds: u64,
    pub max_tokens: Option<usize>,
    pub temperature: Option<f32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            model: "o1-2024-12-17".to_string(),
            system_prompt: "You are a helpful assistant.".to_string(),
            timeout_seconds: 300,
            max_tokens: None,
            temperature: None,
        }
    }
}

impl LlmConfig {
    /// Read the API key from the configured environment variable.
    /// Returns `None` when the variable is unset or blank.
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }
}

/// Top-level application configuration (deserialized from config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub search: SearchConfig,
    pub scraping: ScrapingConfig,
    pub llm: LlmConfig,
}

impl Config {
    /// Load configuration with an optional default file and an optional override file.
    /// If both are present, they are merged (override takes precedence).
    /// Missing files are skipped; built-in defaults fill whatever neither file sets.
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
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.search.max_results == 0 {
            bail!("search.max_results must be at least 1");
        }
        if self.scraping.text_width == 0 {
            bail!("scraping.text_width must be at least 1");
        }
        Ok(())
    }
}

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
