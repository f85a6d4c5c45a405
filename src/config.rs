//! Harness configuration
//!
//! Loaded from a TOML file (`benchmark.toml` by default) with CLI overrides
//! applied on top. Everything has a sensible default so the harness runs
//! with no config file at all.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Full harness configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Embedding service settings
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Run-loop settings
    #[serde(default)]
    pub run: RunConfig,
}

impl HarnessConfig {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        Ok(config)
    }

    /// Load from the default location (`./benchmark.toml`) or return defaults.
    pub fn load_default() -> Result<Self> {
        let local_path = Path::new("benchmark.toml");
        if local_path.exists() {
            return Self::load(local_path);
        }
        Ok(Self::default())
    }
}

/// Embedding service endpoint and model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Base URL of an OpenAI-compatible API
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Embedding model id
    #[serde(default = "default_model")]
    pub model: String,

    /// Requested vector dimensions
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            model: default_model(),
            dimensions: default_dimensions(),
        }
    }
}

/// Run-loop settings: scheduling and failure boundaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Per-operation timeout in seconds, applied at each external call
    /// boundary (chunk, insert, search)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Concurrent strategy runs; 1 = sequential (the default — the embedding
    /// backend is typically rate-limited)
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            workers: default_workers(),
        }
    }
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_model() -> String {
    "text-embedding-3-small".to_string()
}
fn default_dimensions() -> usize {
    1024
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_workers() -> usize {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HarnessConfig::default();
        assert_eq!(config.embedding.model, "text-embedding-3-small");
        assert_eq!(config.embedding.dimensions, 1024);
        assert_eq!(config.run.timeout_secs, 30);
        assert_eq!(config.run.workers, 1);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let toml_str = r#"
[embedding]
model = "text-embedding-3-large"

[run]
workers = 4
"#;
        let config: HarnessConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.embedding.model, "text-embedding-3-large");
        assert_eq!(config.embedding.api_base, "https://api.openai.com/v1");
        assert_eq!(config.run.workers, 4);
        assert_eq!(config.run.timeout_secs, 30);
    }

    #[test]
    fn test_empty_toml_is_all_defaults() {
        let config: HarnessConfig = toml::from_str("").unwrap();
        assert_eq!(config.run.workers, 1);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("benchmark.toml");
        std::fs::write(&path, "[run]\ntimeout_secs = 5\n").unwrap();

        let config = HarnessConfig::load(&path).unwrap();
        assert_eq!(config.run.timeout_secs, 5);
    }

    #[test]
    fn test_load_missing_file_errors() {
        assert!(HarnessConfig::load(Path::new("/nonexistent/benchmark.toml")).is_err());
    }
}
