//! Configuration management for tableqa
//!
//! Supports environment variables, config files, and runtime overrides.
//! The model endpoint and credentials come from the environment by default.
//!
//! Config file location: ~/.config/tableqa/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::core::error::{Result, TableqaError};

/// Main configuration for tableqa
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Reasoning-model endpoint configuration
    pub model: ModelConfig,
    /// Agent loop configuration
    pub agent: AgentConfig,
    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

/// Reasoning-model endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Base URL of the OpenAI-compatible endpoint
    pub endpoint: String,
    /// API key sent as a bearer token (may be empty for local servers)
    #[serde(default)]
    pub api_key: String,
    /// Chat model identifier
    pub chat_model: String,
    /// Embedding model identifier
    pub embedding_model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Agent behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum reasoning attempts before giving up
    /// Default: 10
    pub max_attempts: usize,
    /// Per-attempt deadline for the reasoning call in seconds
    /// Default: 120
    pub attempt_timeout_secs: u64,
    /// Whether to show debug output
    pub debug: bool,
    /// Directory holding the prompt template files
    pub prompt_dir: Option<PathBuf>,
}

/// Retrieval subsystem configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Chunk window size in characters
    /// Default: 1000
    pub chunk_window: usize,
    /// Overlap between adjacent chunks in characters
    /// Default: 200
    pub chunk_overlap: usize,
    /// Number of shards to partition each source into (None = one index)
    pub shard_count: Option<usize>,
    /// Results per similarity query
    /// Default: 3
    pub top_k: usize,
    /// Cache directory for persisted chunks and indices
    pub cache_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            agent: AgentConfig::default(),
            retrieval: RetrievalConfig::default(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            chat_model: env::var("TABLEQA_CHAT_MODEL")
                .unwrap_or_else(|_| "qwen2.5-32b-instruct".to_string()),
            embedding_model: env::var("TABLEQA_EMBEDDING_MODEL")
                .unwrap_or_else(|_| "bge-small-zh-v1.5".to_string()),
            timeout_secs: 120,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            attempt_timeout_secs: 120,
            debug: env::var("TABLEQA_DEBUG")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            prompt_dir: None,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            chunk_window: 1000,
            chunk_overlap: 200,
            shard_count: None,
            top_k: 3,
            cache_dir: PathBuf::from("cache"),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tableqa")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load() -> Self {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        // Try to load from config file
        if let Ok(config) = Self::load_from_file() {
            return config;
        }

        // Fall back to defaults (which respect env vars)
        Self::default()
    }

    /// Load configuration from file only
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::config_file();

        if !config_path.exists() {
            return Err(TableqaError::config("Config file not found"));
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| TableqaError::config(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| TableqaError::config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_dir = Self::config_dir();
        let config_path = Self::config_file();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .map_err(|e| TableqaError::config(format!("Failed to create config dir: {}", e)))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| TableqaError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, content)
            .map_err(|e| TableqaError::config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Check if a config file exists
    pub fn config_exists() -> bool {
        Self::config_file().exists()
    }

    /// Update the chat model
    pub fn set_chat_model(&mut self, model: impl Into<String>) {
        self.model.chat_model = model.into();
    }

    /// Update the shard count used at ingestion
    pub fn set_shard_count(&mut self, shards: Option<usize>) {
        self.retrieval.shard_count = shards;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.agent.max_attempts, 10);
        assert_eq!(config.retrieval.chunk_window, 1000);
        assert_eq!(config.retrieval.chunk_overlap, 200);
        assert_eq!(config.retrieval.top_k, 3);
        assert!(config.retrieval.shard_count.is_none());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("chat_model"));
        assert!(toml_str.contains("chunk_window"));
    }

    #[test]
    fn test_config_dir() {
        let dir = Config::config_dir();
        assert!(dir.to_string_lossy().contains("tableqa"));
    }
}
