//! Search configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{SearchError, SearchResult};
use crate::ranker::DEFAULT_LIMIT;

/// Main search configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Embedding API configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Search behavior configuration
    #[serde(default)]
    pub search: SearchBehaviorConfig,

    /// Paths configuration
    #[serde(default)]
    pub paths: PathsConfig,
}

/// Embedding API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Gemini API key (can also use GEMINI_API_KEY / GOOGLE_API_KEY env vars)
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: default_api_base(),
            model: default_model(),
        }
    }
}

impl EmbeddingConfig {
    /// Get API key from config or environment
    pub fn get_api_key(&self) -> SearchResult<String> {
        if let Some(ref key) = self.api_key {
            if !key.is_empty() {
                return Ok(key.clone());
            }
        }

        std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("GOOGLE_API_KEY"))
            .map_err(|_| SearchError::ApiKeyMissing)
    }
}

fn default_api_base() -> String {
    std::env::var("GEMINI_API_BASE")
        .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".to_string())
}

fn default_model() -> String {
    "text-embedding-004".to_string()
}

/// Search behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchBehaviorConfig {
    /// Default result limit
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Maximum chunk/query length in characters sent to the embedding API
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

impl Default for SearchBehaviorConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_chars: default_max_chars(),
        }
    }
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

fn default_max_chars() -> usize {
    // Character approximation of a ~500 token budget
    2000
}

/// Paths configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Snapshot artifact path
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,

    /// Root of the markdown document tree
    #[serde(default)]
    pub content_root: Option<PathBuf>,
}

impl PathsConfig {
    /// Get snapshot path, using default if not specified
    pub fn get_snapshot_path(&self) -> PathBuf {
        if let Some(ref path) = self.snapshot_path {
            return path.clone();
        }

        if let Ok(path) = std::env::var("GUIDEPOST_SNAPSHOT_PATH") {
            return PathBuf::from(path);
        }

        base_dir().join("embeddings.json")
    }

    /// Get content root, using default if not specified
    pub fn get_content_root(&self) -> PathBuf {
        if let Some(ref path) = self.content_root {
            return path.clone();
        }

        if let Ok(path) = std::env::var("GUIDEPOST_CONTENT_ROOT") {
            return PathBuf::from(path);
        }

        base_dir().join("content")
    }
}

/// Base app directory
fn base_dir() -> PathBuf {
    if let Ok(root) = std::env::var("GUIDEPOST_ROOT") {
        return PathBuf::from(root);
    }

    dirs::home_dir()
        .map(|h| h.join(".guidepost"))
        .unwrap_or_else(|| PathBuf::from(".guidepost"))
}

impl SearchConfig {
    /// Load configuration from file and environment
    /// Priority: environment variables > config.toml > defaults
    pub fn load() -> SearchResult<Self> {
        let mut config = Self::default();

        let toml_path = Self::toml_config_path();
        if toml_path.exists() {
            if let Ok(content) = std::fs::read_to_string(&toml_path) {
                if let Ok(toml_config) = toml::from_str::<SearchConfig>(&content) {
                    config = toml_config;
                }
            }
        }

        // Environment variables take the highest priority
        if let Ok(api_base) = std::env::var("GEMINI_API_BASE") {
            config.embedding.api_base = api_base;
        }
        if let Ok(api_key) =
            std::env::var("GEMINI_API_KEY").or_else(|_| std::env::var("GOOGLE_API_KEY"))
        {
            config.embedding.api_key = Some(api_key);
        }
        if let Ok(model) = std::env::var("GEMINI_EMBED_MODEL") {
            config.embedding.model = model;
        }

        Ok(config)
    }

    /// Get config file path (config.toml)
    pub fn toml_config_path() -> PathBuf {
        base_dir().join("config.toml")
    }
}
