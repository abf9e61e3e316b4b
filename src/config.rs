use crate::chunker::ChunkConfig;
use crate::embeddings::ollama::{DEFAULT_EMBEDDING_MODEL, DEFAULT_OLLAMA_URL};
use crate::error::Error;
use crate::index::DEFAULT_TOP_K;
use crate::llm::chat::{DEFAULT_API_BASE, DEFAULT_CHAT_MODEL, DEFAULT_TEMPERATURE};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration loaded from settings.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub chunking: ChunkConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub index: IndexConfig,
}

/// Ollama embedding server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_url")]
    pub url: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    /// Inferred from the model name when absent
    #[serde(default)]
    pub dims: Option<usize>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Chat-completion backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_chat_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Directory for on-disk index generations; in-memory only when unset
    #[serde(default)]
    pub persist_dir: Option<String>,
}

fn default_embedding_url() -> String {
    DEFAULT_OLLAMA_URL.to_string()
}

fn default_embedding_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_chat_model() -> String {
    DEFAULT_CHAT_MODEL.to_string()
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            url: default_embedding_url(),
            model: default_embedding_model(),
            dims: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            model: default_chat_model(),
            temperature: default_temperature(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

impl EmbeddingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from default location or return defaults
    pub fn load() -> Result<Self> {
        let default_paths = [
            "config/settings.toml",
            "./config/settings.toml",
            "~/.config/studymate/settings.toml",
        ];

        let candidates: Vec<PathBuf> = default_paths
            .iter()
            .map(|path| PathBuf::from(shellexpand::tilde(path).into_owned()))
            .collect();
        Self::load_first(&candidates)
    }

    /// Load the first existing file in `candidates`. An existing but invalid
    /// file is an error, not a reason to fall back to defaults.
    fn load_first(candidates: &[PathBuf]) -> Result<Self> {
        match candidates.iter().find(|path| path.exists()) {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Check invariants that serde cannot express
    pub fn validate(&self) -> std::result::Result<(), Error> {
        self.chunking.validate()?;
        if self.retrieval.top_k == 0 {
            return Err(Error::Config("retrieval top_k must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Get the chat API key from config or the GROQ_API_KEY environment variable
    pub fn llm_api_key(&self) -> Option<String> {
        self.llm
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .or_else(|| std::env::var("GROQ_API_KEY").ok())
    }

    /// Index directory with `~` and environment variables expanded
    pub fn persist_dir(&self) -> Option<PathBuf> {
        self.index.persist_dir.as_deref().map(|dir| {
            let expanded = shellexpand::full(dir)
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| dir.to_string());
            PathBuf::from(expanded)
        })
    }
}
