//! Application configuration.
//!
//! Components each carry their own config struct; `AppConfig` aggregates them
//! for process start-up. Values come from an optional TOML file with
//! environment variables (loaded via dotenv) overriding API credentials.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{SarthiError, SarthiResult};
use crate::traits::{EmbedderConfig, LlmConfig, VectorStoreConfig};

/// Chunker settings. Defaults mirror the production deployment: 500-unit
/// chunks with 100 units of overlap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkerConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

fn default_chunk_size() -> usize {
    500
}

fn default_chunk_overlap() -> usize {
    100
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

/// Chat orchestrator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// How many persisted messages to load as conversation history.
    #[serde(default = "default_history_window")]
    pub history_window: usize,
    /// How many chunks to retrieve per query.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_history_window() -> usize {
    40
}

fn default_top_k() -> usize {
    3
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            top_k: default_top_k(),
        }
    }
}

/// Job queue and worker pool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Number of concurrent pipeline workers.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Delivery attempts per job before it is recorded as failed.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    /// Buffered jobs before `enqueue` applies backpressure.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Age in seconds after which a still-`pending` material is re-enqueued
    /// by the reconciliation sweep.
    #[serde(default = "default_stale_after_secs")]
    pub stale_after_secs: u64,
}

fn default_workers() -> usize {
    4
}

fn default_max_attempts() -> usize {
    3
}

fn default_capacity() -> usize {
    256
}

fn default_stale_after_secs() -> u64 {
    600
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            max_attempts: default_max_attempts(),
            capacity: default_capacity(),
            stale_after_secs: default_stale_after_secs(),
        }
    }
}

/// Aggregate configuration, constructed once at process start and handed to
/// the components that need it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub embedder: EmbedderConfig,
    #[serde(default)]
    pub vector_store: VectorStoreConfig,
    #[serde(default)]
    pub chunker: ChunkerConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub queue: QueueConfig,
    /// Path of the SQLite database file (`:memory:` for ephemeral runs).
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

fn default_database_path() -> String {
    "sarthi.db".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            embedder: EmbedderConfig::default(),
            vector_store: VectorStoreConfig::default(),
            chunker: ChunkerConfig::default(),
            chat: ChatConfig::default(),
            queue: QueueConfig::default(),
            database_path: default_database_path(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> SarthiResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&raw)
            .map_err(|e| SarthiError::Configuration(format!("invalid config file: {e}")))
    }

    /// Load `.env` (if present) and fill credentials from the environment
    /// when the file did not provide them.
    pub fn with_env_credentials(mut self) -> Self {
        let _ = dotenvy::dotenv();
        if self.llm.api_key.is_none() {
            self.llm.api_key = std::env::var("OPENAI_API_KEY").ok();
        }
        if self.embedder.api_key.is_none() {
            self.embedder.api_key = std::env::var("OPENAI_API_KEY").ok();
        }
        if self.vector_store.api_key.is_none() {
            self.vector_store.api_key = std::env::var("PINECONE_API_KEY").ok();
        }
        if self.vector_store.url.is_none() {
            self.vector_store.url = std::env::var("PINECONE_INDEX_HOST").ok();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployment() {
        let config = AppConfig::default();
        assert_eq!(config.chunker.chunk_size, 500);
        assert_eq!(config.chunker.chunk_overlap, 100);
        assert_eq!(config.chat.history_window, 40);
        assert_eq!(config.chat.top_k, 3);
        assert_eq!(config.queue.max_attempts, 3);
    }

    #[test]
    fn parses_partial_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            database_path = ":memory:"

            [chunker]
            chunk_size = 200

            [llm]
            model = "gpt-4.1-mini"
            "#,
        )
        .unwrap();
        assert_eq!(config.database_path, ":memory:");
        assert_eq!(config.chunker.chunk_size, 200);
        assert_eq!(config.chunker.chunk_overlap, 100);
        assert_eq!(config.llm.model, "gpt-4.1-mini");
    }
}
