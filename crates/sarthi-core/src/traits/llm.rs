//! Chat LLM trait and configuration.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::error::{SarthiError, SarthiResult};
use crate::types::Turn;

/// One item of a streaming response: a text fragment or a provider error.
pub type TokenItem = Result<String, SarthiError>;

/// A finite, forward-only, non-restartable sequence of text fragments.
/// Dropping the stream early cancels the underlying request.
pub type TokenStream = Pin<Box<dyn futures::Stream<Item = TokenItem> + Send>>;

/// Core chat LLM trait - all providers implement this.
#[async_trait]
pub trait ChatLlm: Send + Sync {
    /// One-shot completion; returns the full response text.
    async fn generate(&self, turns: &[Turn]) -> SarthiResult<String>;

    /// Open a streaming completion call.
    async fn stream_chat(&self, turns: &[Turn]) -> SarthiResult<TokenStream>;

    /// Model name/identifier.
    fn model_name(&self) -> &str;
}

/// LLM configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider type.
    #[serde(default)]
    pub provider: LlmProvider,
    /// Model name/identifier.
    pub model: String,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// API key (if not using an environment variable).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Base URL for the API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_tokens() -> u32 {
    4096
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            model: String::new(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            api_key: None,
            base_url: None,
        }
    }
}

/// LLM provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    OpenAI,
    Ollama,
}
