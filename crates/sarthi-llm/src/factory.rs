//! Factory for creating chat LLM providers.

use std::sync::Arc;

use sarthi_core::error::SarthiResult;
use sarthi_core::traits::{ChatLlm, LlmConfig, LlmProvider};

use crate::ollama::OllamaLlm;
use crate::openai::OpenAILlm;

/// Factory for creating chat LLM providers.
pub struct LlmFactory;

impl LlmFactory {
    /// Create a chat LLM from the given configuration.
    pub fn create(config: LlmConfig) -> SarthiResult<Arc<dyn ChatLlm>> {
        match config.provider {
            LlmProvider::OpenAI => {
                let llm = OpenAILlm::new(config)?;
                Ok(Arc::new(llm))
            }
            LlmProvider::Ollama => {
                let llm = OllamaLlm::new(config)?;
                Ok(Arc::new(llm))
            }
        }
    }

    /// Create an OpenAI chat LLM with a specific model.
    pub fn openai_with_model(model: impl Into<String>) -> SarthiResult<Arc<dyn ChatLlm>> {
        let config = LlmConfig {
            model: model.into(),
            ..Default::default()
        };
        Self::create(config)
    }

    /// Create an Ollama chat LLM with a specific model.
    pub fn ollama_with_model(model: impl Into<String>) -> SarthiResult<Arc<dyn ChatLlm>> {
        let config = LlmConfig {
            provider: LlmProvider::Ollama,
            model: model.into(),
            ..Default::default()
        };
        Self::create(config)
    }
}
