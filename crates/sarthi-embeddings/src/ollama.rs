//! Ollama embedding provider implementation.

use async_trait::async_trait;

use sarthi_core::error::{SarthiError, SarthiResult};
use sarthi_core::traits::{Embedder, EmbedderConfig};

#[cfg(feature = "ollama")]
use ollama_rs::{generation::embeddings::request::GenerateEmbeddingsRequest, Ollama};

/// Ollama embedding provider.
pub struct OllamaEmbedder {
    #[cfg(feature = "ollama")]
    client: Ollama,
    config: EmbedderConfig,
}

impl OllamaEmbedder {
    /// Create a new Ollama embedder.
    pub fn new(config: EmbedderConfig) -> SarthiResult<Self> {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| "http://localhost:11434".to_string());

        let url = url::Url::parse(&base_url)
            .map_err(|e| SarthiError::Configuration(format!("Invalid Ollama URL: {}", e)))?;

        #[cfg(feature = "ollama")]
        let client = {
            let host = url.host_str().unwrap_or("localhost").to_string();
            let port = url.port().unwrap_or(11434);
            Ollama::new(format!("http://{}", host), port)
        };

        #[cfg(not(feature = "ollama"))]
        let _ = url;

        Ok(Self {
            #[cfg(feature = "ollama")]
            client,
            config,
        })
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    #[cfg(feature = "ollama")]
    async fn embed(&self, text: &str) -> SarthiResult<Vec<f32>> {
        let request = GenerateEmbeddingsRequest::new(self.config.model.clone(), text.into());

        let response = self
            .client
            .generate_embeddings(request)
            .await
            .map_err(|e| SarthiError::embedding(format!("Ollama embedding error: {}", e)))?;

        response
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| SarthiError::embedding("No embedding returned"))
    }

    #[cfg(not(feature = "ollama"))]
    async fn embed(&self, _text: &str) -> SarthiResult<Vec<f32>> {
        Err(SarthiError::Configuration(
            "Ollama feature not enabled. Enable the 'ollama' feature.".to_string(),
        ))
    }

    fn dimension(&self) -> usize {
        self.config.embedding_dims
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
