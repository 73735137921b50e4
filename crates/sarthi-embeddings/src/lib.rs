//! sarthi-embeddings - Embedding provider implementations for sarthi.
//!
//! # Supported Providers
//!
//! - **OpenAI** (feature: `openai`) - text-embedding-3-small, text-embedding-3-large, etc.
//! - **Ollama** (feature: `ollama`) - Local embedding models via Ollama
//!
//! # Example
//!
//! ```ignore
//! use sarthi_embeddings::EmbedderFactory;
//!
//! // Create an OpenAI embedder
//! let embedder = EmbedderFactory::openai()?;
//!
//! // Or with a specific model
//! let embedder = EmbedderFactory::openai_with_model("text-embedding-3-large", 3072)?;
//! ```

mod factory;
mod ollama;
mod openai;

pub use factory::EmbedderFactory;
pub use ollama::OllamaEmbedder;
pub use openai::OpenAIEmbedder;

// Re-export core types for convenience
pub use sarthi_core::traits::{Embedder, EmbedderConfig, EmbedderProvider};
