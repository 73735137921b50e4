//! sarthi-llm - Chat LLM provider implementations for sarthi.
//!
//! # Supported Providers
//!
//! - **OpenAI** (feature: `openai`) - gpt-4o-mini and friends, with token streaming
//! - **Ollama** (feature: `ollama`) - Local models via Ollama, with token streaming
//!
//! # Example
//!
//! ```ignore
//! use sarthi_llm::LlmFactory;
//!
//! let llm = LlmFactory::openai_with_model("gpt-4o-mini")?;
//! let mut stream = llm.stream_chat(&turns).await?;
//! ```

mod factory;
mod ollama;
mod openai;

pub use factory::LlmFactory;
pub use ollama::OllamaLlm;
pub use openai::OpenAILlm;

// Re-export core types for convenience
pub use sarthi_core::traits::{ChatLlm, LlmConfig, LlmProvider, TokenStream};
