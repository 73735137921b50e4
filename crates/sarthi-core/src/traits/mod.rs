//! Trait seams for pluggable backends.

mod embedder;
mod extractor;
mod llm;
mod store;
mod vector_store;

pub use embedder::{Embedder, EmbedderConfig, EmbedderProvider};
pub use extractor::SourceExtractor;
pub use llm::{ChatLlm, LlmConfig, LlmProvider, TokenItem, TokenStream};
pub use store::{MaterialStore, MaterialSummary, MessageStore};
pub use vector_store::{
    VectorRecord, VectorSearchResult, VectorStore, VectorStoreConfig, VectorStoreProvider,
};
