//! sarthi-core - Core library for sarthi.
//!
//! This crate provides the types, traits, ingestion pipeline, and chat
//! orchestrator for the sarthi study-assistant engine.
//!
//! # Example
//!
//! ```ignore
//! use sarthi_core::{AppConfig, ChatOrchestrator, ChatRequest};
//!
//! let config = AppConfig::default().with_env_credentials();
//! let orchestrator = ChatOrchestrator::new(llm, index, messages, materials, config.chat);
//!
//! // Stream one chat turn
//! let mut stream = orchestrator
//!     .chat_stream(ChatRequest { owner_id, frame_id, query, rag_enabled: true }, None)
//!     .await?;
//! ```

pub mod chat;
pub mod chunker;
pub mod config;
pub mod error;
pub mod gate;
pub mod index;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod queue;
pub mod reconcile;
pub mod store;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use chat::{ChatEvent, ChatObserver, ChatOrchestrator, ChatRequest};
pub use chunker::RecursiveTextChunker;
pub use config::{AppConfig, ChatConfig, ChunkerConfig, QueueConfig};
pub use error::{SarthiError, SarthiResult};
pub use gate::should_retrieve;
pub use index::ChunkIndex;
pub use pipeline::{ExtractorSet, MaterialPipeline};
pub use progress::{ProgressBus, ProgressEvent, ProgressStep, ProgressSubscriber};
pub use queue::{MaterialQueue, QueueEvent};
pub use reconcile::PendingSweeper;
pub use store::SqliteStore;
pub use traits::{
    ChatLlm, Embedder, EmbedderConfig, LlmConfig, MaterialStore, MaterialSummary, MessageStore,
    SourceExtractor, TokenStream, VectorRecord, VectorSearchResult, VectorStore, VectorStoreConfig,
};
pub use types::{
    ChatRole, ChunkFilter, ChunkMetadata, ChunkRecord, NewMaterial, ProcessingJob,
    ProcessingStatus, ScoredChunk, SourceType, StoredMessage, StudyMaterial, Turn,
};
