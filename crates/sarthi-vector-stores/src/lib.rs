//! sarthi-vector-stores - Vector store implementations for sarthi.
//!
//! # Supported Backends
//!
//! - **Pinecone** (feature: `pinecone`) - Serverless index over the data-plane REST API
//! - **Memory** - Embedded in-memory store for local runs and tests
//!
//! # Example
//!
//! ```ignore
//! use sarthi_vector_stores::VectorStoreFactory;
//!
//! let store = VectorStoreFactory::create(config)?;
//! ```

mod factory;
mod memory;
#[cfg(feature = "pinecone")]
mod pinecone;

pub use factory::VectorStoreFactory;
pub use memory::MemoryVectorStore;
#[cfg(feature = "pinecone")]
pub use pinecone::PineconeVectorStore;

// Re-export core types for convenience
pub use sarthi_core::traits::{
    VectorRecord, VectorSearchResult, VectorStore, VectorStoreConfig, VectorStoreProvider,
};
