//! Factory for creating vector store backends.

use std::sync::Arc;

use sarthi_core::error::SarthiResult;
use sarthi_core::traits::{VectorStore, VectorStoreConfig, VectorStoreProvider};

use crate::memory::MemoryVectorStore;
#[cfg(feature = "pinecone")]
use crate::pinecone::PineconeVectorStore;

/// Factory for creating vector store backends.
pub struct VectorStoreFactory;

impl VectorStoreFactory {
    /// Create a vector store from the given configuration.
    pub fn create(config: VectorStoreConfig) -> SarthiResult<Arc<dyn VectorStore>> {
        match config.provider {
            #[cfg(feature = "pinecone")]
            VectorStoreProvider::Pinecone => {
                let store = PineconeVectorStore::new(config)?;
                Ok(Arc::new(store))
            }
            #[cfg(not(feature = "pinecone"))]
            VectorStoreProvider::Pinecone => Err(sarthi_core::error::SarthiError::Configuration(
                "Pinecone feature not enabled. Enable the 'pinecone' feature.".to_string(),
            )),
            VectorStoreProvider::Memory => Ok(Arc::new(MemoryVectorStore::new())),
        }
    }

    /// Create an in-memory store, for local runs and tests.
    pub fn memory() -> Arc<dyn VectorStore> {
        Arc::new(MemoryVectorStore::new())
    }
}
