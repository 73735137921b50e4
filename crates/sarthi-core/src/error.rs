//! Error types for sarthi operations.
//!
//! One taxonomy for the whole core: ingestion-stage failures carry enough
//! context to be written back onto the material row, boundary-layer concerns
//! (auth/not-found/validation) stay distinguishable for the API surface.

use thiserror::Error;

use crate::types::SourceType;

/// Result type alias for sarthi operations.
pub type SarthiResult<T> = Result<T, SarthiError>;

/// Main error type for all sarthi operations.
#[derive(Error, Debug)]
pub enum SarthiError {
    /// Text extraction from a source failed (fetch, parse, unsupported content).
    /// Fatal to the enclosing ingestion job.
    #[error("Extraction failed for {source_type}: {message}")]
    Extraction {
        source_type: SourceType,
        message: String,
    },

    /// The extractor ran but produced no usable text. Treated exactly like an
    /// extraction failure by the pipeline.
    #[error("No text extracted from {source_type} source")]
    NoTextExtracted { source_type: SourceType },

    /// Embedding-provider error.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector store operation failed.
    #[error("Vector store error: {0}")]
    VectorStore(String),

    /// Summarization call failed. Non-fatal to ingestion.
    #[error("Summarization failed: {0}")]
    Summarization(String),

    /// LLM streaming/generation error during chat.
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Relational store operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// Job queue operation failed.
    #[error("Queue error: {0}")]
    Queue(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Caller is not allowed to touch the requested frame/material.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Requested entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Input validation failed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SarthiError {
    /// Create an extraction error.
    pub fn extraction(source_type: SourceType, message: impl Into<String>) -> Self {
        Self::Extraction {
            source_type,
            message: message.into(),
        }
    }

    /// Create an embedding error.
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a vector store error.
    pub fn vector_store(message: impl Into<String>) -> Self {
        Self::VectorStore(message.into())
    }

    /// Create a summarization error.
    pub fn summarization(message: impl Into<String>) -> Self {
        Self::Summarization(message.into())
    }

    /// Create a generation error.
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }

    /// Create a queue error.
    pub fn queue(message: impl Into<String>) -> Self {
        Self::Queue(message.into())
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether this error ends an ingestion job. Summarization is the one
    /// stage the pipeline recovers from locally.
    pub fn is_fatal_to_job(&self) -> bool {
        !matches!(self, Self::Summarization(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarization_is_non_fatal() {
        assert!(!SarthiError::summarization("provider down").is_fatal_to_job());
        assert!(SarthiError::extraction(SourceType::Pdf, "404").is_fatal_to_job());
        assert!(SarthiError::NoTextExtracted {
            source_type: SourceType::Image
        }
        .is_fatal_to_job());
    }

    #[test]
    fn display_includes_source_type() {
        let err = SarthiError::extraction(SourceType::WebpageLink, "timeout");
        assert!(err.to_string().contains("webpage-link"));
    }
}
