//! Core domain types.

mod chunk;
mod filter;
mod job;
mod material;
mod message;

pub use chunk::{ChunkMetadata, ChunkRecord, ScoredChunk};
pub use filter::ChunkFilter;
pub use job::ProcessingJob;
pub use material::{
    title_from_link, NewMaterial, ProcessingStatus, SourceType, StudyMaterial,
};
pub use message::{ChatRole, StoredMessage, Turn};
