//! Shared fakes for the integration tests: a deterministic embedder, an
//! in-memory vector store, scripted extractors, and a scripted LLM.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};

use sarthi_core::error::{SarthiError, SarthiResult};
use sarthi_core::traits::{
    ChatLlm, Embedder, SourceExtractor, TokenStream, VectorRecord, VectorSearchResult, VectorStore,
};
use sarthi_core::types::{ChunkFilter, SourceType, Turn};

/// Deterministic embedder: same text, same vector. Counts calls so tests can
/// assert retrieval was (not) attempted.
#[derive(Default)]
pub struct HashEmbedder {
    pub calls: AtomicUsize,
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> SarthiResult<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut vector = vec![0.0f32; 8];
        for (i, byte) in text.bytes().enumerate() {
            vector[i % 8] += byte as f32;
        }
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        8
    }

    fn model_name(&self) -> &str {
        "hash-embedder"
    }
}

/// In-memory vector store honoring the filter contract, with an optional
/// induced search failure.
#[derive(Default)]
pub struct MemStore {
    records: RwLock<HashMap<String, VectorRecord>>,
    pub fail_search: bool,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_search() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            fail_search: true,
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }
}

#[async_trait]
impl VectorStore for MemStore {
    async fn upsert(&self, records: Vec<VectorRecord>) -> SarthiResult<()> {
        let mut map = self.records.write().unwrap();
        for record in records {
            map.insert(record.id.clone(), record);
        }
        Ok(())
    }

    async fn search(
        &self,
        _query_vector: &[f32],
        limit: usize,
        filter: &ChunkFilter,
    ) -> SarthiResult<Vec<VectorSearchResult>> {
        if self.fail_search {
            return Err(SarthiError::vector_store("induced search failure"));
        }
        let map = self.records.read().unwrap();
        let mut results: Vec<VectorSearchResult> = map
            .values()
            .filter(|r| filter.matches(&r.payload))
            .map(|r| VectorSearchResult {
                id: r.id.clone(),
                score: 1.0,
                payload: r.payload.clone(),
            })
            .collect();
        results.truncate(limit);
        Ok(results)
    }

    async fn delete_by_filter(&self, filter: &ChunkFilter) -> SarthiResult<()> {
        let mut map = self.records.write().unwrap();
        map.retain(|_, r| !filter.matches(&r.payload));
        Ok(())
    }
}

/// Extractor returning a fixed text or a fixed failure, counting attempts.
pub struct FakeExtractor {
    source_type: SourceType,
    text: Option<String>,
    pub attempts: AtomicUsize,
}

impl FakeExtractor {
    pub fn ok(source_type: SourceType, text: impl Into<String>) -> Self {
        Self {
            source_type,
            text: Some(text.into()),
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn failing(source_type: SourceType) -> Self {
        Self {
            source_type,
            text: None,
            attempts: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SourceExtractor for FakeExtractor {
    async fn extract(&self, _url: &str) -> SarthiResult<String> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.text
            .clone()
            .ok_or_else(|| SarthiError::extraction(self.source_type, "induced extraction failure"))
    }

    fn source_type(&self) -> SourceType {
        self.source_type
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Chat LLM driven by a script. Captures every prompt so tests can inspect
/// what the orchestrator sent.
pub struct ScriptedLlm {
    summary: Option<String>,
    tokens: Vec<Result<String, String>>,
    fail_stream_open: bool,
    pub prompts: Mutex<Vec<Vec<Turn>>>,
}

impl ScriptedLlm {
    /// Streams the given fragments and answers `generate` with `summary`.
    pub fn new(summary: impl Into<String>, tokens: &[&str]) -> Self {
        Self {
            summary: Some(summary.into()),
            tokens: tokens.iter().map(|t| Ok(t.to_string())).collect(),
            fail_stream_open: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Streams the fragments, then yields a provider error.
    pub fn failing_mid_stream(tokens: &[&str]) -> Self {
        let mut script: Vec<Result<String, String>> =
            tokens.iter().map(|t| Ok(t.to_string())).collect();
        script.push(Err("induced mid-stream failure".to_string()));
        Self {
            summary: Some(String::new()),
            tokens: script,
            fail_stream_open: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Fails before producing any token.
    pub fn failing_on_open() -> Self {
        Self {
            summary: Some(String::new()),
            tokens: Vec::new(),
            fail_stream_open: true,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// `generate` fails; streaming works. For summarization tests.
    pub fn without_summary(tokens: &[&str]) -> Self {
        Self {
            summary: None,
            tokens: tokens.iter().map(|t| Ok(t.to_string())).collect(),
            fail_stream_open: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// The system turn of the most recent prompt.
    pub fn last_system_turn(&self) -> String {
        let prompts = self.prompts.lock().unwrap();
        prompts
            .last()
            .and_then(|turns| turns.first())
            .map(|t| t.content.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatLlm for ScriptedLlm {
    async fn generate(&self, turns: &[Turn]) -> SarthiResult<String> {
        self.prompts.lock().unwrap().push(turns.to_vec());
        self.summary
            .clone()
            .ok_or_else(|| SarthiError::generation("induced generate failure"))
    }

    async fn stream_chat(&self, turns: &[Turn]) -> SarthiResult<TokenStream> {
        self.prompts.lock().unwrap().push(turns.to_vec());
        if self.fail_stream_open {
            return Err(SarthiError::generation("induced stream-open failure"));
        }
        let items: Vec<Result<String, SarthiError>> = self
            .tokens
            .iter()
            .map(|item| match item {
                Ok(token) => Ok(token.clone()),
                Err(message) => Err(SarthiError::generation(message.clone())),
            })
            .collect();
        Ok(Box::pin(futures::stream::iter(items)))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}
