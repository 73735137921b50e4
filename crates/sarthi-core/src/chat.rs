//! Chat orchestrator: retrieval-augmented streaming conversation turns.
//!
//! Per request, strictly ordered: persist the user turn, load the history
//! window, decide retrieval, open the LLM stream, forward tokens while
//! accumulating, persist the assistant turn once the stream ends.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, info, warn};

use crate::config::ChatConfig;
use crate::error::{SarthiError, SarthiResult};
use crate::gate::should_retrieve;
use crate::index::ChunkIndex;
use crate::prompts;
use crate::traits::{ChatLlm, MaterialStore, MessageStore, TokenStream};
use crate::types::{ChatRole, ChunkFilter, Turn};

/// One chat request against a frame.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub owner_id: String,
    pub frame_id: String,
    pub query: String,
    /// Whether the caller opted into retrieval augmentation.
    pub rag_enabled: bool,
}

/// Lifecycle events surfaced to an observer alongside the token sequence.
#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// A token arrived from the provider.
    TokenReceived { token: String },
    /// The stream finished; carries the full accumulated answer.
    Completed { full_text: String },
}

/// Optional side-channel for per-token and lifecycle callbacks. Layered over
/// the primary token sequence without altering it.
pub trait ChatObserver: Send + Sync {
    fn on_token(&self, _token: &str) {}
    fn on_event(&self, _event: &ChatEvent) {}
}

/// Drives one chat turn end to end.
pub struct ChatOrchestrator {
    llm: Arc<dyn ChatLlm>,
    index: Arc<ChunkIndex>,
    messages: Arc<dyn MessageStore>,
    materials: Arc<dyn MaterialStore>,
    config: ChatConfig,
}

impl ChatOrchestrator {
    pub fn new(
        llm: Arc<dyn ChatLlm>,
        index: Arc<ChunkIndex>,
        messages: Arc<dyn MessageStore>,
        materials: Arc<dyn MaterialStore>,
        config: ChatConfig,
    ) -> Self {
        Self {
            llm,
            index,
            messages,
            materials,
            config,
        }
    }

    /// Run one chat turn. Returns the token stream to forward to the caller.
    ///
    /// The user message is persisted before anything else, so the turn is
    /// recorded even if generation fails. If the provider errors before the
    /// first token, the error propagates and no assistant message is written.
    /// If it errors mid-stream, the accumulated partial answer is persisted
    /// before the error is surfaced. A caller that drops the stream stops
    /// receiving tokens, but accumulation and persistence still finish
    /// server-side.
    pub async fn chat_stream(
        &self,
        request: ChatRequest,
        observer: Option<Arc<dyn ChatObserver>>,
    ) -> SarthiResult<TokenStream> {
        self.messages
            .insert(
                &request.frame_id,
                &request.owner_id,
                ChatRole::User,
                &request.query,
            )
            .await?;

        let history = self.load_history(&request).await?;
        let (context, summaries) = self.gather_context(&request).await;
        let turns = prompts::build_chat_turns(&request.query, &context, &summaries, &history);

        // Propagates pre-token failures to the caller directly.
        let provider_stream = self
            .llm
            .stream_chat(&turns)
            .await
            .map_err(|e| SarthiError::generation(e.to_string()))?;

        Ok(self.pipe_and_persist(request, provider_stream, observer))
    }

    /// History window: last N messages, most-recent-first then reversed to
    /// chronological. The just-persisted user turn is dropped from the tail
    /// because the prompt builder appends the query itself.
    async fn load_history(&self, request: &ChatRequest) -> SarthiResult<Vec<Turn>> {
        let rows = self
            .messages
            .recent(&request.frame_id, self.config.history_window)
            .await?;
        let mut history: Vec<Turn> = rows.iter().map(Turn::from).collect();
        if history
            .last()
            .is_some_and(|t| t.role == ChatRole::User && t.content == request.query)
        {
            history.pop();
        }
        Ok(history)
    }

    /// Build the context block and auxiliary summaries. Retrieval is an
    /// enhancement: embedding or store failures degrade to the no-context
    /// block instead of aborting the turn.
    async fn gather_context(&self, request: &ChatRequest) -> (String, String) {
        if !request.rag_enabled || !should_retrieve(&request.query) {
            return (prompts::NO_RETRIEVAL_CONTEXT.to_string(), String::new());
        }

        let summaries = match self
            .materials
            .frame_summaries(&request.owner_id, &request.frame_id)
            .await
        {
            Ok(summaries) => prompts::summaries_block(&summaries),
            Err(e) => {
                warn!(error = %e, "loading material summaries failed");
                String::new()
            }
        };

        let filter = ChunkFilter::frame(&request.owner_id, &request.frame_id);
        let context = match self
            .index
            .search(&request.query, &filter, self.config.top_k)
            .await
        {
            Ok(chunks) => prompts::context_block(&chunks),
            Err(e) => {
                warn!(error = %e, "retrieval failed, continuing without context");
                prompts::NO_RETRIEVAL_CONTEXT.to_string()
            }
        };

        (context, summaries)
    }

    /// Forward provider tokens to the caller while accumulating the full
    /// answer, then persist exactly one assistant message.
    fn pipe_and_persist(
        &self,
        request: ChatRequest,
        mut provider_stream: TokenStream,
        observer: Option<Arc<dyn ChatObserver>>,
    ) -> TokenStream {
        let messages = self.messages.clone();
        let (tx, rx) = mpsc::channel::<Result<String, SarthiError>>(64);

        tokio::spawn(async move {
            let mut full_answer = String::new();
            let mut forwarding = true;

            while let Some(item) = provider_stream.next().await {
                match item {
                    Ok(token) => {
                        full_answer.push_str(&token);
                        if let Some(observer) = &observer {
                            observer.on_token(&token);
                            observer.on_event(&ChatEvent::TokenReceived {
                                token: token.clone(),
                            });
                        }
                        if forwarding && tx.send(Ok(token)).await.is_err() {
                            // Caller went away; keep consuming so the answer
                            // still gets persisted.
                            forwarding = false;
                        }
                    }
                    Err(e) => {
                        let e = SarthiError::generation(e.to_string());
                        if !full_answer.is_empty() {
                            if let Err(persist_err) = messages
                                .insert(
                                    &request.frame_id,
                                    &request.owner_id,
                                    ChatRole::Assistant,
                                    &full_answer,
                                )
                                .await
                            {
                                error!(error = %persist_err, "persisting partial answer failed");
                            } else {
                                warn!("stream failed mid-answer, partial text persisted");
                            }
                        }
                        if forwarding {
                            let _ = tx.send(Err(e)).await;
                        }
                        return;
                    }
                }
            }

            if let Err(e) = messages
                .insert(
                    &request.frame_id,
                    &request.owner_id,
                    ChatRole::Assistant,
                    &full_answer,
                )
                .await
            {
                error!(error = %e, "persisting assistant message failed");
                if forwarding {
                    let _ = tx.send(Err(e)).await;
                }
                return;
            }

            if let Some(observer) = &observer {
                observer.on_event(&ChatEvent::Completed {
                    full_text: full_answer.clone(),
                });
            }
            info!(
                frame_id = %request.frame_id,
                chars = full_answer.len(),
                "chat turn persisted"
            );
        });

        Box::pin(ReceiverStream::new(rx))
    }
}
