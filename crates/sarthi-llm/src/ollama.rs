//! Ollama chat provider implementation.

use async_trait::async_trait;

use sarthi_core::error::{SarthiError, SarthiResult};
use sarthi_core::traits::{ChatLlm, LlmConfig, TokenStream};
use sarthi_core::types::{ChatRole, Turn};

#[cfg(feature = "ollama")]
use futures::StreamExt;
#[cfg(feature = "ollama")]
use ollama_rs::{
    generation::chat::{ChatMessage, ChatMessageRequest, MessageRole as OllamaRole},
    Ollama,
};

/// Ollama chat provider.
pub struct OllamaLlm {
    #[cfg(feature = "ollama")]
    client: Ollama,
    config: LlmConfig,
}

impl OllamaLlm {
    /// Create a new Ollama chat provider.
    pub fn new(config: LlmConfig) -> SarthiResult<Self> {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| "http://localhost:11434".to_string());

        let url = url::Url::parse(&base_url)
            .map_err(|e| SarthiError::Configuration(format!("Invalid Ollama URL: {}", e)))?;

        #[cfg(feature = "ollama")]
        let client = {
            let host = url.host_str().unwrap_or("localhost").to_string();
            let port = url.port().unwrap_or(11434);
            Ollama::new(format!("http://{}", host), port)
        };

        #[cfg(not(feature = "ollama"))]
        let _ = url;

        let mut config = config;
        if config.model.is_empty() {
            config.model = "llama3.1:8b".to_string();
        }

        Ok(Self {
            #[cfg(feature = "ollama")]
            client,
            config,
        })
    }

    #[cfg(feature = "ollama")]
    fn turn_to_ollama(turn: &Turn) -> ChatMessage {
        let role = match turn.role {
            ChatRole::System => OllamaRole::System,
            ChatRole::User => OllamaRole::User,
            ChatRole::Assistant => OllamaRole::Assistant,
        };
        ChatMessage::new(role, turn.content.clone())
    }
}

#[async_trait]
impl ChatLlm for OllamaLlm {
    #[cfg(feature = "ollama")]
    async fn generate(&self, turns: &[Turn]) -> SarthiResult<String> {
        let messages: Vec<ChatMessage> = turns.iter().map(Self::turn_to_ollama).collect();
        let request = ChatMessageRequest::new(self.config.model.clone(), messages);

        let response = self
            .client
            .send_chat_messages(request)
            .await
            .map_err(|e| SarthiError::generation(format!("Ollama API error: {}", e)))?;

        Ok(response.message.content)
    }

    #[cfg(not(feature = "ollama"))]
    async fn generate(&self, _turns: &[Turn]) -> SarthiResult<String> {
        Err(SarthiError::Configuration(
            "Ollama feature not enabled. Enable the 'ollama' feature.".to_string(),
        ))
    }

    #[cfg(feature = "ollama")]
    async fn stream_chat(&self, turns: &[Turn]) -> SarthiResult<TokenStream> {
        let messages: Vec<ChatMessage> = turns.iter().map(Self::turn_to_ollama).collect();
        let request = ChatMessageRequest::new(self.config.model.clone(), messages);

        let stream = self
            .client
            .send_chat_messages_stream(request)
            .await
            .map_err(|e| SarthiError::generation(format!("Ollama API error: {}", e)))?;

        let tokens = stream.filter_map(|item| async move {
            match item {
                Ok(response) => {
                    let token = response.message.content;
                    if token.is_empty() {
                        None
                    } else {
                        Some(Ok(token))
                    }
                }
                Err(_) => Some(Err(SarthiError::generation("Ollama stream error"))),
            }
        });

        Ok(Box::pin(tokens))
    }

    #[cfg(not(feature = "ollama"))]
    async fn stream_chat(&self, _turns: &[Turn]) -> SarthiResult<TokenStream> {
        Err(SarthiError::Configuration(
            "Ollama feature not enabled. Enable the 'ollama' feature.".to_string(),
        ))
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
