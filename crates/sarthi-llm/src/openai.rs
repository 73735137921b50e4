//! OpenAI chat provider implementation.

use async_trait::async_trait;

use sarthi_core::error::{SarthiError, SarthiResult};
use sarthi_core::traits::{ChatLlm, LlmConfig, TokenStream};
use sarthi_core::types::{ChatRole, Turn};

#[cfg(feature = "openai")]
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessage, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessage, ChatCompletionRequestUserMessage,
        CreateChatCompletionRequest,
    },
    Client,
};
#[cfg(feature = "openai")]
use futures::StreamExt;

/// OpenAI chat provider.
pub struct OpenAILlm {
    #[cfg(feature = "openai")]
    client: Client<OpenAIConfig>,
    config: LlmConfig,
}

impl OpenAILlm {
    /// Create a new OpenAI chat provider.
    pub fn new(config: LlmConfig) -> SarthiResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                SarthiError::Configuration("OpenAI API key not found. Set OPENAI_API_KEY environment variable or provide api_key in config.".to_string())
            })?;

        #[cfg(feature = "openai")]
        let openai_config = if let Some(ref base_url) = config.base_url {
            OpenAIConfig::new()
                .with_api_key(api_key)
                .with_api_base(base_url)
        } else {
            OpenAIConfig::new().with_api_key(api_key)
        };

        #[cfg(feature = "openai")]
        let client = Client::with_config(openai_config);

        #[cfg(not(feature = "openai"))]
        let _ = api_key;

        let mut config = config;
        if config.model.is_empty() {
            config.model = "gpt-4o-mini".to_string();
        }

        Ok(Self {
            #[cfg(feature = "openai")]
            client,
            config,
        })
    }

    #[cfg(feature = "openai")]
    fn turn_to_openai(turn: &Turn) -> ChatCompletionRequestMessage {
        match turn.role {
            ChatRole::System => {
                ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                    content: async_openai::types::ChatCompletionRequestSystemMessageContent::Text(
                        turn.content.clone(),
                    ),
                    name: None,
                })
            }
            ChatRole::User => {
                ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                    content: async_openai::types::ChatCompletionRequestUserMessageContent::Text(
                        turn.content.clone(),
                    ),
                    name: None,
                })
            }
            ChatRole::Assistant => {
                ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                    content: Some(
                        async_openai::types::ChatCompletionRequestAssistantMessageContent::Text(
                            turn.content.clone(),
                        ),
                    ),
                    ..Default::default()
                })
            }
        }
    }

    #[cfg(feature = "openai")]
    fn build_request(&self, turns: &[Turn], stream: bool) -> CreateChatCompletionRequest {
        CreateChatCompletionRequest {
            model: self.config.model.clone(),
            messages: turns.iter().map(Self::turn_to_openai).collect(),
            temperature: Some(self.config.temperature),
            max_tokens: Some(self.config.max_tokens),
            stream: Some(stream),
            ..Default::default()
        }
    }
}

#[async_trait]
impl ChatLlm for OpenAILlm {
    #[cfg(feature = "openai")]
    async fn generate(&self, turns: &[Turn]) -> SarthiResult<String> {
        let request = self.build_request(turns, false);

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| SarthiError::generation(format!("OpenAI API error: {}", e)))?;

        let choice = response
            .choices
            .first()
            .ok_or_else(|| SarthiError::generation("No response choices returned"))?;

        choice
            .message
            .content
            .clone()
            .ok_or_else(|| SarthiError::generation("Empty response content"))
    }

    #[cfg(not(feature = "openai"))]
    async fn generate(&self, _turns: &[Turn]) -> SarthiResult<String> {
        Err(SarthiError::Configuration(
            "OpenAI feature not enabled. Enable the 'openai' feature.".to_string(),
        ))
    }

    #[cfg(feature = "openai")]
    async fn stream_chat(&self, turns: &[Turn]) -> SarthiResult<TokenStream> {
        let request = self.build_request(turns, true);

        let stream = self
            .client
            .chat()
            .create_stream(request)
            .await
            .map_err(|e| SarthiError::generation(format!("OpenAI API error: {}", e)))?;

        // Deltas with no content (role markers, finish chunks) are dropped.
        let tokens = stream.filter_map(|item| async move {
            match item {
                Ok(response) => response
                    .choices
                    .first()
                    .and_then(|c| c.delta.content.clone())
                    .filter(|token| !token.is_empty())
                    .map(Ok),
                Err(e) => Some(Err(SarthiError::generation(format!(
                    "OpenAI stream error: {}",
                    e
                )))),
            }
        });

        Ok(Box::pin(tokens))
    }

    #[cfg(not(feature = "openai"))]
    async fn stream_chat(&self, _turns: &[Turn]) -> SarthiResult<TokenStream> {
        Err(SarthiError::Configuration(
            "OpenAI feature not enabled. Enable the 'openai' feature.".to_string(),
        ))
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
