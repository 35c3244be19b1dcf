//! services/api/src/adapters/chat_llm.rs
//!
//! This module contains the adapter for the chat-completion LLM.
//! It implements the `CompletionService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use backoff::ExponentialBackoff;
use std::time::Duration;
use study_assistant_core::{
    domain::{ConversationTurn, Role},
    ports::{CompletionService, PortError, PortResult},
};

//=========================================================================================
// Client Construction
//=========================================================================================

/// Builds a client that sends exactly one HTTP request per call.
///
/// The client's built-in backoff retries 5xx and 429 responses for up to 15 minutes.
/// Here it gives up immediately, leaving retries to `RetryingCompletion` and its
/// configured attempt budget.
pub fn single_attempt_client(config: OpenAIConfig) -> Client<OpenAIConfig> {
    Client::with_config(config).with_backoff(ExponentialBackoff {
        max_elapsed_time: Some(Duration::ZERO),
        ..ExponentialBackoff::default()
    })
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `CompletionService` using an OpenAI-compatible chat endpoint.
#[derive(Clone)]
pub struct OpenAiChatAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    max_tokens: Option<u32>,
}

impl OpenAiChatAdapter {
    /// Creates a new `OpenAiChatAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String, max_tokens: Option<u32>) -> Self {
        Self {
            client,
            model,
            max_tokens,
        }
    }

    fn to_request_message(turn: &ConversationTurn) -> PortResult<ChatCompletionRequestMessage> {
        let content = turn.content.as_str();
        let message = match turn.role {
            Role::System => ChatCompletionRequestSystemMessageArgs::default()
                .content(content)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            Role::User => ChatCompletionRequestUserMessageArgs::default()
                .content(content)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                .content(content)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        };
        Ok(message)
    }

    /// Separates failures worth retrying (network, rate limits, server-side errors)
    /// from ones that will fail the same way again.
    fn classify_error(e: OpenAIError) -> PortError {
        match &e {
            OpenAIError::Reqwest(_) => PortError::Unavailable(e.to_string()),
            OpenAIError::ApiError(api) => {
                // 5xx bodies are not parsed, so server errors carry no type.
                let transient = match api.r#type.as_deref() {
                    None => true,
                    Some(kind) => {
                        kind.contains("rate_limit")
                            || kind.contains("server_error")
                            || kind.contains("overloaded")
                    }
                } || api.code.as_deref() == Some("rate_limit_exceeded");

                if transient {
                    PortError::Unavailable(e.to_string())
                } else {
                    PortError::Generation(e.to_string())
                }
            }
            _ => PortError::Generation(e.to_string()),
        }
    }
}

//=========================================================================================
// `CompletionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CompletionService for OpenAiChatAdapter {
    /// Sends the ordered conversation and returns the text of the first choice.
    async fn complete(&self, messages: &[ConversationTurn]) -> PortResult<String> {
        let messages = messages
            .iter()
            .map(Self::to_request_message)
            .collect::<PortResult<Vec<_>>>()?;

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(&self.model).messages(messages).n(1);
        if let Some(max_tokens) = self.max_tokens {
            builder.max_tokens(max_tokens);
        }
        let request = builder
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Transport and rate-limit failures come back as `Unavailable` so the retry layer can act on them.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(Self::classify_error)?;

        // Extract the text content from the first choice in the response.
        let content = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| {
                PortError::Generation("Completion endpoint returned no choices.".to_string())
            })?
            .message
            .content
            .ok_or_else(|| {
                PortError::Generation("Completion response contained no text content.".to_string())
            })?;

        if content.trim().is_empty() {
            return Err(PortError::Generation(
                "Completion response was blank.".to_string(),
            ));
        }
        Ok(content)
    }
}
