//! services/api/src/adapters/llm.rs
//!
//! This module contains the adapter for the query-generating LLM.
//! It implements the `GenerationBackend` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
    Client,
};
use async_trait::async_trait;
use transactions_core::ports::{BackendError, BackendResult, GenerationBackend};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `GenerationBackend` using an OpenAI-compatible LLM.
///
/// Model selection and sampling parameters are injected at construction time;
/// the adapter holds no ambient global state.
#[derive(Clone)]
pub struct OpenAiGenerationAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiGenerationAdapter {
    /// Creates a new `OpenAiGenerationAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String, temperature: f32, max_tokens: u32) -> Self {
        Self {
            client,
            model,
            temperature,
            max_tokens,
        }
    }
}

//=========================================================================================
// `GenerationBackend` Trait Implementation
//=========================================================================================

#[async_trait]
impl GenerationBackend for OpenAiGenerationAdapter {
    /// Sends one policy-rendered instruction text and returns the raw
    /// narrative answer.
    async fn complete(&self, prompt: &str) -> BackendResult<String> {
        let messages = vec![ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| BackendError::Unexpected(e.to_string()))?
            .into()];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .max_completion_tokens(self.max_tokens)
            .n(1)
            .build()
            .map_err(|e| BackendError::Unexpected(e.to_string()))?;

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| BackendError::Unavailable(e.to_string()))?;

        // Extract the text content from the first choice in the response.
        if let Some(choice) = response.choices.into_iter().next() {
            match choice.message.content {
                Some(content) if !content.trim().is_empty() => Ok(content),
                _ => Err(BackendError::EmptyCompletion),
            }
        } else {
            Err(BackendError::EmptyCompletion)
        }
    }
}
