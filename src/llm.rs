#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! The reasoning-service boundary: a single `complete(prompt) -> text`
//! operation behind a trait so the grading pipeline can run against a
//! scripted stand-in under test.

use anyhow::{Context, Result};
use async_openai::{
    Client as OpenAIClient,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;

use crate::config::OpenAiEnv;

/// System message framing every grading request.
const SYSTEM_MESSAGE: &str = "You are an expert reviewer who grades GitHub repositories against \
                              a rubric. You are thorough, consistent, and ground every judgment \
                              in the repository content you are shown.";

/// A text-completion provider. One call per prompt, no streaming; callers
/// issue calls strictly sequentially and treat any error as a failed
/// grading attempt for the prompt's items.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Sends a prompt and returns the model's full text reply.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Completion client backed by an OpenAI-compatible chat endpoint.
pub struct OpenAiCompletion {
    /// Underlying API client.
    client:      OpenAIClient<OpenAIConfig>,
    /// Model identifier sent with each request.
    model:       String,
    /// Optional sampling temperature.
    temperature: Option<f32>,
    /// Per-call timeout; a timeout is reported as an ordinary failure.
    timeout:     std::time::Duration,
}

impl OpenAiCompletion {
    /// Builds a client from the reasoning-service configuration.
    pub fn new(env: &OpenAiEnv) -> Self {
        let config = OpenAIConfig::new()
            .with_api_base(env.api_base())
            .with_api_key(env.api_key());

        Self {
            client:      OpenAIClient::with_config(config),
            model:       env.model().to_string(),
            temperature: env.temperature(),
            timeout:     env.timeout(),
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompletion {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_MESSAGE)
                .build()?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()?
                .into(),
        ];

        let mut request = CreateChatCompletionRequestArgs::default();
        request.model(self.model.clone()).messages(messages);
        if let Some(temperature) = self.temperature {
            request.temperature(temperature);
        }
        let request = request.build()?;

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .context("Completion request timed out")?
            .context("Completion request failed")?;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .context("Completion response contained no content")
    }
}
