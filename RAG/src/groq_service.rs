use crate::config::{ChatConfig, RetryPolicy};
use crate::error::{RagError, Result};
use crate::models::*;
use crate::provider_client::ProviderClient;
use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Chat completions against Groq's OpenAI-compatible endpoint.
pub struct GroqService {
    client: ProviderClient,
    url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl GroqService {
    pub fn new(config: &ChatConfig, timeout: Duration, retry: RetryPolicy) -> Result<Self> {
        Ok(Self {
            client: ProviderClient::new("Groq", config.api_key.clone(), timeout, retry)?,
            url: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl ChatModel for GroqService {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response: ChatCompletionResponse = self.client.post_json(&self.url, &request).await?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .filter(|answer| !answer.trim().is_empty())
            .ok_or_else(|| RagError::provider(self.client.name(), None, "No response generated"))
    }
}

pub fn build_context(chunks: &[ScoredChunk]) -> String {
    chunks
        .iter()
        .map(|scored| scored.chunk.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn build_prompt(question: &str, context: &str) -> String {
    format!(
        r#"Answer the questions based on the provided context only.
Please provide the most accurate response based on the question
<context>
{context}
<context>
Questions: {question}"#
    )
}
