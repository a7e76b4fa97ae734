use crate::config::{EmbeddingConfig, EmbeddingProviderKind, RetryPolicy};
use crate::error::{RagError, Result};
use crate::models::*;
use crate::provider_client::ProviderClient;
use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

#[async_trait]
pub trait Embedder: Send + Sync {
    /// One vector per input, in input order.
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut embeddings = self.embed_documents(&[text.to_string()]).await?;
        embeddings
            .pop()
            .ok_or_else(|| RagError::provider("Embedding", None, "No embedding returned for query"))
    }
}

pub fn build_embedder(config: &EmbeddingConfig, timeout: Duration, retry: RetryPolicy) -> Result<Arc<dyn Embedder>> {
    match config.provider {
        EmbeddingProviderKind::OpenAi => {
            let api_key = config
                .api_key
                .clone()
                .ok_or_else(|| RagError::Config("OPENAI_API_KEY environment variable not set".to_string()))?;
            log::info!("Using OpenAI embeddings ({})", config.model);
            Ok(Arc::new(OpenAiEmbedder::new(
                api_key,
                config.model.clone(),
                config.base_url.clone(),
                timeout,
                retry,
            )?))
        }
        EmbeddingProviderKind::Local => {
            log::info!("Using local hashing embeddings");
            Ok(Arc::new(LocalEmbedder::default()))
        }
    }
}

pub struct OpenAiEmbedder {
    client: ProviderClient,
    model: String,
    url: String,
}

impl OpenAiEmbedder {
    pub fn new(
        api_key: String,
        model: String,
        base_url: String,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self> {
        Ok(Self {
            client: ProviderClient::new("OpenAI embeddings", api_key, timeout, retry)?,
            model,
            url: format!("{}/embeddings", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbeddingRequest {
            model: &self.model,
            input: texts,
        };
        let response: EmbeddingResponse = self.client.post_json(&self.url, &request).await?;

        if response.data.len() != texts.len() {
            return Err(RagError::provider(
                self.client.name(),
                None,
                format!("Expected {} embeddings, got {}", texts.len(), response.data.len()),
            ));
        }

        let mut data = response.data;
        data.sort_by_key(|d| d.index);
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

/// Offline embedder: term frequencies hashed into a fixed number of buckets,
/// L2-normalised. Deterministic within a build, no network access.
pub struct LocalEmbedder {
    dimensions: usize,
}

impl Default for LocalEmbedder {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl LocalEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn embed(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0; self.dimensions];
        let words = tokenize(text);
        let total_words = words.len() as f32;

        for (word, count) in count_words(&words) {
            let mut hasher = DefaultHasher::new();
            word.hash(&mut hasher);
            let idx = (hasher.finish() % self.dimensions as u64) as usize;
            embedding[idx] += count as f32 / total_words;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in embedding.iter_mut() {
                *value /= norm;
            }
        }

        embedding
    }
}

#[async_trait]
impl Embedder for LocalEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed(text)).collect())
    }
}

/// Lowercased alphanumeric words longer than two characters.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|word| word.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
        .filter(|word| word.chars().count() > 2)
        .collect()
}

fn count_words(words: &[String]) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for word in words {
        *counts.entry(word.as_str()).or_insert(0) += 1;
    }
    counts
}
