use crate::config::RetrievalConfig;
use crate::embedding_service::Embedder;
use crate::error::{RagError, Result};
use crate::groq_service::{build_context, build_prompt, ChatModel};
use crate::indexer::DocumentIndex;
use crate::models::*;
use std::sync::Arc;

/// Answers questions against a built index. Shared read-only across requests.
pub struct QueryService {
    embedder: Arc<dyn Embedder>,
    chat: Arc<dyn ChatModel>,
    index: DocumentIndex,
    retrieval: RetrievalConfig,
}

impl QueryService {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        chat: Arc<dyn ChatModel>,
        index: DocumentIndex,
        retrieval: RetrievalConfig,
    ) -> Self {
        Self {
            embedder,
            chat,
            index,
            retrieval,
        }
    }

    pub fn documents(&self) -> &[DocumentSummary] {
        &self.index.documents
    }

    pub fn chunk_count(&self) -> usize {
        self.index.store.len()
    }

    pub async fn retrieve(&self, question: &str) -> Result<Vec<ScoredChunk>> {
        let query_embedding = self.embedder.embed_query(question).await?;
        self.index
            .store
            .search(&query_embedding, self.retrieval.top_k, self.retrieval.min_score)
            .map_err(|e| match e {
                // The index was built with this embedder, so a size mismatch
                // here is a bad provider response.
                RagError::Dimension { expected, actual } => RagError::provider(
                    "Embedding",
                    None,
                    format!("Query embedding has dimension {}, index expects {}", actual, expected),
                ),
                other => other,
            })
    }

    pub async fn ask(&self, question: &str) -> Result<AskResponse> {
        let question = question.trim();
        if question.is_empty() {
            return Err(RagError::InvalidInput("question must not be empty".to_string()));
        }

        let start_time = std::time::Instant::now();

        let relevant_chunks = self.retrieve(question).await?;
        let prompt = build_prompt(question, &build_context(&relevant_chunks));
        let answer = self.chat.complete(&prompt).await?;

        log::info!(
            "Answered question with {} context chunks in {} ms",
            relevant_chunks.len(),
            start_time.elapsed().as_millis()
        );

        Ok(AskResponse {
            answer,
            context: relevant_chunks.into_iter().map(|scored| scored.chunk.content).collect(),
        })
    }
}
