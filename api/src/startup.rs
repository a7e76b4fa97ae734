use crate::state::AppState;
use pdf_rag::{build_index, ChatModel, Embedder, QueryService, RagConfig};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;

/// Runs [`initialize`] in the background. The returned handle finishes once
/// readiness has left `Initializing`, including when indexing panics.
pub fn spawn_initialize(
    state: AppState,
    config: RagConfig,
    embedder: Arc<dyn Embedder>,
    chat: Arc<dyn ChatModel>,
) -> JoinHandle<()> {
    let indexing = tokio::spawn(initialize(state.clone(), config, embedder, chat));
    tokio::spawn(supervise(state, indexing))
}

/// Waits for the indexing task and marks the service failed if it died
/// without reporting.
pub async fn supervise(state: AppState, indexing: JoinHandle<()>) {
    if let Err(e) = indexing.await {
        log::error!("Indexing task aborted: {}", e);
        state.set_failed(format!("indexing task aborted: {}", e)).await;
    }
}

/// Builds the index and flips the service to ready, or to failed.
pub async fn initialize(
    state: AppState,
    config: RagConfig,
    embedder: Arc<dyn Embedder>,
    chat: Arc<dyn ChatModel>,
) {
    let start_time = Instant::now();

    match build_index(&config.index, config.embedding.batch_size, embedder.as_ref()).await {
        Ok(index) => {
            log::info!(
                "RAG system initialized successfully: {} documents, {} chunks in {:.1?}",
                index.documents.len(),
                index.store.len(),
                start_time.elapsed()
            );
            state
                .set_ready(QueryService::new(embedder, chat, index, config.retrieval))
                .await;
        }
        Err(e) => {
            log::error!("Failed to initialize RAG system: {}", e);
            state.set_failed(e.to_string()).await;
        }
    }
}
