use crate::config::IndexConfig;
use crate::document_processor::DocumentProcessor;
use crate::embedding_service::Embedder;
use crate::error::{RagError, Result};
use crate::models::*;
use crate::text_splitter::TextSplitter;
use crate::vector_store::VectorStore;
use rayon::prelude::*;

pub struct DocumentIndex {
    pub store: VectorStore,
    pub documents: Vec<DocumentSummary>,
}

/// Loads, splits and embeds the configured documents directory.
pub async fn build_index(config: &IndexConfig, batch_size: usize, embedder: &dyn Embedder) -> Result<DocumentIndex> {
    log::info!("Indexing documents in {}", config.documents_dir.display());

    let documents = DocumentProcessor::new(config.max_documents)
        .process_documents(&config.documents_dir)
        .await?;

    index_documents(documents, config, batch_size, embedder).await
}

/// Splits and embeds already-loaded documents; empty documents are skipped.
pub async fn index_documents(
    documents: Vec<Document>,
    config: &IndexConfig,
    batch_size: usize,
    embedder: &dyn Embedder,
) -> Result<DocumentIndex> {
    let document_count = documents.len();

    let splitter = TextSplitter::new(config.chunk_size, config.chunk_overlap);
    let split: Vec<(DocumentSummary, Vec<DocumentChunk>)> = documents
        .par_iter()
        .map(|document| {
            let chunks = splitter.split_document(document);
            let summary = DocumentSummary {
                filename: document.filename.clone(),
                characters: document.content.chars().count(),
                chunks: chunks.len(),
            };
            (summary, chunks)
        })
        .collect();

    let mut summaries = Vec::new();
    let mut chunks = Vec::new();
    for (summary, document_chunks) in split {
        if document_chunks.is_empty() {
            log::warn!("Skipping {}: no text to index", summary.filename);
            continue;
        }
        summaries.push(summary);
        chunks.extend(document_chunks);
    }

    if chunks.is_empty() {
        return Err(RagError::EmptyIndex(document_count));
    }
    log::info!("Created {} chunks from {} documents", chunks.len(), summaries.len());

    let texts: Vec<String> = chunks.iter().map(|chunk| chunk.content.clone()).collect();
    let mut embeddings = Vec::with_capacity(texts.len());
    for batch in texts.chunks(batch_size.max(1)) {
        let batch_embeddings = embedder.embed_documents(batch).await?;
        if batch_embeddings.len() != batch.len() {
            return Err(RagError::provider(
                "Embedding",
                None,
                format!("Expected {} embeddings, got {}", batch.len(), batch_embeddings.len()),
            ));
        }
        embeddings.extend(batch_embeddings);
        log::debug!("Embedded {}/{} chunks", embeddings.len(), texts.len());
    }

    let store = VectorStore::from_embeddings(chunks, embeddings)?;
    log::info!(
        "Vector store ready: {} chunks, dimension {}",
        store.len(),
        store.dimension()
    );

    Ok(DocumentIndex {
        store,
        documents: summaries,
    })
}
