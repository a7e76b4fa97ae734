pub mod config;
pub mod document_processor;
pub mod embedding_service;
pub mod error;
pub mod groq_service;
pub mod indexer;
pub mod models;
pub mod provider_client;
pub mod query_service;
pub mod text_splitter;
pub mod vector_store;

pub use config::RagConfig;
pub use document_processor::DocumentProcessor;
pub use embedding_service::{build_embedder, Embedder, LocalEmbedder, OpenAiEmbedder};
pub use error::{RagError, Result};
pub use groq_service::{ChatModel, GroqService};
pub use indexer::{build_index, DocumentIndex};
pub use models::*;
pub use query_service::QueryService;
pub use text_splitter::TextSplitter;
pub use vector_store::VectorStore;
