use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RagError>;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read documents directory {}: {source}", .path.display())]
    DocumentsDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No PDF documents found in {}", .0.display())]
    NoDocuments(PathBuf),

    #[error("Failed to extract text from {file}: {message}")]
    Pdf { file: String, message: String },

    #[error("No text could be extracted from any of the {0} documents")]
    EmptyIndex(usize),

    #[error("{provider} request failed{}: {message}", .status.map(|s| format!(" ({})", s)).unwrap_or_default())]
    Provider {
        provider: &'static str,
        status: Option<u16>,
        message: String,
    },

    #[error("Invalid embedding dimension: expected {expected}, got {actual}")]
    Dimension { expected: usize, actual: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl RagError {
    pub fn provider(provider: &'static str, status: Option<u16>, message: impl Into<String>) -> Self {
        RagError::Provider {
            provider,
            status,
            message: message.into(),
        }
    }

    /// Transport failures, timeouts, rate limiting and server errors are worth
    /// another attempt. Everything else is final.
    pub fn is_retryable(&self) -> bool {
        match self {
            RagError::Provider { status: None, .. } => true,
            RagError::Provider { status: Some(status), .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
