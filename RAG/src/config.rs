use crate::error::{RagError, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingProviderKind {
    OpenAi,
    Local,
}

impl FromStr for EmbeddingProviderKind {
    type Err = RagError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "local" => Ok(Self::Local),
            other => Err(RagError::Config(format!(
                "RAG_EMBEDDING_PROVIDER must be 'openai' or 'local', got '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProviderKind,
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub batch_size: usize,
}

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct IndexConfig {
    pub documents_dir: PathBuf,
    pub max_documents: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub min_score: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based): base, 2*base, 4*base, ...
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(factor)
    }
}

#[derive(Debug, Clone)]
pub struct RagConfig {
    pub embedding: EmbeddingConfig,
    pub chat: ChatConfig,
    pub index: IndexConfig,
    pub retrieval: RetrievalConfig,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
    pub bind_addr: String,
}

impl RagConfig {
    /// Reads the configuration from the process environment. Call
    /// `dotenv::dotenv()` first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup: &lookup };

        let provider: EmbeddingProviderKind = vars.parse("RAG_EMBEDDING_PROVIDER", EmbeddingProviderKind::OpenAi)?;
        let openai_key = vars.get("OPENAI_API_KEY");
        if provider == EmbeddingProviderKind::OpenAi && openai_key.is_none() {
            return Err(RagError::Config(
                "OPENAI_API_KEY environment variable not set".to_string(),
            ));
        }
        let groq_key = vars
            .get("GROQ_API_KEY")
            .ok_or_else(|| RagError::Config("GROQ_API_KEY environment variable not set".to_string()))?;

        let config = RagConfig {
            embedding: EmbeddingConfig {
                provider,
                api_key: openai_key,
                model: vars.string("RAG_EMBEDDING_MODEL", "text-embedding-ada-002"),
                base_url: trim_base(vars.string("OPENAI_BASE_URL", "https://api.openai.com/v1")),
                batch_size: vars.parse("RAG_EMBEDDING_BATCH_SIZE", 64)?,
            },
            chat: ChatConfig {
                api_key: groq_key,
                model: vars.string("RAG_CHAT_MODEL", "llama3-8b-8192"),
                base_url: trim_base(vars.string("GROQ_BASE_URL", "https://api.groq.com/openai/v1")),
                temperature: vars.parse("RAG_TEMPERATURE", 0.7)?,
                max_tokens: vars.parse("RAG_MAX_TOKENS", 1024)?,
            },
            index: IndexConfig {
                documents_dir: PathBuf::from(vars.string("RAG_DOCUMENTS_DIR", "./us_census")),
                max_documents: vars.parse("RAG_MAX_DOCUMENTS", 20)?,
                chunk_size: vars.parse("RAG_CHUNK_SIZE", 1000)?,
                chunk_overlap: vars.parse("RAG_CHUNK_OVERLAP", 200)?,
            },
            retrieval: RetrievalConfig {
                top_k: vars.parse("RAG_TOP_K", 4)?,
                min_score: vars.parse("RAG_MIN_SCORE", 0.0)?,
            },
            request_timeout: Duration::from_secs(vars.parse("RAG_REQUEST_TIMEOUT_SECS", 30)?),
            retry: RetryPolicy {
                max_retries: vars.parse("RAG_MAX_RETRIES", 2)?,
                base_delay: Duration::from_millis(vars.parse("RAG_RETRY_BASE_DELAY_MS", 500)?),
            },
            bind_addr: vars.string("RAG_BIND_ADDR", "0.0.0.0:8000"),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let index = &self.index;
        if index.chunk_size == 0 {
            return Err(RagError::Config("RAG_CHUNK_SIZE must be greater than 0".to_string()));
        }
        if index.chunk_overlap >= index.chunk_size {
            return Err(RagError::Config(format!(
                "RAG_CHUNK_OVERLAP ({}) must be smaller than RAG_CHUNK_SIZE ({})",
                index.chunk_overlap, index.chunk_size
            )));
        }
        if index.max_documents == 0 {
            return Err(RagError::Config("RAG_MAX_DOCUMENTS must be greater than 0".to_string()));
        }
        if self.embedding.batch_size == 0 {
            return Err(RagError::Config(
                "RAG_EMBEDDING_BATCH_SIZE must be greater than 0".to_string(),
            ));
        }
        if self.retrieval.top_k == 0 {
            return Err(RagError::Config("RAG_TOP_K must be greater than 0".to_string()));
        }
        if !self.retrieval.min_score.is_finite() {
            return Err(RagError::Config(format!(
                "RAG_MIN_SCORE must be a finite number, got {}",
                self.retrieval.min_score
            )));
        }
        if !self.chat.temperature.is_finite() {
            return Err(RagError::Config(format!(
                "RAG_TEMPERATURE must be a finite number, got {}",
                self.chat.temperature
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(RagError::Config(
                "RAG_REQUEST_TIMEOUT_SECS must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

struct Vars<'a, F: Fn(&str) -> Option<String>> {
    lookup: &'a F,
}

impl<F: Fn(&str) -> Option<String>> Vars<'_, F> {
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn string(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn parse<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            Some(raw) => raw
                .parse()
                .map_err(|e| RagError::Config(format!("{} has invalid value '{}': {}", key, raw, e))),
            None => Ok(default),
        }
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(pairs: &[(&str, &str)]) -> Result<RagConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RagConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_with(&[("OPENAI_API_KEY", "sk-test"), ("GROQ_API_KEY", "gsk-test")]).unwrap();

        assert_eq!(config.embedding.provider, EmbeddingProviderKind::OpenAi);
        assert_eq!(config.embedding.model, "text-embedding-ada-002");
        assert_eq!(config.chat.model, "llama3-8b-8192");
        assert_eq!(config.index.documents_dir, PathBuf::from("./us_census"));
        assert_eq!(config.index.max_documents, 20);
        assert_eq!(config.index.chunk_size, 1000);
        assert_eq!(config.index.chunk_overlap, 200);
        assert_eq!(config.retrieval.top_k, 4);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.retry.max_retries, 2);
        assert_eq!(config.bind_addr, "0.0.0.0:8000");
    }

    #[test]
    fn test_missing_keys() {
        let err = config_with(&[("GROQ_API_KEY", "gsk-test")]).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));

        let err = config_with(&[("OPENAI_API_KEY", "sk-test")]).unwrap_err();
        assert!(err.to_string().contains("GROQ_API_KEY"));

        let err = config_with(&[("OPENAI_API_KEY", "  "), ("GROQ_API_KEY", "gsk-test")]).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_local_embeddings_do_not_need_openai_key() {
        let config = config_with(&[("RAG_EMBEDDING_PROVIDER", "Local"), ("GROQ_API_KEY", "gsk-test")]).unwrap();
        assert_eq!(config.embedding.provider, EmbeddingProviderKind::Local);
        assert!(config.embedding.api_key.is_none());
    }

    #[test]
    fn test_overrides_and_trailing_slash() {
        let config = config_with(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("GROQ_API_KEY", "gsk-test"),
            ("RAG_MAX_DOCUMENTS", "5"),
            ("RAG_CHUNK_SIZE", "400"),
            ("RAG_CHUNK_OVERLAP", "40"),
            ("GROQ_BASE_URL", "http://127.0.0.1:9000/v1/"),
            ("RAG_MIN_SCORE", "0.25"),
        ])
        .unwrap();

        assert_eq!(config.index.max_documents, 5);
        assert_eq!(config.index.chunk_size, 400);
        assert_eq!(config.index.chunk_overlap, 40);
        assert_eq!(config.chat.base_url, "http://127.0.0.1:9000/v1");
        assert_eq!(config.retrieval.min_score, 0.25);
    }

    #[test]
    fn test_invalid_values() {
        let keys = [("OPENAI_API_KEY", "sk-test"), ("GROQ_API_KEY", "gsk-test")];

        let err = config_with(&[keys[0], keys[1], ("RAG_TOP_K", "many")]).unwrap_err();
        assert!(err.to_string().contains("RAG_TOP_K"));

        let err = config_with(&[keys[0], keys[1], ("RAG_CHUNK_OVERLAP", "1000")]).unwrap_err();
        assert!(err.to_string().contains("RAG_CHUNK_OVERLAP"));

        let err = config_with(&[keys[0], keys[1], ("RAG_MAX_DOCUMENTS", "0")]).unwrap_err();
        assert!(err.to_string().contains("RAG_MAX_DOCUMENTS"));

        let err = config_with(&[keys[0], keys[1], ("RAG_EMBEDDING_PROVIDER", "cohere")]).unwrap_err();
        assert!(err.to_string().contains("RAG_EMBEDDING_PROVIDER"));
    }

    #[test]
    fn test_non_finite_floats_are_rejected() {
        let keys = [("OPENAI_API_KEY", "sk-test"), ("GROQ_API_KEY", "gsk-test")];

        for value in ["NaN", "inf", "-infinity"] {
            let err = config_with(&[keys[0], keys[1], ("RAG_MIN_SCORE", value)]).unwrap_err();
            assert!(matches!(err, RagError::Config(_)));
            assert!(err.to_string().contains("RAG_MIN_SCORE"), "{}", err);

            let err = config_with(&[keys[0], keys[1], ("RAG_TEMPERATURE", value)]).unwrap_err();
            assert!(err.to_string().contains("RAG_TEMPERATURE"), "{}", err);
        }

        let config = config_with(&[keys[0], keys[1], ("RAG_MIN_SCORE", "-0.5")]).unwrap();
        assert_eq!(config.retrieval.min_score, -0.5);
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(400));
    }
}
