use crate::error::ApiError;
use pdf_rag::QueryService;
use std::sync::Arc;
use tokio::sync::RwLock;

pub enum Readiness {
    Initializing,
    Ready(Arc<QueryService>),
    Failed(String),
}

/// Shared application state, injected into every handler.
#[derive(Clone)]
pub struct AppState {
    readiness: Arc<RwLock<Readiness>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            readiness: Arc::new(RwLock::new(Readiness::Initializing)),
        }
    }

    pub fn ready(service: QueryService) -> Self {
        Self {
            readiness: Arc::new(RwLock::new(Readiness::Ready(Arc::new(service)))),
        }
    }

    pub async fn set_ready(&self, service: QueryService) {
        *self.readiness.write().await = Readiness::Ready(Arc::new(service));
    }

    pub async fn set_failed(&self, reason: String) {
        *self.readiness.write().await = Readiness::Failed(reason);
    }

    /// The query service, or `NotReady` while indexing is running or after it failed.
    pub async fn query_service(&self) -> Result<Arc<QueryService>, ApiError> {
        match &*self.readiness.read().await {
            Readiness::Ready(service) => Ok(service.clone()),
            Readiness::Initializing => Err(ApiError::NotReady(
                "Service is still indexing documents, try again shortly".to_string(),
            )),
            Readiness::Failed(reason) => Err(ApiError::NotReady(format!(
                "Service failed to index documents: {}",
                reason
            ))),
        }
    }

    pub async fn with_readiness<T>(&self, f: impl FnOnce(&Readiness) -> T) -> T {
        f(&*self.readiness.read().await)
    }
}
