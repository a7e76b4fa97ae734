use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pdf_rag::RagError;
use serde::Serialize;
use thiserror::Error;

/// Every non-200 API response carries one of these kinds.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    NotReady(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::NotReady(_) => "not_ready",
            ApiError::InvalidInput(_) => "invalid_input",
            ApiError::Upstream(_) => "upstream_provider_error",
            ApiError::Internal(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotReady(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RagError> for ApiError {
    fn from(err: RagError) -> Self {
        match err {
            RagError::Provider { .. } => ApiError::Upstream(err.to_string()),
            RagError::InvalidInput(message) => ApiError::InvalidInput(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Upstream(_) | ApiError::Internal(_) => log::error!("Request failed: {}", self),
            ApiError::NotReady(_) | ApiError::InvalidInput(_) => log::warn!("Request rejected: {}", self),
        }

        let body = ErrorBody {
            kind: self.kind(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
