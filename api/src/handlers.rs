use crate::error::ApiError;
use crate::state::{AppState, Readiness};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use pdf_rag::{AskRequest, AskResponse, DocumentSummary};
use serde::Serialize;

pub async fn ask(
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::InvalidInput(rejection.body_text()))?;
    let service = state.query_service().await?;

    log::info!("Question received: {}", request.question);
    let response = service.ask(&request.question).await?;
    Ok(Json(response))
}

pub async fn documents(State(state): State<AppState>) -> Result<Json<Vec<DocumentSummary>>, ApiError> {
    let service = state.query_service().await?;
    Ok(Json(service.documents().to_vec()))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunks: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    state
        .with_readiness(|readiness| match readiness {
            Readiness::Ready(service) => (
                StatusCode::OK,
                Json(HealthResponse {
                    status: "ready",
                    documents: Some(service.documents().len()),
                    chunks: Some(service.chunk_count()),
                    error: None,
                }),
            ),
            Readiness::Initializing => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "initializing",
                    documents: None,
                    chunks: None,
                    error: None,
                }),
            ),
            Readiness::Failed(reason) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "failed",
                    documents: None,
                    chunks: None,
                    error: Some(reason.clone()),
                }),
            ),
        })
        .await
}
