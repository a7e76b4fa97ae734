pub mod error;
pub mod handlers;
pub mod startup;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

pub use error::ApiError;
pub use state::{AppState, Readiness};

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/ask", post(handlers::ask))
        .route("/documents", get(handlers::documents))
        .route("/health", get(handlers::health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
