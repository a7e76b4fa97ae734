use anyhow::{Context, Result};
use pdf_rag::{build_embedder, ChatModel, GroqService, RagConfig};
use pdf_rag_api::{app, startup, AppState};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment variables and logging
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = RagConfig::from_env().context("Invalid configuration")?;

    let embedder = build_embedder(&config.embedding, config.request_timeout, config.retry)?;
    let chat: Arc<dyn ChatModel> = Arc::new(GroqService::new(&config.chat, config.request_timeout, config.retry)?);

    // Serve right away; /ask answers 503 until the index is built.
    let state = AppState::new();
    startup::spawn_initialize(state.clone(), config.clone(), embedder, chat);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    log::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
