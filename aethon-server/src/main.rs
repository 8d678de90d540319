use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use aethon_prompt::{AbTestManager, PromptStore};
use aethon_rag::{OpenAIEmbeddingProvider, RagConfig, RagEngine};
use aethon_server::{AppState, ServerConfig, run_server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let engine = RagEngine::builder()
        .config(RagConfig::from_env()?)
        .embedder(Arc::new(OpenAIEmbeddingProvider::from_env()?))
        .build()?;
    let state = AppState::new(engine, AbTestManager::from_env()?, PromptStore::new());

    run_server(ServerConfig::from_env(), state).await
}
