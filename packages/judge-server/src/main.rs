use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use judge_server::config::AppConfig;
use judge_server::judge::JudgeEngine;
use judge_server::state::AppState;
use judge_server::store::{MemoryStore, SeaStore};
use worker::ProcessDispatcher;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let dispatcher = Arc::new(ProcessDispatcher::new(config.worker.clone()));
    let parallelism = config.worker.max_parallel_test_cases;

    let judge = if config.database.url.is_empty() {
        let store = Arc::new(MemoryStore::new());
        if let Some(seed) = &config.database.seed_file {
            store
                .load_seed_file(Path::new(seed))
                .context("Failed to load seed file")?;
        }
        info!("Using in-memory stores");
        JudgeEngine::new(store.clone(), store.clone(), store, dispatcher, parallelism)
    } else {
        let db = judge_server::database::init_db(&config.database.url)
            .await
            .context("Failed to connect to database")?;
        let store = Arc::new(SeaStore::new(db));
        info!("Connected to database");
        JudgeEngine::new(store.clone(), store.clone(), store, dispatcher, parallelism)
    };

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let state = AppState {
        config: Arc::new(config),
        judge,
    };
    let app = judge_server::build_router(state);

    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
