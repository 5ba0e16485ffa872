mod config;
mod grader;
mod handlers;
mod sandbox;
mod scanner;

use aula_common::store::RedisStore;
use config::{EngineConfig, LanguageConfigManager};
use grader::GradingHarness;
use handlers::AppState;
use sandbox::ExecutionSandbox;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Aula grading engine booting...");

    let engine_config = EngineConfig::from_env();

    // Explicit startup phase: everything the engine needs is provisioned
    // here, deterministically, before the listener binds. No lazy
    // initialization once requests are flowing.
    let languages = LanguageConfigManager::load_default().map_err(|e| {
        error!("Failed to load language configurations: {}", e);
        error!("Make sure config/languages.json exists");
        e
    })?;
    info!(
        "Loaded language configurations for: {:?}",
        languages.configured_languages()
    );

    let client = redis::Client::open(engine_config.redis_url.as_str())?;
    let redis_conn = redis::aio::ConnectionManager::new(client).await?;
    info!("Connected to Redis: {}", engine_config.redis_url);

    let sandbox = ExecutionSandbox::new(languages.clone())?;
    sandbox.provision_images().await?;
    info!("All language runtime images provisioned");

    let store = Arc::new(RedisStore::new(redis_conn));
    let harness = GradingHarness::new(sandbox, store.clone(), store.clone());

    let state = Arc::new(AppState {
        harness,
        store,
        admission: tokio::sync::Semaphore::new(engine_config.max_concurrent_submissions),
    });

    let app = handlers::routes().with_state(state);

    let listener = TcpListener::bind(&engine_config.bind_addr)
        .await
        .expect("Failed to bind to address");
    info!("HTTP server listening on {}", engine_config.bind_addr);
    info!(
        max_concurrent_submissions = engine_config.max_concurrent_submissions,
        "Ready to accept submissions"
    );

    axum::serve(listener, app).await.expect("Server error");

    Ok(())
}
