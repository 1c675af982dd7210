//! NeuralTwin Assistant HTTP server
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/neuraltwin \
//! SUPABASE_URL=https://project.supabase.co \
//! SUPABASE_SERVICE_ROLE_KEY=... \
//! cargo run -p assistant-server
//!
//! curl -X POST http://localhost:3000/functions/v1/neuraltwin-assistant \
//!   -H "Authorization: Bearer $JWT" \
//!   -H "Content-Type: application/json" \
//!   -d '{"message": "오늘 매출 알려줘", "context": {"page": {"current": "/insights"}}}'
//!
//! curl http://localhost:3000/health
//! ```

use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

use neuraltwin_assistant::{create_assistant_router, AssistantConfig, AssistantOrchestrator};

const DEFAULT_LOG_FILTER: &str = "assistant_server=info,neuraltwin_assistant=info,tower_http=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = AssistantConfig::from_env().context("loading configuration")?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("connecting to database")?;
    info!("Database connection established");

    let orchestrator = Arc::new(AssistantOrchestrator::from_config(&config, pool));
    let app = create_assistant_router(orchestrator);

    let addr = format!("0.0.0.0:{}", config.port);
    info!(
        llm = config.llm.as_ref().map(|l| l.model.as_str()).unwrap_or("disabled"),
        rate_limit = config.rate_limit.max_requests,
        "Starting server on {}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
