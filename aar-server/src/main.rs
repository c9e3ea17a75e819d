//! aar-server - AAR backend server
//!
//! REST API for registering users, connecting integrations, and generating
//! cached weekly after-action reports.

use aar_core::cache::{CacheConfig, MokaReportCache};
use aar_core::generator::OllamaGenerator;
use aar_core::integrations::default_clients;
use aar_core::report::{ReportConfig, ReportService};
use aar_core::Database;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod middleware;
mod routes;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("aar_server=info".parse()?))
        .init();

    info!("aar-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = config::Config::load()?;
    info!("Database at {:?}", config.database_path);

    let db = Arc::new(Database::open(&config.database_path)?);
    db.init_schema()?;

    // Wire the report pipeline: TTL cache in front of the generator,
    // one client per supported integration.
    let cache = Arc::new(MokaReportCache::new(CacheConfig {
        ttl: config.report_ttl,
        ..CacheConfig::default()
    }));
    let generator = Arc::new(OllamaGenerator::with_model(
        config.ollama_url.clone(),
        config.model.clone(),
    ));
    let reports = ReportService::with_config(
        Arc::clone(&db),
        cache,
        generator,
        default_clients(),
        ReportConfig {
            fetch_timeout: config.fetch_timeout,
            ..ReportConfig::default()
        },
    );

    let state = AppState::new(config, db, reports);

    // Warm the token registry so previously issued keys survive restarts
    let tokens = state.db.list_all_api_tokens()?;
    info!(count = tokens.len(), "Loaded API tokens");
    state.tokens.load_from_db(tokens).await;

    let router = routes::create_router(state.clone());

    let listener = tokio::net::TcpListener::bind(state.config.bind_addr).await?;
    info!("Listening on {}", state.config.bind_addr);
    axum::serve(listener, router).await?;

    Ok(())
}
