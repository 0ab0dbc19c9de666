//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, MemoryStore},
    config::Config,
    error::ApiError,
    web::{build_router, AppState},
};
use mentor_core::{PortError, Store, TokenService};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded: {:?}", config);

    let tokens = TokenService::new(
        config.jwt_secret.as_bytes(),
        chrono::Duration::hours(config.token_ttl_hours),
    )
    .map_err(PortError::from)?;

    // --- 2. Pick the Backing Store ---
    if config.uses_memory_store() {
        warn!("Using the in-memory store. Data is lost on shutdown.");
        serve(&config, Arc::new(MemoryStore::new()), tokens).await
    } else {
        info!("Connecting to database...");
        let db_pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(&config.database_url)
            .await?;
        let db_adapter = Arc::new(DbAdapter::new(db_pool));
        info!("Running database migrations...");
        db_adapter.run_migrations().await?;
        info!("Database migrations complete.");
        serve(&config, db_adapter, tokens).await
    }
}

async fn serve<S>(config: &Config, store: Arc<S>, tokens: TokenService) -> Result<(), ApiError>
where
    S: Store + 'static,
{
    // --- 3. Build the Shared AppState & Router ---
    let app_state = Arc::new(AppState::new(store, tokens));
    let app = build_router(app_state, &config.cors_allowed_origins);

    // --- 4. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
