use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use pawpals::auth::tokens::{generate_secret, AccessTokenService};
use pawpals::config::{Cli, Config};
use pawpals::state::AppState;
use pawpals::upstream::{HttpImageStore, HttpPaymentProcessor};
use pawpals::{db, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse CLI args and load config
    let cli = Cli::parse();
    let data_dir = Config::data_dir(&cli)?;
    std::fs::create_dir_all(&data_dir)?;
    tracing::info!("Data directory: {}", data_dir.display());

    let config = Config::load(&cli)?;

    // Initialize database
    let pool = db::create_pool(&config.db_path())?;
    db::run_migrations(&pool)?;

    let secret = if config.auth.token_secret.is_empty() {
        tracing::warn!(
            "No token secret configured; generated an ephemeral one. Tokens will not survive a restart."
        );
        generate_secret()
    } else {
        config.auth.token_secret.clone()
    };
    let tokens = AccessTokenService::new(&secret, config.auth.token_hours);

    if config.images.api_key.is_empty() {
        tracing::warn!("No image store API key configured; uploads will fail");
    }
    if config.payments.secret_key.is_empty() {
        tracing::warn!("No payment secret configured; payment intents will fail");
    }
    let images = HttpImageStore::new(&config.images)?;
    let payments = HttpPaymentProcessor::new(&config.payments)?;

    // Build app state
    let state = AppState {
        db: pool,
        config: config.clone(),
        tokens: Arc::new(tokens),
        images: Arc::new(images),
        payments: Arc::new(payments),
    };

    let app = routes::router(&config)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
