//! Tasklist HTTP server.
//!
//! Users and tasks in `PostgreSQL`, sessions and OAuth state in Redis,
//! Prometheus metrics on a separate port.

use anyhow::Context;
use metrics_exporter_prometheus::PrometheusBuilder;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tasklist_auth::providers::LocalIdentityProvider;
use tasklist_auth::stores::{PostgresUserRepository, RedisSessionRepository};
use tasklist_server::{Config, init_tracing, shutdown_signal};
use tasklist_tasks::PostgresTaskStore;
use tasklist_web::{AppState, router};
use tokio::sync::watch;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();
    init_tracing();

    info!("Starting Tasklist HTTP Server");

    let config = Config::from_env();
    info!(
        address = %config.server.address(),
        base_url = %config.auth.base_url,
        google = config.auth.google.is_some(),
        github = config.auth.github.is_some(),
        "Configuration loaded"
    );

    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], config.server.metrics_port))
        .install()
        .context("Failed to install Prometheus exporter")?;
    info!(port = config.server.metrics_port, "Prometheus metrics exporter started");

    info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.postgres.max_connections)
        .acquire_timeout(Duration::from_secs(config.postgres.connect_timeout))
        .connect(&config.postgres.url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    info!("Database ready");

    info!("Connecting to Redis...");
    let sessions = RedisSessionRepository::new(&config.redis.url)
        .await
        .context("Failed to connect to Redis")?;

    let provider = LocalIdentityProvider::new(
        PostgresUserRepository::new(pool.clone()),
        sessions,
        config.auth.oauth_clients(),
    )
    .with_session_config(config.auth.session_config())
    .with_oauth_config(config.auth.oauth_config());

    let state = AppState::new(Arc::new(provider), Arc::new(PostgresTaskStore::new(pool)))
        .with_cookie_max_age(config.auth.cookie_max_age())
        .with_secure_cookies(config.auth.secure_cookies);
    let app = router(state);

    let address = config.server.address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!(address = %address, "Server listening");

    let (stop_tx, mut stop_rx) = watch::channel(());
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.changed().await;
            })
            .await
    });

    tokio::select! {
        joined = &mut server => {
            joined
                .context("HTTP server task failed")?
                .context("HTTP server error")?;
            warn!("Server exited before a shutdown signal");
            return Ok(());
        },
        () = shutdown_signal() => {},
    }
    let _ = stop_tx.send(());

    match tokio::time::timeout(config.server.shutdown_timeout(), server).await {
        Ok(joined) => joined
            .context("HTTP server task failed")?
            .context("HTTP server error")?,
        Err(_) => warn!(
            timeout_secs = config.server.shutdown_timeout,
            "Shutdown timed out with requests still in flight"
        ),
    }

    info!("Server stopped");
    Ok(())
}
