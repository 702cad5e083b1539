use sqlx::postgres::PgPoolOptions;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use fraudwatch::config::Config;
use fraudwatch::relay::watcher;

/// Capacity of the shared new-record topic. A slow observer past this many
/// undelivered events starts dropping frames (logged at the observer).
const EVENT_TOPIC_CAPACITY: usize = 1024;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    // Initialize structured logging (set RUST_LOG=info for output)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    tracing::info!("Fraudwatch relay starting");

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path)?;
    tracing::info!("Configuration loaded from {}", config_path);

    // Create database connection pool; an unreachable store is fatal here.
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .map_err(|e| eyre::eyre!("Failed to connect to database: {}", e))?;

    tracing::info!("Connected to PostgreSQL");

    // Run migrations (partition tables + insert-notification triggers)
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| eyre::eyre!("Failed to run migrations: {}", e))?;

    tracing::info!("Database migrations complete");

    // The shared new-record topic every connected observer subscribes to
    let (events, _) = broadcast::channel(EVENT_TOPIC_CAPACITY);

    // Create shutdown signal
    let shutdown = CancellationToken::new();

    // Establish the partition watches; failure to establish either is fatal
    let mut handles = watcher::spawn_watchers(&pool, events.clone(), shutdown.clone()).await?;
    tracing::info!("Partition watchers started");

    // Spawn API server (pull queries + the push channel)
    if config.api.enabled {
        let api_pool = pool.clone();
        let api_events = events.clone();
        let host = config.api.host.clone();
        let port = config.api.port;
        tokio::spawn(async move {
            if let Err(e) = fraudwatch::api::serve(api_pool, api_events, &host, port).await {
                tracing::error!(error = %e, "API server failed");
            }
        });
    }

    // Optional seed producer dripping synthetic transactions into the store
    if let Some(seed_config) = config.seed.clone() {
        let seed_pool = pool.clone();
        let seed_shutdown = shutdown.clone();
        handles.push(tokio::spawn(async move {
            if let Err(e) =
                fraudwatch::seed::producer::run_producer(seed_pool, seed_config, seed_shutdown)
                    .await
            {
                tracing::error!(error = %e, "Seed producer failed");
            }
        }));
    }

    tracing::info!("Relay running. Press Ctrl+C to stop.");

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received, stopping relay...");
    shutdown.cancel();

    // Wait for all tasks to finish
    for handle in handles {
        let _ = handle.await;
    }

    tracing::info!("Fraudwatch relay stopped gracefully");
    Ok(())
}
