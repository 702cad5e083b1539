//! Terminal live-feed client: pulls the full history, subscribes to the
//! relay's push channel, and logs the derived statistics after every change.

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use fraudwatch::config::Config;
use fraudwatch::feed::{client, LiveFeed};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());
    let config = Config::load(&config_path)?;

    tracing::info!(relay = %config.feed.base_url, "Fraudwatch monitor starting");

    let shutdown = CancellationToken::new();
    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            ctrl_c.cancel();
        }
    });

    let mut feed = LiveFeed::new();
    client::run_monitor(&config.feed, &mut feed, shutdown, |feed| {
        let stats = feed.stats();
        tracing::info!(
            total = stats.total_transactions,
            fraud = stats.fraud_transactions,
            legit = stats.legit_transactions,
            fraud_pct = stats.fraud_percentage,
            avg_amount = stats.avg_amount,
            window = feed.recent_window().len(),
            connected = feed.is_connected(),
            "Dashboard updated"
        );
    })
    .await?;

    tracing::info!("Fraudwatch monitor stopped");
    Ok(())
}
