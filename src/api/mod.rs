pub mod handlers;
pub mod queries;
pub mod types;

use axum::{routing::get, Router};
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::model::Transaction;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    /// The shared new-record topic fed by the partition watchers.
    pub events: broadcast::Sender<Transaction>,
}

pub fn router(pool: PgPool, events: broadcast::Sender<Transaction>) -> Router {
    let state = Arc::new(AppState { pool, events });

    Router::new()
        .route("/api/transactions", get(handlers::list_transactions))
        .route("/api/transactions/stats", get(handlers::stats))
        .route("/ws", get(handlers::ws_feed))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn serve(
    pool: PgPool,
    events: broadcast::Sender<Transaction>,
    host: &str,
    port: u16,
) -> eyre::Result<()> {
    let app = router(pool, events);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
