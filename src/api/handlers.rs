use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;
use tokio::sync::broadcast;

use super::queries;
use super::types::*;
use super::AppState;
use crate::model::Transaction;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

fn api_error(status: StatusCode, msg: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    let msg = msg.into();
    tracing::error!(error = %msg, "Query failed");
    (status, Json(ErrorResponse { error: msg }))
}

/// GET /api/transactions — every record from both partitions, flagged first.
pub async fn list_transactions(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Transaction>> {
    queries::get_all_transactions(&state.pool)
        .await
        .map(Json)
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

/// GET /api/transactions/stats — partition-level aggregates.
pub async fn stats(State(state): State<Arc<AppState>>) -> ApiResult<StatsResponse> {
    queries::get_stats(&state.pool)
        .await
        .map(Json)
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

/// GET /ws — persistent push channel. One `newTransaction` frame per insert;
/// the relay depends on nothing the client sends except connection lifecycle.
pub async fn ws_feed(
    State(state): State<Arc<AppState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let events = state.events.subscribe();
    ws.on_upgrade(move |socket| stream_events(socket, events))
}

async fn stream_events(mut socket: WebSocket, mut events: broadcast::Receiver<Transaction>) {
    tracing::info!("Observer connected to feed channel");
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(tx) => {
                    let frame = match serde_json::to_string(&FeedEvent::new_transaction(tx)) {
                        Ok(frame) => frame,
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to encode feed frame");
                            continue;
                        }
                    };
                    if socket.send(Message::Text(frame.into())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Observer lagging behind the feed, frames dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            msg = socket.recv() => match msg {
                // Inbound traffic is lifecycle-only; payloads are ignored.
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            }
        }
    }
    tracing::info!("Observer disconnected from feed channel");
}
