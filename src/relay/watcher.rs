//! Change relay: two independent watches over the store partitions' insert
//! notifications, merged onto one broadcast topic. Within a partition,
//! insert order is preserved end to end; across the two partitions no
//! relative order is guaranteed, since the streams are independent.
//!
//! The relay buffers nothing across its own downtime: an insert that happens
//! while the relay is down is permanently missed. This is a documented
//! limitation of the monitoring pipeline, not a defect.

use std::time::Duration;

use serde::Deserialize;
use sqlx::postgres::PgListener;
use sqlx::PgPool;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::model::Transaction;

/// Notification channels raised by the partitions' insert triggers.
pub const FRAUD_CHANNEL: &str = "fraud_tx_insert";
pub const LEGIT_CHANNEL: &str = "legit_tx_insert";

/// Delay before re-establishing a watch that errored post-establishment.
const RELISTEN_DELAY: Duration = Duration::from_secs(2);

/// Payload emitted by the partition triggers.
#[derive(Debug, Deserialize)]
struct InsertNotification {
    op: String,
    doc: serde_json::Value,
}

/// Decode one notification payload into a Transaction. Non-insert change
/// types and undecodable documents are dropped (never broadcast).
fn parse_notification(payload: &str) -> Option<Transaction> {
    let note: InsertNotification = match serde_json::from_str(payload) {
        Ok(n) => n,
        Err(e) => {
            tracing::warn!(error = %e, "Undecodable change notification, ignoring");
            return None;
        }
    };

    if note.op != "insert" {
        tracing::debug!(op = %note.op, "Ignoring non-insert change type");
        return None;
    }

    match serde_json::from_value::<Transaction>(note.doc) {
        Ok(tx) => Some(tx),
        Err(e) => {
            tracing::warn!(error = %e, "Inserted document failed to decode, ignoring");
            None
        }
    }
}

/// Establish a watch on both partition channels and spawn one relay task per
/// channel. Failing to establish either watch is fatal (returned as an error
/// for the caller to propagate); stream errors after establishment are
/// logged and retried best-effort.
pub async fn spawn_watchers(
    pool: &PgPool,
    events: broadcast::Sender<Transaction>,
    shutdown: CancellationToken,
) -> eyre::Result<Vec<JoinHandle<()>>> {
    let mut handles = Vec::with_capacity(2);

    for channel in [FRAUD_CHANNEL, LEGIT_CHANNEL] {
        let mut listener = PgListener::connect_with(pool)
            .await
            .map_err(|e| eyre::eyre!("Failed to establish watch on {channel}: {e}"))?;
        listener
            .listen(channel)
            .await
            .map_err(|e| eyre::eyre!("Failed to establish watch on {channel}: {e}"))?;

        tracing::info!(channel, "Partition watch established");

        let pool = pool.clone();
        let events = events.clone();
        let shutdown = shutdown.clone();
        handles.push(tokio::spawn(async move {
            watch_channel(pool, channel, listener, events, shutdown).await;
        }));
    }

    Ok(handles)
}

/// Relay loop for one partition channel: each insert notification becomes
/// exactly one broadcast on the shared new-record topic.
async fn watch_channel(
    pool: PgPool,
    channel: &'static str,
    mut listener: PgListener,
    events: broadcast::Sender<Transaction>,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            note = listener.recv() => match note {
                Ok(note) => {
                    if let Some(tx) = parse_notification(note.payload()) {
                        tracing::info!(channel, id = %tx.id, "New transaction detected");
                        // A send error only means no observer is currently
                        // subscribed; the event is simply not retained.
                        let _ = events.send(tx);
                    }
                }
                Err(e) => {
                    tracing::warn!(channel, error = %e, "Watch stream error, attempting re-subscription");
                    match relisten(&pool, channel, &shutdown).await {
                        Some(l) => listener = l,
                        None => break,
                    }
                }
            },
            _ = shutdown.cancelled() => {
                tracing::info!(channel, "Shutdown received, stopping partition watch");
                break;
            }
        }
    }
}

/// Best-effort re-subscription after a stream error. Events raised during
/// the gap are missed; there is no recovery guarantee. Returns None only on
/// shutdown.
async fn relisten(
    pool: &PgPool,
    channel: &'static str,
    shutdown: &CancellationToken,
) -> Option<PgListener> {
    loop {
        tokio::select! {
            _ = tokio::time::sleep(RELISTEN_DELAY) => {}
            _ = shutdown.cancelled() => return None,
        }

        match PgListener::connect_with(pool).await {
            Ok(mut listener) => match listener.listen(channel).await {
                Ok(()) => {
                    tracing::info!(channel, "Partition watch re-established");
                    return Some(listener);
                }
                Err(e) => tracing::warn!(channel, error = %e, "Re-subscription failed, retrying"),
            },
            Err(e) => tracing::warn!(channel, error = %e, "Re-subscription failed, retrying"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_insert_notification() {
        let payload = r#"{"op":"insert","doc":{"_id":"t1","User_ID":"U1","Amount":250.0}}"#;
        let tx = parse_notification(payload).unwrap();
        assert_eq!(tx.id, "t1");
        assert_eq!(tx.amount, 250.0);
    }

    #[test]
    fn test_non_insert_ops_are_ignored() {
        let payload = r#"{"op":"update","doc":{"_id":"t1"}}"#;
        assert!(parse_notification(payload).is_none());
        let payload = r#"{"op":"delete","doc":{"_id":"t1"}}"#;
        assert!(parse_notification(payload).is_none());
    }

    #[test]
    fn test_garbage_payload_is_ignored() {
        assert!(parse_notification("not json").is_none());
        assert!(parse_notification(r#"{"op":"insert"}"#).is_none());
    }
}
