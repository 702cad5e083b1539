//! Transport half of the live feed client: one pull of the full history,
//! then a WebSocket subscription with a bounded fixed-delay reconnect policy.

use std::time::Duration;

use futures::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use super::model::LiveFeed;
use crate::api::types::{FeedEvent, NEW_TRANSACTION_EVENT};
use crate::config::FeedConfig;
use crate::model::Transaction;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Pull the full history from the relay.
pub async fn fetch_initial(
    http: &reqwest::Client,
    base_url: &str,
) -> eyre::Result<Vec<Transaction>> {
    let url = format!("{}/api/transactions", base_url.trim_end_matches('/'));
    let records = http
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .json::<Vec<Transaction>>()
        .await?;
    Ok(records)
}

/// Drive a feed model from the relay until shutdown. On disconnect,
/// reconnects with a fixed delay up to the configured attempt budget;
/// exhausting the budget leaves the session degraded (connected = false)
/// until the process is restarted, by policy.
///
/// `on_change` fires once per history change, after the aggregates have been
/// recomputed — the presentation layer's "on history changed" hook.
pub async fn run_monitor(
    cfg: &FeedConfig,
    feed: &mut LiveFeed,
    shutdown: CancellationToken,
    mut on_change: impl FnMut(&LiveFeed),
) -> eyre::Result<()> {
    let http = reqwest::Client::new();

    match fetch_initial(&http, &cfg.base_url).await {
        Ok(records) => {
            tracing::info!(count = records.len(), "Initial history loaded");
            feed.load_initial(records);
        }
        Err(e) => {
            // A failed pull is not fatal: start live with an empty history so
            // the view still reaches a default state.
            tracing::error!(error = %e, "Initial fetch failed, starting with empty history");
            feed.load_initial(Vec::new());
        }
    }
    on_change(feed);

    let mut attempts_left = cfg.reconnect_attempts;
    loop {
        if shutdown.is_cancelled() {
            break;
        }

        match connect_async(cfg.ws_url.as_str()).await {
            Ok((stream, _)) => {
                tracing::info!(url = %cfg.ws_url, "Feed channel connected");
                feed.set_connected(true);
                attempts_left = cfg.reconnect_attempts;

                pump_events(stream, feed, &shutdown, &mut on_change).await;

                feed.set_connected(false);
                if shutdown.is_cancelled() {
                    break;
                }
                tracing::warn!("Feed channel disconnected");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Feed connection attempt failed");
            }
        }

        if attempts_left == 0 {
            tracing::error!(
                attempts = cfg.reconnect_attempts,
                "Reconnect budget exhausted; staying degraded until restart"
            );
            shutdown.cancelled().await;
            break;
        }
        attempts_left -= 1;

        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(cfg.reconnect_delay_ms)) => {}
            _ = shutdown.cancelled() => break,
        }
    }

    Ok(())
}

/// Consume frames until the channel closes or shutdown is requested.
async fn pump_events(
    stream: WsStream,
    feed: &mut LiveFeed,
    shutdown: &CancellationToken,
    on_change: &mut impl FnMut(&LiveFeed),
) {
    let (_write, mut read) = stream.split();

    loop {
        tokio::select! {
            msg = read.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    apply_frame(feed, &text, on_change);
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "Feed channel error");
                    break;
                }
            },
            _ = shutdown.cancelled() => break,
        }
    }
}

fn apply_frame(feed: &mut LiveFeed, text: &str, on_change: &mut impl FnMut(&LiveFeed)) {
    match serde_json::from_str::<FeedEvent>(text) {
        Ok(ev) if ev.event == NEW_TRANSACTION_EVENT => {
            let id = ev.data.id.clone();
            if feed.apply_insert(ev.data) {
                on_change(feed);
            } else {
                tracing::debug!(%id, "Duplicate delivery ignored");
            }
        }
        Ok(ev) => tracing::debug!(event = %ev.event, "Ignoring unknown feed event"),
        Err(e) => tracing::warn!(error = %e, "Undecodable feed frame"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::model::FeedPhase;

    fn frame(id: &str, amount: f64) -> String {
        format!(
            r#"{{"event":"newTransaction","data":{{"_id":"{id}","User_ID":"U1","Date":"2026-08-29","Time":"10:00:00","Amount":{amount}}}}}"#
        )
    }

    #[test]
    fn test_apply_frame_feeds_the_model() {
        let mut feed = LiveFeed::new();
        feed.load_initial(Vec::new());

        let mut changes = 0;
        apply_frame(&mut feed, &frame("t1", 100.0), &mut |_| changes += 1);
        apply_frame(&mut feed, &frame("t1", 100.0), &mut |_| changes += 1);
        apply_frame(&mut feed, &frame("t2", 200.0), &mut |_| changes += 1);

        assert_eq!(changes, 2);
        assert_eq!(feed.history().len(), 2);
        assert_eq!(feed.phase(), FeedPhase::Live);
    }

    #[test]
    fn test_unknown_events_and_garbage_are_ignored() {
        let mut feed = LiveFeed::new();
        feed.load_initial(Vec::new());

        let mut changes = 0;
        apply_frame(
            &mut feed,
            r#"{"event":"heartbeat","data":{"_id":"x"}}"#,
            &mut |_| changes += 1,
        );
        apply_frame(&mut feed, "not json at all", &mut |_| changes += 1);

        assert_eq!(changes, 0);
        assert!(feed.history().is_empty());
    }
}
