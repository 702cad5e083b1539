//! Stand-in for the upstream scoring producer: drips pre-scored transactions
//! from a CSV into the store partitions so the insert triggers fire live
//! events through the relay. Development tooling only; the relay itself
//! never writes to the store.

use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::config::SeedConfig;
use crate::db::repository::{self, FRAUD_TABLE, LEGIT_TABLE};
use crate::model::transaction::FRAUD_SCORE_THRESHOLD;
use crate::model::{Categorical, Transaction};

#[derive(Debug, Deserialize)]
struct SeedRow {
    #[serde(rename = "User_ID")]
    user_id: String,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Time")]
    time: String,
    #[serde(rename = "Amount")]
    amount: f64,
    #[serde(rename = "Merchant_Category")]
    merchant_category: String,
    #[serde(rename = "Device_Type")]
    device_type: String,
    #[serde(rename = "Session_Time", default)]
    session_time: Option<f64>,
    #[serde(rename = "Active_Loans", default)]
    active_loans: Option<f64>,
    #[serde(rename = "fraud_score", default)]
    fraud_score: Option<f64>,
}

fn row_to_transaction(row: SeedRow, seq: usize, run_stamp: i64) -> Transaction {
    Transaction {
        id: format!("seed-{run_stamp}-{seq}"),
        user_id: row.user_id,
        date: row.date,
        time: row.time,
        amount: row.amount,
        merchant_category: Some(Categorical::Name(row.merchant_category)),
        device_type: Some(Categorical::Name(row.device_type)),
        session_time: row.session_time,
        active_loans: row.active_loans,
        fraud_score: row.fraud_score,
        ..Transaction::default()
    }
}

/// Read the CSV and insert one row per interval until exhausted or shutdown.
/// Rows scoring above the fraud threshold go to the flagged partition with a
/// fraud token, everything else to the unflagged partition with a
/// legitimacy token.
pub async fn run_producer(
    pool: PgPool,
    config: SeedConfig,
    shutdown: CancellationToken,
) -> eyre::Result<()> {
    let mut reader = csv::Reader::from_path(&config.csv_path)
        .map_err(|e| eyre::eyre!("Failed to open seed CSV '{}': {}", config.csv_path, e))?;

    let rows: Vec<SeedRow> = reader
        .deserialize()
        .collect::<Result<_, _>>()
        .map_err(|e| eyre::eyre!("Failed to parse seed CSV '{}': {}", config.csv_path, e))?;

    tracing::info!(count = rows.len(), path = %config.csv_path, "Seed producer loaded CSV");

    let interval = Duration::from_millis(config.interval_ms);
    let run_stamp = Utc::now().timestamp_millis();

    for (seq, row) in rows.into_iter().enumerate() {
        if shutdown.is_cancelled() {
            break;
        }

        let mut tx = row_to_transaction(row, seq, run_stamp);
        let table = if tx.fraud_score.map_or(false, |s| s > FRAUD_SCORE_THRESHOLD) {
            tx.fraud_token = Some(1);
            FRAUD_TABLE
        } else {
            tx.legit_token = Some(format!("L{seq}"));
            LEGIT_TABLE
        };

        if let Err(e) = repository::insert_transaction(&pool, table, &tx).await {
            tracing::warn!(id = %tx.id, error = %e, "Seed insert failed, continuing");
        } else {
            tracing::debug!(id = %tx.id, table, "Seeded transaction");
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown.cancelled() => break,
        }
    }

    tracing::info!("Seed producer finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Classification;

    #[test]
    fn test_csv_row_to_transaction() {
        let data = "\
User_ID,Date,Time,Amount,Merchant_Category,Device_Type,Session_Time,Active_Loans,fraud_score
U1001,2026-08-29,10:15:00,2500.0,Electronics,Mobile,35.5,2,0.92
U1002,2026-08-29,10:16:00,120.0,Groceries,PC,12.0,0,
";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let mut rows: Vec<SeedRow> = reader.deserialize().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows.len(), 2);

        let fraud = row_to_transaction(rows.remove(0), 0, 42);
        assert_eq!(fraud.id, "seed-42-0");
        assert_eq!(fraud.merchant_name(), "Electronics");
        assert_eq!(fraud.device_code(), Some(0));
        assert_eq!(fraud.fraud_score, Some(0.92));

        let legit = row_to_transaction(rows.remove(0), 1, 42);
        assert_eq!(legit.fraud_score, None);
        assert_eq!(legit.classification(), Classification::Suspicious);
    }
}
