use chrono::Utc;
use sqlx::PgPool;

use super::types::StatsResponse;
use crate::aggregate::stats::round2;
use crate::db::repository::{self, FRAUD_TABLE, LEGIT_TABLE};
use crate::model::Transaction;

/// Both partitions concatenated, flagged first.
pub async fn get_all_transactions(pool: &PgPool) -> eyre::Result<Vec<Transaction>> {
    repository::fetch_all_transactions(pool).await
}

/// Point-in-time stats computed inside the store from partition counts and
/// amount sums, for clients that prefer not to download full history. Fraud
/// is counted by partition membership here, not by the score rule.
pub async fn get_stats(pool: &PgPool) -> eyre::Result<StatsResponse> {
    let fraud = repository::partition_totals(pool, FRAUD_TABLE).await?;
    let legit = repository::partition_totals(pool, LEGIT_TABLE).await?;

    let total = fraud.count + legit.count;
    let amount_sum = fraud.amount_sum + legit.amount_sum;
    let (fraud_percentage, avg_amount) = if total > 0 {
        (
            round2(fraud.count as f64 / total as f64 * 100.0),
            round2(amount_sum / total as f64),
        )
    } else {
        (0.0, 0.0)
    };

    Ok(StatsResponse {
        total_transactions: total,
        fraud_transactions: fraud.count,
        legit_transactions: legit.count,
        fraud_percentage,
        avg_amount,
        last_updated: Utc::now(),
    })
}
