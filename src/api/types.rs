use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::Transaction;

/// Name of the push-channel event carrying one new transaction.
pub const NEW_TRANSACTION_EVENT: &str = "newTransaction";

/// Envelope for one frame on the persistent push channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedEvent {
    pub event: String,
    pub data: Transaction,
}

impl FeedEvent {
    pub fn new_transaction(data: Transaction) -> Self {
        Self {
            event: NEW_TRANSACTION_EVENT.to_string(),
            data,
        }
    }
}

/// Server-side aggregate over the two partitions. `fraud_transactions` here
/// counts rows physically stored in the flagged partition, which is a
/// different (and deliberately unreconciled) statistic from the client's
/// score-rule fraud count.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_transactions: i64,
    pub fraud_transactions: i64,
    pub legit_transactions: i64,
    pub fraud_percentage: f64,
    pub avg_amount: f64,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
