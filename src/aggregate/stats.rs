use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::Transaction;

/// Summary statistics derived from a history. Fraud is counted by the score
/// rule and legit by the token, so suspicious records contribute to the total
/// only; `fraud + legit <= total` always holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedStats {
    pub total_transactions: u64,
    pub fraud_transactions: u64,
    pub legit_transactions: u64,
    pub fraud_percentage: f64,
    pub avg_amount: f64,
    pub last_updated: DateTime<Utc>,
}

impl DerivedStats {
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            total_transactions: 0,
            fraud_transactions: 0,
            legit_transactions: 0,
            fraud_percentage: 0.0,
            avg_amount: 0.0,
            last_updated: now,
        }
    }
}

/// Round to 2 decimal places for display.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Derive summary statistics from the full history. Pure in everything but
/// the `last_updated` stamp, which is pinned by the caller-supplied `now`.
pub fn derive_stats_at(history: &[Transaction], now: DateTime<Utc>) -> DerivedStats {
    let total = history.len() as u64;
    if total == 0 {
        return DerivedStats::empty(now);
    }

    let fraud = history.iter().filter(|tx| tx.is_fraud()).count() as u64;
    let legit = history.iter().filter(|tx| tx.is_legit()).count() as u64;
    let amount_sum: f64 = history.iter().map(|tx| tx.amount).sum();

    DerivedStats {
        total_transactions: total,
        fraud_transactions: fraud,
        legit_transactions: legit,
        fraud_percentage: round2(fraud as f64 / total as f64 * 100.0),
        avg_amount: round2(amount_sum / total as f64),
        last_updated: now,
    }
}

pub fn derive_stats(history: &[Transaction]) -> DerivedStats {
    derive_stats_at(history, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fraud_tx(id: &str, amount: f64, score: f64) -> Transaction {
        Transaction {
            id: id.to_string(),
            amount,
            fraud_score: Some(score),
            ..Transaction::default()
        }
    }

    fn legit_tx(id: &str, amount: f64) -> Transaction {
        Transaction {
            id: id.to_string(),
            amount,
            legit_token: Some(format!("L-{id}")),
            ..Transaction::default()
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 30, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_history_yields_zeroes() {
        let stats = derive_stats_at(&[], now());
        assert_eq!(stats.total_transactions, 0);
        assert_eq!(stats.fraud_percentage, 0.0);
        assert_eq!(stats.avg_amount, 0.0);
    }

    #[test]
    fn test_mixed_history_scenario() {
        let history = vec![fraud_tx("a", 500.0, 0.9), legit_tx("b", 20000.0)];
        let stats = derive_stats_at(&history, now());
        assert_eq!(stats.total_transactions, 2);
        assert_eq!(stats.fraud_transactions, 1);
        assert_eq!(stats.legit_transactions, 1);
        assert_eq!(stats.fraud_percentage, 50.0);
        assert_eq!(stats.avg_amount, 10250.0);
    }

    #[test]
    fn test_suspicious_record_counts_toward_total_only() {
        let mut history = vec![fraud_tx("a", 500.0, 0.9), legit_tx("b", 20000.0)];
        history.push(Transaction {
            id: "c".to_string(),
            amount: 1_000_000.0,
            ..Transaction::default()
        });
        let stats = derive_stats_at(&history, now());
        assert_eq!(stats.total_transactions, 3);
        assert_eq!(stats.fraud_transactions, 1);
        assert_eq!(stats.legit_transactions, 1);
        assert_eq!(stats.fraud_percentage, 33.33);
        assert!(stats.fraud_transactions + stats.legit_transactions < stats.total_transactions);
    }

    #[test]
    fn test_purity() {
        let history = vec![
            fraud_tx("a", 123.45, 0.8),
            legit_tx("b", 678.9),
            fraud_tx("c", 42.0, 0.71),
        ];
        let at = now();
        assert_eq!(derive_stats_at(&history, at), derive_stats_at(&history, at));
    }

    #[test]
    fn test_rounding_to_two_places() {
        let history = vec![
            fraud_tx("a", 10.0, 0.9),
            legit_tx("b", 10.0),
            legit_tx("c", 10.01),
        ];
        let stats = derive_stats_at(&history, now());
        assert_eq!(stats.fraud_percentage, 33.33);
        assert_eq!(stats.avg_amount, 10.0);
    }
}
