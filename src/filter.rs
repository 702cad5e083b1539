//! Ad-hoc search over the full in-memory history: a conjunction of optional
//! predicates, evaluated independently of the live recent-window view.

use serde::{Deserialize, Serialize};

use crate::model::transaction::FRAUD_SCORE_THRESHOLD;
use crate::model::Transaction;

/// Optional predicate fields; every present field must match (pure AND).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    /// Case-sensitive substring match against the user identifier.
    pub user_id: Option<String>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub merchant_category: Option<u32>,
    pub device_type: Option<u32>,
    /// Inclusive ISO date bounds; lexicographic comparison is valid because
    /// the dates are ISO-ordered strings.
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default)]
    pub fraud_only: bool,
    #[serde(default)]
    pub legit_only: bool,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        *self == FilterCriteria::default()
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        if let Some(needle) = &self.user_id {
            if !tx.user_id.contains(needle.as_str()) {
                return false;
            }
        }
        if let Some(min) = self.min_amount {
            if tx.amount < min {
                return false;
            }
        }
        if let Some(max) = self.max_amount {
            if tx.amount > max {
                return false;
            }
        }
        if let Some(code) = self.merchant_category {
            if tx.merchant_code() != Some(code) {
                return false;
            }
        }
        if let Some(code) = self.device_type {
            if tx.device_code() != Some(code) {
                return false;
            }
        }
        if let Some(start) = &self.start_date {
            if tx.date.as_str() < start.as_str() {
                return false;
            }
        }
        if let Some(end) = &self.end_date {
            if tx.date.as_str() > end.as_str() {
                return false;
            }
        }
        if self.fraud_only && tx.fraud_score.map_or(true, |s| s <= FRAUD_SCORE_THRESHOLD) {
            return false;
        }
        if self.legit_only && tx.legit_token.is_none() {
            return false;
        }
        true
    }
}

/// Evaluate the criteria over the full history, preserving its order.
pub fn apply(history: &[Transaction], criteria: &FilterCriteria) -> Vec<Transaction> {
    history
        .iter()
        .filter(|tx| criteria.matches(tx))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Categorical;

    fn tx(id: &str, user: &str, amount: f64, date: &str) -> Transaction {
        Transaction {
            id: id.to_string(),
            user_id: user.to_string(),
            amount,
            date: date.to_string(),
            ..Transaction::default()
        }
    }

    fn sample_history() -> Vec<Transaction> {
        let mut a = tx("a", "U1001", 500.0, "2026-08-20");
        a.fraud_score = Some(0.9);
        a.merchant_category = Some(Categorical::Code(2));
        a.device_type = Some(Categorical::Code(0));

        let mut b = tx("b", "U2002", 20000.0, "2026-08-25");
        b.legit_token = Some("L1".to_string());
        b.merchant_category = Some(Categorical::Name("Electronics".to_string()));
        b.device_type = Some(Categorical::Name("PC".to_string()));

        let mut c = tx("c", "U1005", 1500.0, "2026-08-28");
        c.merchant_category = Some(Categorical::Code(6));

        vec![a, b, c]
    }

    #[test]
    fn test_empty_criteria_returns_history_unchanged() {
        let history = sample_history();
        let out = apply(&history, &FilterCriteria::default());
        assert_eq!(out, history);
    }

    #[test]
    fn test_min_amount_scenario() {
        let history = sample_history();
        let criteria = FilterCriteria {
            min_amount: Some(1000.0),
            ..FilterCriteria::default()
        };
        let out = apply(&history, &criteria);
        assert_eq!(out.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(), vec!["b", "c"]);
    }

    #[test]
    fn test_amount_interval_is_closed() {
        let history = sample_history();
        let criteria = FilterCriteria {
            min_amount: Some(500.0),
            max_amount: Some(1500.0),
            ..FilterCriteria::default()
        };
        let out = apply(&history, &criteria);
        assert_eq!(out.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(), vec!["a", "c"]);
    }

    #[test]
    fn test_user_id_substring_is_case_sensitive() {
        let history = sample_history();
        let hit = FilterCriteria {
            user_id: Some("100".to_string()),
            ..FilterCriteria::default()
        };
        assert_eq!(apply(&history, &hit).len(), 2);

        let miss = FilterCriteria {
            user_id: Some("u100".to_string()),
            ..FilterCriteria::default()
        };
        assert!(apply(&history, &miss).is_empty());
    }

    #[test]
    fn test_category_matches_code_and_name_records() {
        let history = sample_history();
        let criteria = FilterCriteria {
            merchant_category: Some(2),
            ..FilterCriteria::default()
        };
        // "a" stores the code, "b" stores the name; both resolve to 2.
        let out = apply(&history, &criteria);
        assert_eq!(out.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_date_range_inclusive() {
        let history = sample_history();
        let criteria = FilterCriteria {
            start_date: Some("2026-08-25".to_string()),
            end_date: Some("2026-08-28".to_string()),
            ..FilterCriteria::default()
        };
        let out = apply(&history, &criteria);
        assert_eq!(out.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(), vec!["b", "c"]);
    }

    #[test]
    fn test_fraud_and_legit_only() {
        let history = sample_history();
        let fraud = FilterCriteria {
            fraud_only: true,
            ..FilterCriteria::default()
        };
        assert_eq!(apply(&history, &fraud)[0].id, "a");

        let legit = FilterCriteria {
            legit_only: true,
            ..FilterCriteria::default()
        };
        assert_eq!(apply(&history, &legit)[0].id, "b");
    }

    #[test]
    fn test_conjunction_subset_property() {
        let history = sample_history();
        let criteria = FilterCriteria {
            user_id: Some("U".to_string()),
            min_amount: Some(100.0),
            device_type: Some(0),
            ..FilterCriteria::default()
        };
        let out = apply(&history, &criteria);
        for tx in &out {
            assert!(criteria.matches(tx));
            assert!(history.contains(tx));
        }
        assert_eq!(out.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(), vec!["a"]);
    }
}
