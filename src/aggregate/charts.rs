use chrono::{Days, NaiveDate, Utc};
use serde::Serialize;

use crate::model::Transaction;

/// One named numeric series aligned to a chart's label sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<u64>,
}

/// An ordered label sequence plus one or more aligned data series.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

/// The four chart series the dashboard renders, all derived from the same
/// history in one pass each.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardCharts {
    pub merchant: ChartSeries,
    pub device: ChartSeries,
    pub daily: ChartSeries,
    pub amount: ChartSeries,
}

impl DashboardCharts {
    pub fn build(history: &[Transaction]) -> Self {
        Self::build_at(history, Utc::now().date_naive())
    }

    /// Build all four series with the daily window pinned to `today`.
    pub fn build_at(history: &[Transaction], today: NaiveDate) -> Self {
        Self {
            merchant: merchant_chart(history),
            device: device_chart(history),
            daily: daily_chart_at(history, today),
            amount: amount_chart(history),
        }
    }
}

/// Histogram over a resolved categorical, label order = first-seen order.
fn categorical_chart<F>(history: &[Transaction], series_label: &str, resolve: F) -> ChartSeries
where
    F: Fn(&Transaction) -> String,
{
    let mut labels: Vec<String> = Vec::new();
    let mut counts: Vec<u64> = Vec::new();

    for tx in history {
        let name = resolve(tx);
        match labels.iter().position(|l| *l == name) {
            Some(i) => counts[i] += 1,
            None => {
                labels.push(name);
                counts.push(1);
            }
        }
    }

    ChartSeries {
        labels,
        datasets: vec![Dataset {
            label: series_label.to_string(),
            data: counts,
        }],
    }
}

pub fn merchant_chart(history: &[Transaction]) -> ChartSeries {
    categorical_chart(history, "Transactions by Merchant Category", |tx| {
        tx.merchant_name().to_string()
    })
}

pub fn device_chart(history: &[Transaction]) -> ChartSeries {
    categorical_chart(history, "Transactions by Device Type", |tx| {
        tx.device_name().to_string()
    })
}

/// Fraud-vs-legit counts per calendar day. The 7 days ending `today` are
/// always present (oldest first, zero-filled); dates outside that window are
/// appended in first-seen order. Suspicious records are not counted in
/// either series.
pub fn daily_chart_at(history: &[Transaction], today: NaiveDate) -> ChartSeries {
    let mut labels: Vec<String> = Vec::new();
    let mut fraud: Vec<u64> = Vec::new();
    let mut legit: Vec<u64> = Vec::new();

    for back in (0u64..7).rev() {
        let day = today - Days::new(back);
        labels.push(day.format("%Y-%m-%d").to_string());
        fraud.push(0);
        legit.push(0);
    }

    for tx in history {
        if tx.date.is_empty() {
            continue;
        }
        let i = match labels.iter().position(|l| *l == tx.date) {
            Some(i) => i,
            None => {
                labels.push(tx.date.clone());
                fraud.push(0);
                legit.push(0);
                labels.len() - 1
            }
        };
        if tx.is_fraud() {
            fraud[i] += 1;
        } else if tx.is_legit() {
            legit[i] += 1;
        }
    }

    ChartSeries {
        labels,
        datasets: vec![
            Dataset {
                label: "Fraud Transactions".to_string(),
                data: fraud,
            },
            Dataset {
                label: "Legitimate Transactions".to_string(),
                data: legit,
            },
        ],
    }
}

pub fn daily_chart(history: &[Transaction]) -> ChartSeries {
    daily_chart_at(history, Utc::now().date_naive())
}

/// Fixed amount buckets, left-inclusive / right-exclusive.
const AMOUNT_BUCKETS: [(&str, f64, f64); 5] = [
    ("₹0-1K", 0.0, 1_000.0),
    ("₹1K-5K", 1_000.0, 5_000.0),
    ("₹5K-10K", 5_000.0, 10_000.0),
    ("₹10K-50K", 10_000.0, 50_000.0),
    ("₹50K+", 50_000.0, f64::INFINITY),
];

pub fn amount_chart(history: &[Transaction]) -> ChartSeries {
    let mut counts = [0u64; AMOUNT_BUCKETS.len()];

    for tx in history {
        // Negative or non-finite amounts fall outside every bucket.
        for (i, (_, min, max)) in AMOUNT_BUCKETS.iter().enumerate() {
            if tx.amount >= *min && tx.amount < *max {
                counts[i] += 1;
                break;
            }
        }
    }

    ChartSeries {
        labels: AMOUNT_BUCKETS.iter().map(|(l, _, _)| l.to_string()).collect(),
        datasets: vec![Dataset {
            label: "Transaction Amount Distribution".to_string(),
            data: counts.to_vec(),
        }],
    }
}
