//! Pure, deterministic derivations over a transaction history: summary
//! statistics and the four chart series. No I/O; recomputed in full on every
//! history change (histories are bounded by a monitoring session, so the
//! O(n) recompute is cheaper than carrying incremental state).

pub mod charts;
pub mod stats;

pub use charts::{amount_chart, daily_chart, device_chart, merchant_chart, ChartSeries, DashboardCharts, Dataset};
pub use stats::{derive_stats, DerivedStats};
