//! In-memory dashboard model for one observing session. Owned by a single
//! task; every mutation happens on that task, so no locking is needed.

use std::collections::HashSet;

use crate::aggregate::{derive_stats, DashboardCharts, DerivedStats};
use crate::filter::{self, FilterCriteria};
use crate::model::Transaction;

/// Size of the live "latest N" view.
pub const RECENT_WINDOW: usize = 20;

/// Session lifecycle: Loading until the initial pull lands, Live thereafter.
/// Connectivity loss is a degraded sub-state of Live, tracked separately via
/// the `connected` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPhase {
    Loading,
    Live,
}

/// The full history observed this session plus every view derived from it.
#[derive(Debug)]
pub struct LiveFeed {
    phase: FeedPhase,
    connected: bool,
    history: Vec<Transaction>,
    seen: HashSet<String>,
    active_filter: Option<FilterCriteria>,
    recent: Vec<Transaction>,
    view: Vec<Transaction>,
    stats: DerivedStats,
    charts: DashboardCharts,
}

impl LiveFeed {
    pub fn new() -> Self {
        Self {
            phase: FeedPhase::Loading,
            connected: false,
            history: Vec::new(),
            seen: HashSet::new(),
            active_filter: None,
            recent: Vec::new(),
            view: Vec::new(),
            stats: derive_stats(&[]),
            charts: DashboardCharts::default(),
        }
    }

    pub fn phase(&self) -> FeedPhase {
        self.phase
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    pub fn history(&self) -> &[Transaction] {
        &self.history
    }

    /// The latest RECENT_WINDOW records by (date, time) descending.
    pub fn recent_window(&self) -> &[Transaction] {
        &self.recent
    }

    /// What the presentation layer renders: the recent window, or the
    /// filtered result while a filter is active.
    pub fn view(&self) -> &[Transaction] {
        &self.view
    }

    pub fn stats(&self) -> &DerivedStats {
        &self.stats
    }

    pub fn charts(&self) -> &DashboardCharts {
        &self.charts
    }

    pub fn active_filter(&self) -> Option<&FilterCriteria> {
        self.active_filter.as_ref()
    }

    /// Populate from the initial fetch-all result and go Live. A pull failure
    /// is handled by calling this with an empty vec so the view still reaches
    /// a usable default state.
    pub fn load_initial(&mut self, records: Vec<Transaction>) {
        for tx in records {
            if self.seen.insert(tx.id.clone()) {
                self.history.push(tx);
            }
        }
        self.phase = FeedPhase::Live;
        self.recompute();
    }

    /// Apply one broadcast record. Returns false (and changes nothing) when
    /// the identifier was already observed, so transport redelivery can never
    /// aggregate a record twice.
    pub fn apply_insert(&mut self, tx: Transaction) -> bool {
        if !self.seen.insert(tx.id.clone()) {
            return false;
        }
        self.history.insert(0, tx);
        self.recompute();
        true
    }

    /// Evaluate a filter over the complete history and switch the view to it.
    pub fn search(&mut self, criteria: FilterCriteria) {
        self.view = filter::apply(&self.history, &criteria);
        self.active_filter = Some(criteria);
    }

    /// Drop any active filter; the view returns to the recent window.
    pub fn clear_filters(&mut self) {
        self.active_filter = None;
        self.view = self.recent.clone();
    }

    fn recompute(&mut self) {
        self.recent = recent_window(&self.history);
        self.stats = derive_stats(&self.history);
        self.charts = DashboardCharts::build(&self.history);
        self.view = match &self.active_filter {
            Some(criteria) => filter::apply(&self.history, criteria),
            None => self.recent.clone(),
        };
    }
}

impl Default for LiveFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// The latest RECENT_WINDOW records by (date, time) descending. Stable sort,
/// so records with identical timestamps keep their history order.
fn recent_window(history: &[Transaction]) -> Vec<Transaction> {
    let mut sorted = history.to_vec();
    sorted.sort_by(|a, b| {
        (b.date.as_str(), b.time.as_str()).cmp(&(a.date.as_str(), a.time.as_str()))
    });
    sorted.truncate(RECENT_WINDOW);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(id: &str, date: &str, time: &str, amount: f64) -> Transaction {
        Transaction {
            id: id.to_string(),
            user_id: format!("U-{id}"),
            date: date.to_string(),
            time: time.to_string(),
            amount,
            ..Transaction::default()
        }
    }

    #[test]
    fn test_loading_to_live_transition() {
        let mut feed = LiveFeed::new();
        assert_eq!(feed.phase(), FeedPhase::Loading);
        feed.load_initial(vec![tx("a", "2026-08-29", "10:00:00", 100.0)]);
        assert_eq!(feed.phase(), FeedPhase::Live);
        assert_eq!(feed.history().len(), 1);
        assert_eq!(feed.stats().total_transactions, 1);
    }

    #[test]
    fn test_failed_pull_still_reaches_live_default_state() {
        let mut feed = LiveFeed::new();
        feed.load_initial(Vec::new());
        assert_eq!(feed.phase(), FeedPhase::Live);
        assert!(feed.view().is_empty());
        assert_eq!(feed.stats().total_transactions, 0);
    }

    #[test]
    fn test_dedup_by_identifier() {
        let mut feed = LiveFeed::new();
        feed.load_initial(vec![tx("a", "2026-08-29", "10:00:00", 100.0)]);
        assert!(feed.apply_insert(tx("b", "2026-08-29", "11:00:00", 200.0)));
        // Redelivery of the same identifier changes nothing.
        assert!(!feed.apply_insert(tx("b", "2026-08-29", "11:00:00", 200.0)));
        assert!(!feed.apply_insert(tx("a", "2026-08-29", "10:00:00", 100.0)));
        assert_eq!(feed.history().len(), 2);
        assert_eq!(feed.stats().total_transactions, 2);
    }

    #[test]
    fn test_window_bound_over_25_broadcasts() {
        let mut feed = LiveFeed::new();
        feed.load_initial(Vec::new());
        for i in 0..25 {
            let t = tx(
                &format!("t{i:02}"),
                "2026-08-29",
                &format!("{:02}:{:02}:00", i / 60, i % 60),
                10.0,
            );
            assert!(feed.apply_insert(t));
            assert!(feed.recent_window().len() <= RECENT_WINDOW);
        }
        assert_eq!(feed.history().len(), 25);
        assert_eq!(feed.recent_window().len(), RECENT_WINDOW);

        // Newest first: t24 leads, t05 is the oldest still inside the window.
        assert_eq!(feed.recent_window()[0].id, "t24");
        assert_eq!(feed.recent_window()[RECENT_WINDOW - 1].id, "t05");

        // The 6th-oldest record (t04 and older) is excluded from the window
        // but still present in history and in unrestricted filter results.
        assert!(!feed.recent_window().iter().any(|t| t.id == "t04"));
        assert!(feed.history().iter().any(|t| t.id == "t04"));
        let all = crate::filter::apply(feed.history(), &FilterCriteria::default());
        assert!(all.iter().any(|t| t.id == "t04"));
    }

    #[test]
    fn test_recent_window_sorts_by_date_then_time_descending() {
        let mut feed = LiveFeed::new();
        feed.load_initial(vec![
            tx("old", "2026-08-20", "23:00:00", 1.0),
            tx("new", "2026-08-29", "01:00:00", 1.0),
            tx("mid", "2026-08-25", "12:00:00", 1.0),
        ]);
        let ids: Vec<&str> = feed.recent_window().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_search_filters_full_history_not_just_window() {
        let mut feed = LiveFeed::new();
        let records: Vec<Transaction> = (0..30)
            .map(|i| {
                tx(
                    &format!("t{i:02}"),
                    "2026-08-29",
                    &format!("00:{i:02}:00"),
                    (i as f64) * 100.0,
                )
            })
            .collect();
        feed.load_initial(records);

        feed.search(FilterCriteria {
            max_amount: Some(300.0),
            ..FilterCriteria::default()
        });
        // t00..t03 match; t00 through t09 are outside the recent window, so
        // this proves the filter reads history, not the window.
        assert_eq!(feed.view().len(), 4);
        assert!(feed.view().iter().any(|t| t.id == "t00"));
    }

    #[test]
    fn test_active_filter_reevaluated_on_insert() {
        let mut feed = LiveFeed::new();
        feed.load_initial(vec![tx("a", "2026-08-29", "10:00:00", 50.0)]);
        feed.search(FilterCriteria {
            min_amount: Some(1000.0),
            ..FilterCriteria::default()
        });
        assert!(feed.view().is_empty());

        feed.apply_insert(tx("big", "2026-08-29", "11:00:00", 5000.0));
        assert_eq!(feed.view().len(), 1);
        assert_eq!(feed.view()[0].id, "big");
    }

    #[test]
    fn test_clear_filters_restores_recent_window() {
        let mut feed = LiveFeed::new();
        let records: Vec<Transaction> = (0..25)
            .map(|i| tx(&format!("t{i:02}"), "2026-08-29", &format!("00:{i:02}:00"), 10.0))
            .collect();
        feed.load_initial(records);

        feed.search(FilterCriteria {
            user_id: Some("U-t00".to_string()),
            ..FilterCriteria::default()
        });
        assert_eq!(feed.view().len(), 1);

        feed.clear_filters();
        assert_eq!(feed.view().len(), RECENT_WINDOW);
        assert_eq!(feed.view(), feed.recent_window());
    }
}
