//! crates/typespark_core/src/stats.rs
//!
//! Rolling performance statistics and the daily practice streak.
//!
//! Averages are means over the retained history window only, while
//! `total_practice_minutes` and `total_items_completed` are lifetime counters.
//! The two therefore drift apart once old entries fall out of the window.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::domain::{PersistedStats, SessionSummary};
use crate::error::EngineResult;
use crate::ports::{PortResult, StatsStore};

/// Number of summaries kept in the history window.
pub const HISTORY_LIMIT: usize = 20;

/// Stats and history after one summary has been applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StatsSnapshot {
    pub stats: PersistedStats,
    /// Most recent first.
    pub history: Vec<SessionSummary>,
}

/// Applies one finished session to the prior aggregate.
pub fn record_session(
    summary: &SessionSummary,
    prior_stats: &PersistedStats,
    prior_history: &[SessionSummary],
) -> StatsSnapshot {
    let mut history = Vec::with_capacity(HISTORY_LIMIT);
    history.push(summary.clone());
    history.extend(prior_history.iter().take(HISTORY_LIMIT - 1).cloned());

    let n = history.len() as f64;
    let average_wpm = history.iter().map(|s| s.average_wpm).sum::<f64>() / n;
    let average_accuracy = history.iter().map(|s| s.average_accuracy).sum::<f64>() / n;

    let day = summary.date.date_naive();
    let (current_streak_days, last_practice_date) = advance_streak(prior_stats, day);

    let stats = PersistedStats {
        average_wpm,
        average_accuracy,
        total_practice_minutes: prior_stats.total_practice_minutes
            + summary.duration_seconds.max(0.0) / 60.0,
        current_streak_days,
        best_streak_days: prior_stats.best_streak_days.max(current_streak_days),
        last_practice_date: Some(last_practice_date),
        total_items_completed: prior_stats.total_items_completed + u64::from(summary.items_completed),
    };

    StatsSnapshot { stats, history }
}

/// Streak length and last practice day after practising on `day`.
fn advance_streak(prior: &PersistedStats, day: NaiveDate) -> (u32, NaiveDate) {
    let Some(last) = prior.last_practice_date else {
        return (1, day);
    };
    match (day - last).num_days() {
        0 => (prior.current_streak_days, day),
        1 => (prior.current_streak_days + 1, day),
        // Any other gap, including a session dated before the last one, restarts the streak.
        _ => (1, day),
    }
}

//=========================================================================================
// StatsAggregator
//=========================================================================================

/// Serialises read-modify-write cycles against a [`StatsStore`].
pub struct StatsAggregator {
    store: Arc<dyn StatsStore>,
    write_lock: Mutex<()>,
}

impl StatsAggregator {
    pub fn new(store: Arc<dyn StatsStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Records `summary` and returns the updated stats.
    pub fn record(&self, summary: &SessionSummary) -> EngineResult<PersistedStats> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let prior_stats = self.store.load_stats()?;
        let prior_history = self.store.load_history()?;
        let updated = record_session(summary, &prior_stats, &prior_history);

        self.store.save_history(&updated.history)?;
        if let Err(e) = self.store.save_stats(&updated.stats) {
            // Put the old window back so history and counters stay in step.
            if let Err(restore) = self.store.save_history(&prior_history) {
                error!("Failed to restore stats history after a failed save: {}", restore);
            }
            return Err(e.into());
        }

        info!(
            streak = updated.stats.current_streak_days,
            average_wpm = updated.stats.average_wpm,
            history_len = updated.history.len(),
            "Practice session recorded"
        );
        Ok(updated.stats)
    }

    pub fn snapshot(&self) -> EngineResult<StatsSnapshot> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(StatsSnapshot {
            stats: self.store.load_stats()?,
            history: self.store.load_history()?,
        })
    }
}

//=========================================================================================
// InMemoryStatsStore
//=========================================================================================

/// A process-local [`StatsStore`], used for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct InMemoryStatsStore {
    state: Mutex<(PersistedStats, Vec<SessionSummary>)>,
}

impl InMemoryStatsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatsStore for InMemoryStatsStore {
    fn load_stats(&self) -> PortResult<PersistedStats> {
        Ok(self.state.lock().unwrap_or_else(PoisonError::into_inner).0.clone())
    }

    fn save_stats(&self, stats: &PersistedStats) -> PortResult<()> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).0 = stats.clone();
        Ok(())
    }

    fn load_history(&self) -> PortResult<Vec<SessionSummary>> {
        Ok(self.state.lock().unwrap_or_else(PoisonError::into_inner).1.clone())
    }

    fn save_history(&self, history: &[SessionSummary]) -> PortResult<()> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).1 = history.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn summary(date: DateTime<Utc>, wpm: f64, accuracy: f64) -> SessionSummary {
        SessionSummary {
            date,
            duration_seconds: 120.0,
            items_completed: 3,
            average_wpm: wpm,
            average_accuracy: accuracy,
        }
    }

    #[test]
    fn first_session_initialises_everything() {
        let out = record_session(
            &summary(at(2026, 3, 1, 9), 50.0, 90.0),
            &PersistedStats::default(),
            &[],
        );
        assert_eq!(out.stats.average_wpm, 50.0);
        assert_eq!(out.stats.average_accuracy, 90.0);
        assert_eq!(out.stats.total_practice_minutes, 2.0);
        assert_eq!(out.stats.current_streak_days, 1);
        assert_eq!(out.stats.total_items_completed, 3);
        assert_eq!(out.stats.last_practice_date, NaiveDate::from_ymd_opt(2026, 3, 1));
        assert_eq!(out.history.len(), 1);
    }

    #[test]
    fn same_day_keeps_streak() {
        let first = record_session(&summary(at(2026, 3, 1, 8), 40.0, 80.0), &PersistedStats::default(), &[]);
        let second = record_session(&summary(at(2026, 3, 1, 22), 60.0, 100.0), &first.stats, &first.history);
        assert_eq!(second.stats.current_streak_days, 1);
        assert_eq!(second.stats.average_wpm, 50.0);
        assert_eq!(second.stats.average_accuracy, 90.0);
        assert_eq!(second.stats.total_practice_minutes, 4.0);
    }

    #[test]
    fn consecutive_days_extend_and_gaps_reset() {
        let day1 = record_session(&summary(at(2026, 3, 1, 23), 40.0, 80.0), &PersistedStats::default(), &[]);
        let day2 = record_session(&summary(at(2026, 3, 2, 0), 40.0, 80.0), &day1.stats, &day1.history);
        assert_eq!(day2.stats.current_streak_days, 2);

        let day5 = record_session(&summary(at(2026, 3, 5, 12), 40.0, 80.0), &day2.stats, &day2.history);
        assert_eq!(day5.stats.current_streak_days, 1);
        assert_eq!(day5.stats.best_streak_days, 2);
    }

    #[test]
    fn out_of_order_session_restarts_the_streak() {
        let day1 = record_session(&summary(at(2026, 3, 4, 12), 40.0, 80.0), &PersistedStats::default(), &[]);
        let day2 = record_session(&summary(at(2026, 3, 5, 12), 40.0, 80.0), &day1.stats, &day1.history);
        let earlier = record_session(&summary(at(2026, 3, 3, 12), 40.0, 80.0), &day2.stats, &day2.history);
        assert_eq!(earlier.stats.current_streak_days, 1);
        assert_eq!(earlier.stats.best_streak_days, 2);
        assert_eq!(earlier.stats.last_practice_date, NaiveDate::from_ymd_opt(2026, 3, 3));
    }

    #[test]
    fn history_window_is_bounded_and_most_recent_first() {
        let mut stats = PersistedStats::default();
        let mut history = Vec::new();
        for i in 0..25 {
            let out = record_session(&summary(at(2026, 3, 1, 0), i as f64, 100.0), &stats, &history);
            stats = out.stats;
            history = out.history;
        }
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history[0].average_wpm, 24.0);
        assert_eq!(history[HISTORY_LIMIT - 1].average_wpm, 5.0);
        // Mean of 5..=24, while the counters keep every session.
        assert_eq!(stats.average_wpm, 14.5);
        assert_eq!(stats.total_items_completed, 75);
        assert_eq!(stats.total_practice_minutes, 50.0);
    }

    /// Accepts history writes but refuses every stats write.
    #[derive(Default)]
    struct StatsWriteFails {
        inner: InMemoryStatsStore,
    }

    impl StatsStore for StatsWriteFails {
        fn load_stats(&self) -> PortResult<PersistedStats> {
            self.inner.load_stats()
        }

        fn save_stats(&self, _stats: &PersistedStats) -> PortResult<()> {
            Err(crate::ports::PortError::Unexpected("disk full".to_string()))
        }

        fn load_history(&self) -> PortResult<Vec<SessionSummary>> {
            self.inner.load_history()
        }

        fn save_history(&self, history: &[SessionSummary]) -> PortResult<()> {
            self.inner.save_history(history)
        }
    }

    #[test]
    fn failed_stats_write_restores_history() {
        let store = Arc::new(StatsWriteFails::default());
        let earlier = vec![summary(at(2026, 2, 28, 9), 30.0, 70.0)];
        store.inner.save_history(&earlier).unwrap();

        let aggregator = StatsAggregator::new(store.clone());
        let err = aggregator.record(&summary(at(2026, 3, 1, 9), 50.0, 90.0)).unwrap_err();

        assert!(matches!(err, crate::error::EngineError::Store(_)));
        assert_eq!(store.load_history().unwrap(), earlier);
        assert_eq!(store.load_stats().unwrap(), PersistedStats::default());
    }

    #[test]
    fn aggregator_persists_through_the_store() {
        let store = Arc::new(InMemoryStatsStore::new());
        let aggregator = StatsAggregator::new(store.clone());
        let stats = aggregator.record(&summary(at(2026, 3, 1, 9), 50.0, 90.0)).unwrap();

        assert_eq!(store.load_stats().unwrap(), stats);
        assert_eq!(store.load_history().unwrap().len(), 1);
        assert_eq!(aggregator.snapshot().unwrap().stats, stats);
    }
}
