//! crates/typespark_core/src/manager.rs
//!
//! The session manager: segmentation into sessions, serving items,
//! scoring submissions and summarising finished runs.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{NextItem, Progress, SessionInfo, SessionSummary, StudyItem, SubmissionResult};
use crate::error::{EngineError, EngineResult};
use crate::scoring;
use crate::segmenter::{self, SegmentationLimits};
use crate::session::{Session, SessionStore};

pub struct SessionManager {
    store: SessionStore,
    limits: SegmentationLimits,
}

impl SessionManager {
    pub fn new(store: SessionStore, limits: SegmentationLimits) -> Self {
        Self {
            store,
            limits: limits.validated(),
        }
    }

    pub fn limits(&self) -> &SegmentationLimits {
        &self.limits
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Stores a new session over `items` and returns its id.
    pub fn create_session(&self, items: Vec<StudyItem>, source_label: &str) -> EngineResult<Uuid> {
        let session = Session::new(items, source_label, Utc::now())?;
        let total = session.total_items();
        let id = self.store.insert(session);
        info!(session_id = %id, total, source = source_label, "Session created");
        Ok(id)
    }

    /// Segments `raw_text` with the configured limits and opens a session over the result.
    pub fn create_session_from_text(&self, raw_text: &str, source_label: &str) -> EngineResult<Uuid> {
        let items = segmenter::segment_labeled(raw_text, &self.limits, source_label);
        self.create_session(items, source_label)
    }

    /// Serves the next item and advances the session in one step.
    pub fn next_item(&self, session_id: Uuid) -> EngineResult<NextItem> {
        self.store.with_session(session_id, |session| {
            session.touch(Utc::now());
            let next = session.advance();
            match &next {
                Ok(next) => debug!(
                    session_id = %session_id,
                    current = next.progress.current,
                    total = next.progress.total,
                    "Serving item"
                ),
                Err(_) => info!(session_id = %session_id, "Session exhausted"),
            }
            next
        })
    }

    /// Scores a typed answer for one item. Does not move the session cursor.
    pub fn submit_answer(
        &self,
        session_id: Uuid,
        item_id: Uuid,
        typed_text: &str,
        elapsed_seconds: f64,
    ) -> EngineResult<SubmissionResult> {
        self.store.with_session(session_id, |session| {
            session.touch(Utc::now());
            let item = session
                .find_item(item_id)
                .ok_or(EngineError::ItemNotFound { session_id, item_id })?;
            let score = scoring::score(&item.content, typed_text, elapsed_seconds);
            let result = SubmissionResult {
                item_id,
                accuracy: score.accuracy,
                wpm: score.wpm,
                time_taken_seconds: elapsed_seconds,
            };
            debug!(
                session_id = %session_id,
                item_id = %item_id,
                accuracy = result.accuracy,
                wpm = result.wpm,
                "Answer scored"
            );
            session.record_result(result.clone());
            Ok(result)
        })
    }

    pub fn progress(&self, session_id: Uuid) -> EngineResult<Progress> {
        self.store.with_session(session_id, |session| Ok(session.progress()))
    }

    pub fn session_info(&self, session_id: Uuid) -> EngineResult<SessionInfo> {
        self.store.with_session(session_id, |session| Ok(session.info()))
    }

    /// Folds the scored answers of a session into a summary dated `now`.
    pub fn summarize(&self, session_id: Uuid, now: DateTime<Utc>) -> EngineResult<SessionSummary> {
        self.store
            .with_session(session_id, |session| Ok(summarize_results(session, now)))
    }

    /// Removes a session and summarises its scored answers in one step.
    ///
    /// Of several concurrent calls for the same id only one gets the summary;
    /// the rest see `SessionNotFound`.
    pub fn finish(&self, session_id: Uuid, now: DateTime<Utc>) -> EngineResult<SessionSummary> {
        let summary = self
            .store
            .take(session_id, |session| summarize_results(session, now))?;
        info!(
            session_id = %session_id,
            items_completed = summary.items_completed,
            "Session finished"
        );
        Ok(summary)
    }

    pub fn evict_idle(&self, now: DateTime<Utc>, max_idle: Duration) -> usize {
        let evicted = self.store.evict_idle(now, max_idle);
        if evicted > 0 {
            info!(evicted, remaining = self.store.len(), "Evicted idle sessions");
        }
        evicted
    }
}

fn summarize_results(session: &Session, now: DateTime<Utc>) -> SessionSummary {
    let results = session.results();
    let count = results.len();
    let (wpm_sum, accuracy_sum, seconds) = results.iter().fold((0.0, 0.0, 0.0), |acc, r| {
        (
            acc.0 + r.wpm,
            acc.1 + r.accuracy,
            acc.2 + r.time_taken_seconds.max(0.0),
        )
    });
    let mean = |sum: f64| if count == 0 { 0.0 } else { sum / count as f64 };

    SessionSummary {
        date: now,
        duration_seconds: seconds,
        items_completed: count as u32,
        average_wpm: mean(wpm_sum),
        average_accuracy: mean(accuracy_sum) * 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> SessionManager {
        SessionManager::new(SessionStore::new(), SegmentationLimits::default())
    }

    #[test]
    fn create_session_rejects_empty_items() {
        assert!(matches!(
            manager().create_session(Vec::new(), "Custom Text"),
            Err(EngineError::EmptyContent)
        ));
    }

    #[test]
    fn create_from_empty_text_is_empty_content() {
        assert!(matches!(
            manager().create_session_from_text("", "Custom Text"),
            Err(EngineError::EmptyContent)
        ));
    }

    #[test]
    fn submit_does_not_advance() {
        let manager = manager();
        let id = manager
            .create_session_from_text("Practice makes perfect.", "Custom Text")
            .unwrap();
        let served = manager.next_item(id).unwrap();
        let result = manager
            .submit_answer(id, served.item.id, "Practice makes perfect.", 6.0)
            .unwrap();
        assert_eq!(result.accuracy, 1.0);
        assert!((result.wpm - 30.0).abs() < 1e-9);
        assert_eq!(manager.session_info(id).unwrap().current, 1);
    }

    #[test]
    fn submit_for_unknown_item_fails() {
        let manager = manager();
        let id = manager.create_session_from_text("Some text.", "Custom Text").unwrap();
        let stale = Uuid::new_v4();
        let err = manager.submit_answer(id, stale, "x", 1.0).unwrap_err();
        assert!(matches!(err, EngineError::ItemNotFound { item_id, .. } if item_id == stale));
    }

    #[test]
    fn items_can_be_scored_before_being_served() {
        let manager = manager();
        let id = manager.create_session_from_text("Early bird.", "Custom Text").unwrap();
        let item_id = manager.session_info(id).unwrap().items[0].id;
        assert!(manager.submit_answer(id, item_id, "Early", 1.0).is_ok());
    }

    #[test]
    fn summary_averages_latest_result_per_item() {
        let manager = manager();
        let items = vec![
            StudyItem::text("p", "one two", "Custom Text"),
            StudyItem::text("p", "three four", "Custom Text"),
        ];
        let (a, b) = (items[0].id, items[1].id);
        let id = manager.create_session(items, "Custom Text").unwrap();

        manager.submit_answer(id, a, "xxx xxx", 6.0).unwrap();
        manager.submit_answer(id, a, "one two", 6.0).unwrap();
        manager.submit_answer(id, b, "three four", 12.0).unwrap();

        let now = Utc::now();
        let summary = manager.summarize(id, now).unwrap();
        assert_eq!(summary.date, now);
        assert_eq!(summary.items_completed, 2);
        assert!((summary.duration_seconds - 18.0).abs() < 1e-9);
        assert!((summary.average_wpm - 15.0).abs() < 1e-9);
        assert!((summary.average_accuracy - 100.0).abs() < 1e-9);
    }

    #[test]
    fn summary_of_untouched_session_is_zero() {
        let manager = manager();
        let id = manager.create_session_from_text("Nothing typed.", "Custom Text").unwrap();
        let summary = manager.summarize(id, Utc::now()).unwrap();
        assert_eq!(summary.items_completed, 0);
        assert_eq!(summary.average_wpm, 0.0);
    }

    #[test]
    fn finish_summarises_once_and_removes_the_session() {
        let manager = manager();
        let id = manager.create_session_from_text("Finish line.", "Custom Text").unwrap();
        let item_id = manager.next_item(id).unwrap().item.id;
        manager.submit_answer(id, item_id, "Finish line.", 6.0).unwrap();

        let summary = manager.finish(id, Utc::now()).unwrap();
        assert_eq!(summary.items_completed, 1);
        assert!(matches!(
            manager.finish(id, Utc::now()),
            Err(EngineError::SessionNotFound(_))
        ));
        assert!(manager.store().is_empty());
    }

    #[test]
    fn finished_sessions_stop_serving_items() {
        let manager = manager();
        let id = manager.create_session_from_text("Short lived.", "Custom Text").unwrap();
        manager.finish(id, Utc::now()).unwrap();
        assert!(matches!(manager.next_item(id), Err(EngineError::SessionNotFound(_))));
    }
}
