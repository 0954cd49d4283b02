//! crates/typespark_core/src/session.rs
//!
//! Per-run sequencing state and the in-memory store that owns it.
//!
//! The store keeps one mutex per session. The outer map lock is only held long
//! enough to look up (or insert/remove) a handle, so work on one session never
//! blocks work on another, while two calls on the same session are serialised.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, TryLockError};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::{NextItem, Progress, SessionInfo, StudyItem, SubmissionResult};
use crate::error::{EngineError, EngineResult};

//=========================================================================================
// Session
//=========================================================================================

/// Ordered delivery state over a fixed list of items.
///
/// `current_index` only moves forward, through [`Session::advance`].
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    items: Vec<StudyItem>,
    current_index: usize,
    source_label: String,
    results: Vec<SubmissionResult>,
    created_at: DateTime<Utc>,
    last_accessed_at: DateTime<Utc>,
}

impl Session {
    pub fn new(items: Vec<StudyItem>, source_label: impl Into<String>, now: DateTime<Utc>) -> EngineResult<Self> {
        if items.is_empty() {
            return Err(EngineError::EmptyContent);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            items,
            current_index: 0,
            source_label: source_label.into(),
            results: Vec::new(),
            created_at: now,
            last_accessed_at: now,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn items(&self) -> &[StudyItem] {
        &self.items
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn total_items(&self) -> usize {
        self.items.len()
    }

    pub fn source_label(&self) -> &str {
        &self.source_label
    }

    pub fn is_exhausted(&self) -> bool {
        self.current_index >= self.items.len()
    }

    pub fn progress(&self) -> Progress {
        Progress {
            current: self.current_index,
            total: self.items.len(),
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_accessed_at(&self) -> DateTime<Utc> {
        self.last_accessed_at
    }

    /// Scored answers, at most one per item (a resubmission replaces the earlier one).
    pub fn results(&self) -> &[SubmissionResult] {
        &self.results
    }

    /// Hands out the item at the cursor and moves the cursor past it.
    pub fn advance(&mut self) -> EngineResult<NextItem> {
        let Some(item) = self.items.get(self.current_index).cloned() else {
            return Err(EngineError::SessionExhausted(self.id));
        };
        self.current_index += 1;
        Ok(NextItem {
            item,
            progress: self.progress(),
        })
    }

    pub fn find_item(&self, item_id: Uuid) -> Option<&StudyItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    pub fn record_result(&mut self, result: SubmissionResult) {
        match self.results.iter_mut().find(|r| r.item_id == result.item_id) {
            Some(existing) => *existing = result,
            None => self.results.push(result),
        }
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_accessed_at = self.last_accessed_at.max(now);
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            id: self.id,
            source_label: self.source_label.clone(),
            current: self.current_index,
            total: self.items.len(),
            exhausted: self.is_exhausted(),
            items: self.items.clone(),
        }
    }
}

//=========================================================================================
// SessionStore
//=========================================================================================

type SessionHandle = Arc<Mutex<Session>>;

/// In-memory mapping from session id to session state.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SessionHandle>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: Session) -> Uuid {
        let id = session.id();
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        sessions.insert(id, Arc::new(Mutex::new(session)));
        id
    }

    /// Runs `f` with exclusive access to one session.
    pub fn with_session<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Session) -> EngineResult<T>,
    ) -> EngineResult<T> {
        let handle = self.handle(id)?;
        let mut session = lock(&handle);
        f(&mut session)
    }

    /// Removes a session from the map, then runs `f` on it once any in-flight
    /// call has released its lock.
    ///
    /// Only one caller can take a given id; later callers get `SessionNotFound`.
    pub fn take<T>(&self, id: Uuid, f: impl FnOnce(&mut Session) -> T) -> EngineResult<T> {
        let handle = {
            let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
            sessions.remove(&id).ok_or(EngineError::SessionNotFound(id))?
        };
        let mut session = lock(&handle);
        Ok(f(&mut session))
    }

    pub fn remove(&self, id: Uuid) -> bool {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        sessions.remove(&id).is_some()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        sessions.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops sessions not accessed within `max_idle` of `now`.
    ///
    /// A session that is locked by an in-flight call is in use and is kept.
    /// Returns how many sessions were removed.
    pub fn evict_idle(&self, now: DateTime<Utc>, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, handle| match handle.try_lock() {
            Ok(session) => now - session.last_accessed_at() <= max_idle,
            Err(TryLockError::Poisoned(poisoned)) => {
                now - poisoned.into_inner().last_accessed_at() <= max_idle
            }
            Err(TryLockError::WouldBlock) => true,
        });
        before - sessions.len()
    }

    fn handle(&self, id: Uuid) -> EngineResult<SessionHandle> {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        sessions
            .get(&id)
            .cloned()
            .ok_or(EngineError::SessionNotFound(id))
    }
}

// Every mutation of a session is a single field update, so a panic elsewhere
// cannot leave one half-written; a poisoned lock is still safe to use.
fn lock(handle: &Mutex<Session>) -> MutexGuard<'_, Session> {
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(n: usize) -> Vec<StudyItem> {
        (0..n)
            .map(|i| StudyItem::text("Type this text:", format!("item {i}"), "Custom Text"))
            .collect()
    }

    #[test]
    fn new_session_rejects_empty_items() {
        assert!(matches!(
            Session::new(Vec::new(), "x", Utc::now()),
            Err(EngineError::EmptyContent)
        ));
    }

    #[test]
    fn advance_walks_items_then_signals_exhaustion() {
        let mut session = Session::new(items(2), "x", Utc::now()).unwrap();
        let first = session.advance().unwrap();
        assert_eq!(first.item.content, "item 0");
        assert_eq!(first.progress, Progress { current: 1, total: 2 });
        let second = session.advance().unwrap();
        assert_eq!(second.progress.current, 2);
        assert!(session.is_exhausted());
        assert!(matches!(session.advance(), Err(EngineError::SessionExhausted(_))));
        assert_eq!(session.current_index(), 2);
    }

    #[test]
    fn resubmission_replaces_previous_result() {
        let mut session = Session::new(items(1), "x", Utc::now()).unwrap();
        let item_id = session.items()[0].id;
        for accuracy in [0.5, 0.9] {
            session.record_result(SubmissionResult {
                item_id,
                accuracy,
                wpm: 40.0,
                time_taken_seconds: 10.0,
            });
        }
        assert_eq!(session.results().len(), 1);
        assert_eq!(session.results()[0].accuracy, 0.9);
    }

    #[test]
    fn store_reports_unknown_sessions() {
        let store = SessionStore::new();
        let missing = Uuid::new_v4();
        let err = store.with_session(missing, |s| Ok(s.id())).unwrap_err();
        assert!(matches!(err, EngineError::SessionNotFound(id) if id == missing));
    }

    #[test]
    fn eviction_removes_only_idle_sessions() {
        let store = SessionStore::new();
        let start = Utc::now();
        let stale = store.insert(Session::new(items(1), "old", start).unwrap());
        let fresh = store.insert(Session::new(items(1), "new", start).unwrap());
        store
            .with_session(fresh, |s| {
                s.touch(start + Duration::minutes(50));
                Ok(())
            })
            .unwrap();

        let evicted = store.evict_idle(start + Duration::minutes(61), Duration::minutes(30));
        assert_eq!(evicted, 1);
        assert!(!store.contains(stale));
        assert!(store.contains(fresh));
    }

    #[test]
    fn take_hands_a_session_to_exactly_one_caller() {
        let store = SessionStore::new();
        let id = store.insert(Session::new(items(3), "x", Utc::now()).unwrap());

        let taken: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| store.take(id, |s| s.total_items())))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(taken.iter().filter(|r| matches!(r, Ok(3))).count(), 1);
        assert_eq!(
            taken
                .iter()
                .filter(|r| matches!(r, Err(EngineError::SessionNotFound(_))))
                .count(),
            7
        );
        assert!(store.is_empty());
    }

    #[test]
    fn remove_reports_presence() {
        let store = SessionStore::new();
        let id = store.insert(Session::new(items(1), "x", Utc::now()).unwrap());
        assert_eq!(store.len(), 1);
        assert!(store.remove(id));
        assert!(!store.remove(id));
        assert!(store.is_empty());
    }
}
