//! crates/typespark_core/src/error.rs
//!
//! Errors surfaced by the study session engine. All of them are recoverable
//! by the caller; none leaves the engine in a broken state.

use uuid::Uuid;

use crate::ports::PortError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A session was requested over zero items.
    #[error("No study content to build a session from")]
    EmptyContent,

    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    /// Terminal signal: every item of the session has been served.
    #[error("No more items in session {0}")]
    SessionExhausted(Uuid),

    /// Usually stale client state resubmitting for an item it no longer holds.
    #[error("Item {item_id} not found in session {session_id}")]
    ItemNotFound { session_id: Uuid, item_id: Uuid },

    #[error("Stats store error: {0}")]
    Store(#[from] PortError),
}

pub type EngineResult<T> = Result<T, EngineError>;
