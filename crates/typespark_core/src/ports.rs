//! crates/typespark_core/src/ports.rs
//!
//! Defines the service contracts (traits) the engine consumes from the outside.
//! Concrete implementations (file storage, document decoding) live in the
//! service crate, so the engine never touches a filesystem or a binary format.

use async_trait::async_trait;

use crate::domain::{PersistedStats, SessionSummary};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Unsupported document: {0}")]
    Unsupported(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Durable get/set of the stats aggregate and its history window.
///
/// Calls are synchronous and expected to be quick; serialising the
/// read-modify-write cycle is the aggregator's job, not the store's.
pub trait StatsStore: Send + Sync {
    fn load_stats(&self) -> PortResult<PersistedStats>;

    fn save_stats(&self, stats: &PersistedStats) -> PortResult<()>;

    /// Most recent first.
    fn load_history(&self) -> PortResult<Vec<SessionSummary>>;

    fn save_history(&self, history: &[SessionSummary]) -> PortResult<()>;
}

#[async_trait]
pub trait DocumentTextExtractor: Send + Sync {
    /// Decodes an uploaded document into plain text, enforcing upstream limits.
    async fn extract_text(&self, file_name: &str, data: &[u8]) -> PortResult<String>;
}
