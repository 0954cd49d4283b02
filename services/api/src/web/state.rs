//! services/api/src/web/state.rs
//!
//! Defines the application state shared by every request handler.

use crate::config::Config;
use std::sync::Arc;
use typespark_core::{
    DocumentTextExtractor, SessionManager, SessionStore, StatsAggregator, StatsStore,
};

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: Arc<SessionManager>,
    pub stats: Arc<StatsAggregator>,
    pub extractor: Arc<dyn DocumentTextExtractor>,
}

impl AppState {
    /// Wires a fresh session store and the given adapters into one state.
    pub fn new(
        config: Arc<Config>,
        stats_store: Arc<dyn StatsStore>,
        extractor: Arc<dyn DocumentTextExtractor>,
    ) -> Self {
        let sessions = SessionManager::new(SessionStore::new(), config.segmentation.clone());
        Self {
            config,
            sessions: Arc::new(sessions),
            stats: Arc::new(StatsAggregator::new(stats_store)),
            extractor,
        }
    }
}
