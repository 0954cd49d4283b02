//! The study session engine: segmentation, delivery, scoring and stats.

pub mod domain;
pub mod error;
pub mod manager;
pub mod ports;
pub mod scoring;
pub mod segmenter;
pub mod session;
pub mod stats;

pub use domain::{
    ItemKind, NextItem, PersistedStats, Progress, Score, SessionInfo, SessionSummary, StudyItem,
    SubmissionResult,
};
pub use error::{EngineError, EngineResult};
pub use manager::SessionManager;
pub use ports::{DocumentTextExtractor, PortError, PortResult, StatsStore};
pub use scoring::score;
pub use segmenter::{segment, segment_labeled, SegmentationLimits};
pub use session::{Session, SessionStore};
pub use stats::{record_session, InMemoryStatsStore, StatsAggregator, StatsSnapshot, HISTORY_LIMIT};
