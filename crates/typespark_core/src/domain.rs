//! crates/typespark_core/src/domain.rs
//!
//! Defines the plain data records exchanged by the engine and its callers.
//! All of them serialize to JSON so any transport can carry them as-is.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Provenance tag of a study item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Text,
}

/// One bounded unit of text the user must retype. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StudyItem {
    pub id: Uuid,
    pub prompt: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub context: String,
}

impl StudyItem {
    pub fn text(prompt: impl Into<String>, content: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            prompt: prompt.into(),
            content: content.into(),
            kind: ItemKind::Text,
            context: context.into(),
        }
    }
}

/// Position within a session, taken after the last advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Progress {
    pub current: usize,
    pub total: usize,
}

/// An item handed out by `next_item`, together with the progress it produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NextItem {
    pub item: StudyItem,
    pub progress: Progress,
}

/// Accuracy and speed for one typed answer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Score {
    /// Fraction of matching characters, 0.0 to 1.0.
    pub accuracy: f64,
    pub wpm: f64,
}

/// The outcome of scoring one submitted answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SubmissionResult {
    pub item_id: Uuid,
    pub accuracy: f64,
    pub wpm: f64,
    #[serde(rename = "time_taken")]
    pub time_taken_seconds: f64,
}

/// A read-only view of a session for callers that want to inspect it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SessionInfo {
    pub id: Uuid,
    pub source_label: String,
    pub current: usize,
    pub total: usize,
    pub exhausted: bool,
    pub items: Vec<StudyItem>,
}

/// One completed practice run, as fed to the stats aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SessionSummary {
    pub date: DateTime<Utc>,
    pub duration_seconds: f64,
    pub items_completed: u32,
    pub average_wpm: f64,
    /// Percentage, 0 to 100.
    pub average_accuracy: f64,
}

/// Rolling performance aggregate kept by the external stats store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PersistedStats {
    pub average_wpm: f64,
    pub average_accuracy: f64,
    pub total_practice_minutes: f64,
    pub current_streak_days: u32,
    #[serde(default)]
    pub best_streak_days: u32,
    pub last_practice_date: Option<NaiveDate>,
    pub total_items_completed: u64,
}
