//! services/api/src/web/protocol.rs
//!
//! Request and response payloads of the REST API that are not plain domain records.

use serde::{Deserialize, Serialize};
use typespark_core::{PersistedStats, Progress, SessionSummary, SubmissionResult};
use utoipa::ToSchema;
use uuid::Uuid;

/// Seconds assumed when a client submits without timing information.
pub const DEFAULT_TIME_TAKEN_SECS: f64 = 60.0;

//=========================================================================================
// Payloads Sent FROM the Client
//=========================================================================================

/// Pasted text to practice.
#[derive(Deserialize, Debug, ToSchema)]
pub struct CreateSessionRequest {
    pub text: String,
    /// Label shown as the source of every item; defaults to "Custom Text".
    pub label: Option<String>,
}

/// A typed answer for one item.
#[derive(Deserialize, Debug, ToSchema)]
pub struct SubmitAnswerRequest {
    pub item_id: Uuid,
    pub answer: String,
    /// Seconds the user took; defaults to 60 when absent.
    pub time_taken: Option<f64>,
}

//=========================================================================================
// Payloads Sent FROM the Server
//=========================================================================================

/// Sent after a session has been created.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
    pub filename: String,
    pub items_count: usize,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct SubmitAnswerResponse {
    pub result: SubmissionResult,
    pub progress: Progress,
}

/// Outcome of finishing a session. Nothing is recorded when no answer was scored.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct CompleteSessionResponse {
    pub summary: SessionSummary,
    pub stats: PersistedStats,
    pub recorded: bool,
}
