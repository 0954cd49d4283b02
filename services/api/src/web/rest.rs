//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::{
    adapters::text_extractor::sanitize_file_name,
    content,
    error::ApiError,
    web::{
        protocol::{
            CompleteSessionResponse, CreateSessionRequest, CreateSessionResponse,
            SubmitAnswerRequest, SubmitAnswerResponse, DEFAULT_TIME_TAKEN_SECS,
        },
        state::AppState,
    },
};
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use bytes::Bytes;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use typespark_core::{
    segmenter::DEFAULT_CONTEXT, ItemKind, NextItem, PersistedStats, Progress, SessionInfo,
    SessionSummary, StatsSnapshot, StudyItem, SubmissionResult,
};
use utoipa::OpenApi;
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        upload_handler,
        create_session_handler,
        quick_start_handler,
        get_session_handler,
        next_item_handler,
        submit_answer_handler,
        complete_session_handler,
        get_stats_handler,
        record_stats_handler,
    ),
    components(
        schemas(
            CreateSessionRequest, CreateSessionResponse, SubmitAnswerRequest,
            SubmitAnswerResponse, CompleteSessionResponse, ItemKind, StudyItem, Progress,
            NextItem, SubmissionResult, SessionInfo, SessionSummary, PersistedStats,
            StatsSnapshot,
        )
    ),
    tags(
        (name = "TypeSpark API", description = "Typing practice sessions built from your own text.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Session Creation
//=========================================================================================

/// Segments the text (or the quick start text, if blank) and opens a session over it.
fn start_session(
    app_state: &AppState,
    raw_text: &str,
    label: &str,
) -> Result<CreateSessionResponse, ApiError> {
    let (text, label) = content::practice_text(raw_text, label);
    let session_id = app_state.sessions.create_session_from_text(text, label)?;
    let progress = app_state.sessions.progress(session_id)?;
    Ok(CreateSessionResponse {
        session_id,
        filename: label.to_string(),
        items_count: progress.total,
    })
}

/// Create a session from an uploaded `.txt` or `.pdf` file.
///
/// Accepts a multipart/form-data request with a `file` part.
#[utoipa::path(
    post,
    path = "/api/upload",
    request_body(content_type = "multipart/form-data", description = "The document to practice with."),
    responses(
        (status = 201, description = "Session created successfully", body = CreateSessionResponse),
        (status = 400, description = "Missing file or unsupported file type"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn upload_handler(
    State(app_state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut upload: Option<(String, Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read multipart data: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read file bytes: {}", e)))?;
        upload = Some((file_name, data));
        break;
    }

    let Some((file_name, data)) = upload else {
        return Err(ApiError::BadRequest("No file part".to_string()));
    };
    if file_name.is_empty() {
        return Err(ApiError::BadRequest("No selected file".to_string()));
    }

    let file_name = sanitize_file_name(&file_name);
    let text = app_state.extractor.extract_text(&file_name, &data).await?;
    let response = start_session(&app_state, &text, &file_name)?;
    info!(
        "Upload {} became session {} with {} items",
        file_name, response.session_id, response.items_count
    );
    Ok((StatusCode::CREATED, Json(response)))
}

/// Create a session from pasted text.
#[utoipa::path(
    post,
    path = "/api/sessions",
    request_body = CreateSessionRequest,
    responses(
        (status = 201, description = "Session created successfully", body = CreateSessionResponse),
        (status = 400, description = "Malformed request")
    )
)]
pub async fn create_session_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let label = req
        .label
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(DEFAULT_CONTEXT);
    let response = start_session(&app_state, &req.text, label)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Create a session over the built-in practice text.
#[utoipa::path(
    post,
    path = "/api/sessions/quick-start",
    responses(
        (status = 201, description = "Session created successfully", body = CreateSessionResponse)
    )
)]
pub async fn quick_start_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let response = start_session(&app_state, content::QUICK_START_TEXT, content::QUICK_START_LABEL)?;
    Ok((StatusCode::CREATED, Json(response)))
}

//=========================================================================================
// Session Delivery
//=========================================================================================

/// Inspect a session and its items.
#[utoipa::path(
    get,
    path = "/api/session/{id}",
    params(("id" = Uuid, Path, description = "The session id.")),
    responses(
        (status = 200, description = "The session", body = SessionInfo),
        (status = 404, description = "Session not found")
    )
)]
pub async fn get_session_handler(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionInfo>, ApiError> {
    Ok(Json(app_state.sessions.session_info(session_id)?))
}

/// Serve the next item of a session.
///
/// Once every item has been served the session answers 409 with
/// `session_completed: true`, which clients treat as the signal to show results.
#[utoipa::path(
    get,
    path = "/api/session/{id}/next",
    params(("id" = Uuid, Path, description = "The session id.")),
    responses(
        (status = 200, description = "The next item and the progress after serving it", body = NextItem),
        (status = 404, description = "Session not found"),
        (status = 409, description = "No more items in session")
    )
)]
pub async fn next_item_handler(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<NextItem>, ApiError> {
    Ok(Json(app_state.sessions.next_item(session_id)?))
}

/// Score a typed answer for one item.
#[utoipa::path(
    post,
    path = "/api/session/{id}/submit",
    params(("id" = Uuid, Path, description = "The session id.")),
    request_body = SubmitAnswerRequest,
    responses(
        (status = 200, description = "The scored answer", body = SubmitAnswerResponse),
        (status = 404, description = "Session or item not found")
    )
)]
pub async fn submit_answer_handler(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>, ApiError> {
    let elapsed = req.time_taken.unwrap_or(DEFAULT_TIME_TAKEN_SECS);
    let result = app_state
        .sessions
        .submit_answer(session_id, req.item_id, &req.answer, elapsed)?;
    let progress = app_state.sessions.progress(session_id)?;
    Ok(Json(SubmitAnswerResponse { result, progress }))
}

/// Finish a session: summarise its answers, record them and drop the session.
#[utoipa::path(
    post,
    path = "/api/session/{id}/complete",
    params(("id" = Uuid, Path, description = "The session id.")),
    responses(
        (status = 200, description = "The summary and the updated stats", body = CompleteSessionResponse),
        (status = 404, description = "Session not found or already completed")
    )
)]
pub async fn complete_session_handler(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<CompleteSessionResponse>, ApiError> {
    // The session leaves the store before anything is recorded.
    let summary = app_state.sessions.finish(session_id, Utc::now())?;
    let recorded = summary.items_completed > 0;
    let stats = if recorded {
        record_summary(&app_state, summary.clone()).await?
    } else {
        load_snapshot(&app_state).await?.stats
    };
    info!("Session {} completed (recorded: {})", session_id, recorded);
    Ok(Json(CompleteSessionResponse {
        summary,
        stats,
        recorded,
    }))
}

//=========================================================================================
// Stats
//=========================================================================================

/// Current stats and the recent history window.
#[utoipa::path(
    get,
    path = "/api/stats",
    responses(
        (status = 200, description = "Stats and history, most recent first", body = StatsSnapshot)
    )
)]
pub async fn get_stats_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<StatsSnapshot>, ApiError> {
    Ok(Json(load_snapshot(&app_state).await?))
}

/// Record a session summary built by the client.
#[utoipa::path(
    post,
    path = "/api/stats/sessions",
    request_body = SessionSummary,
    responses(
        (status = 200, description = "The updated stats", body = PersistedStats),
        (status = 400, description = "Summary values out of range")
    )
)]
pub async fn record_stats_handler(
    State(app_state): State<Arc<AppState>>,
    Json(summary): Json<SessionSummary>,
) -> Result<Json<PersistedStats>, ApiError> {
    validate_summary(&summary)?;
    Ok(Json(record_summary(&app_state, summary).await?))
}

fn validate_summary(summary: &SessionSummary) -> Result<(), ApiError> {
    let non_negative = |v: f64| v.is_finite() && v >= 0.0;
    if !non_negative(summary.duration_seconds) || !non_negative(summary.average_wpm) {
        return Err(ApiError::BadRequest(
            "duration_seconds and average_wpm must be non-negative numbers".to_string(),
        ));
    }
    if !non_negative(summary.average_accuracy) || summary.average_accuracy > 100.0 {
        return Err(ApiError::BadRequest(
            "average_accuracy must be a percentage between 0 and 100".to_string(),
        ));
    }
    Ok(())
}

// The stats store does blocking file I/O, so it runs off the async workers.
async fn record_summary(
    app_state: &AppState,
    summary: SessionSummary,
) -> Result<PersistedStats, ApiError> {
    let stats = Arc::clone(&app_state.stats);
    let updated = tokio::task::spawn_blocking(move || stats.record(&summary))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;
    Ok(updated)
}

async fn load_snapshot(app_state: &AppState) -> Result<StatsSnapshot, ApiError> {
    let stats = Arc::clone(&app_state.stats);
    let snapshot = tokio::task::spawn_blocking(move || stats.snapshot())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;
    Ok(snapshot)
}
