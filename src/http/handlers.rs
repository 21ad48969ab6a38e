use super::state::{AppState, TrackedPlayback};
use crate::alert::Alert;
use crate::catalog::{filter_by_category, AudioItem, Category, ALL_CATEGORY_KEY};
use crate::cohort::CohortUpdate;
use crate::navigation::Route;
use crate::playback::TimerStatus;
use crate::records::RecordDraft;
use crate::reminder::TimeOfDay;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    /// Cohort override (defaults to the stored cohort code)
    pub cohort: Option<String>,
    /// Category key filter (defaults to "all")
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub cohort: String,
    pub categories: Vec<Category>,
    pub items: Vec<AudioItem>,
    /// True when the filter leaves nothing to show
    pub empty: bool,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub cohort: String,
    pub item: Option<AudioItem>,
}

#[derive(Debug, Deserialize)]
pub struct StartPlaybackRequest {
    pub audio_id: String,
}

#[derive(Debug, Serialize)]
pub struct PlaybackResponse {
    pub session_id: String,
    pub audio_id: String,
    pub status: TimerStatus,
    pub practice_secs: f64,
}

#[derive(Debug, Serialize)]
pub struct FinishPlaybackResponse {
    pub session_id: String,
    /// Record-entry route on the first finish; null when the timer was already closed
    pub route: Option<Route>,
}

#[derive(Debug, Deserialize)]
pub struct SaveRecordRequest {
    pub audio_id: Option<String>,
    pub practice_duration_seconds: Option<u64>,
    pub anxiety_rating: Option<u32>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateReminderRequest {
    pub enabled: Option<bool>,
    /// "HH:MM"
    pub time: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub cohort_code: String,
    pub device_id: String,
    pub subject_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CohortRequest {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub subject_id: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

fn alert_response(status: StatusCode, alert: Alert) -> Response {
    (status, Json(alert)).into_response()
}

// ============================================================================
// Catalog
// ============================================================================

/// GET /catalog
/// Audio items visible to the cohort, optionally filtered by category
pub async fn get_catalog(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Response {
    let cohort = match query.cohort {
        Some(code) if !code.trim().is_empty() => code,
        _ => state.app.user.cohort_code().await,
    };
    let category = query
        .category
        .unwrap_or_else(|| ALL_CATEGORY_KEY.to_string());

    match state.app.catalog.load(&cohort).await {
        Ok(snapshot) => {
            let items: Vec<AudioItem> = filter_by_category(&snapshot.items, &category)
                .into_iter()
                .cloned()
                .collect();
            (
                StatusCode::OK,
                Json(CatalogResponse {
                    cohort,
                    categories: snapshot.categories,
                    empty: items.is_empty(),
                    items,
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!("Catalog load failed: {:#}", e);
            alert_response(StatusCode::BAD_GATEWAY, Alert::load_failed())
        }
    }
}

/// GET /catalog/recommendation
/// Today's recommended item for the stored cohort
pub async fn get_recommendation(State(state): State<AppState>) -> Response {
    let cohort = state.app.user.cohort_code().await;

    match state.app.catalog.recommend(&cohort).await {
        Ok(item) => (StatusCode::OK, Json(RecommendationResponse { cohort, item })).into_response(),
        Err(e) => {
            error!("Recommendation load failed: {:#}", e);
            alert_response(StatusCode::BAD_GATEWAY, Alert::load_failed())
        }
    }
}

// ============================================================================
// Playback
// ============================================================================

async fn find_playback(
    state: &AppState,
    session_id: &str,
) -> Option<Arc<Mutex<TrackedPlayback>>> {
    state.playback.read().await.get(session_id).cloned()
}

fn playback_response(session_id: String, playback: &TrackedPlayback) -> PlaybackResponse {
    PlaybackResponse {
        session_id,
        audio_id: playback.audio_id.clone(),
        status: playback.timer.status(),
        practice_secs: playback.timer.elapsed_secs(Instant::now()),
    }
}

/// POST /playback/start
/// Media loaded and playing on the client: open a timer
pub async fn start_playback(
    State(state): State<AppState>,
    Json(req): Json<StartPlaybackRequest>,
) -> Response {
    let session_id = format!("playback-{}", uuid::Uuid::new_v4());

    let mut playback = TrackedPlayback {
        audio_id: req.audio_id,
        ..Default::default()
    };
    playback.timer.play(Instant::now());

    info!(
        "Playback {} started for audio {}",
        session_id, playback.audio_id
    );

    let response = playback_response(session_id.clone(), &playback);
    state
        .playback
        .write()
        .await
        .insert(session_id, Arc::new(Mutex::new(playback)));

    (StatusCode::OK, Json(response)).into_response()
}

/// GET /playback/:session_id
pub async fn get_playback(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    match find_playback(&state, &session_id).await {
        Some(playback) => {
            let playback = playback.lock().await;
            (StatusCode::OK, Json(playback_response(session_id, &playback))).into_response()
        }
        None => error_response(
            StatusCode::NOT_FOUND,
            format!("Playback {} not found", session_id),
        ),
    }
}

#[derive(Debug, Clone, Copy)]
enum PlaybackEvent {
    Pause,
    Resume,
    SeekBegin,
    SeekEnd,
}

async fn apply_event(state: AppState, session_id: String, event: PlaybackEvent) -> Response {
    let Some(playback) = find_playback(&state, &session_id).await else {
        return error_response(
            StatusCode::NOT_FOUND,
            format!("Playback {} not found", session_id),
        );
    };

    let mut playback = playback.lock().await;
    let now = Instant::now();

    match event {
        PlaybackEvent::Pause => {
            playback.timer.pause(now);
        }
        PlaybackEvent::Resume => playback.timer.play(now),
        PlaybackEvent::SeekBegin => playback.timer.begin_seek(now),
        PlaybackEvent::SeekEnd => playback.timer.end_seek(now),
    }

    (StatusCode::OK, Json(playback_response(session_id, &playback))).into_response()
}

/// POST /playback/:session_id/pause
pub async fn pause_playback(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    apply_event(state, session_id, PlaybackEvent::Pause).await
}

/// POST /playback/:session_id/resume
pub async fn resume_playback(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    apply_event(state, session_id, PlaybackEvent::Resume).await
}

/// POST /playback/:session_id/seek/begin
/// Time between seek begin and seek end is not practice time
pub async fn begin_seek(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    apply_event(state, session_id, PlaybackEvent::SeekBegin).await
}

/// POST /playback/:session_id/seek/end
pub async fn end_seek(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    apply_event(state, session_id, PlaybackEvent::SeekEnd).await
}

/// POST /playback/:session_id/finish
/// Natural end of media; yields the record-entry route once and drops the session
pub async fn finish_playback(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    let Some(playback) = find_playback(&state, &session_id).await else {
        return error_response(
            StatusCode::NOT_FOUND,
            format!("Playback {} not found", session_id),
        );
    };

    let route = {
        let mut playback = playback.lock().await;
        playback
            .timer
            .finish(Instant::now())
            .map(|total| Route::RecordEntry {
                audio_id: Some(playback.audio_id.clone()),
                practice_duration_seconds: Some(total),
            })
    };

    // A finalized session has nothing left to track
    if route.is_some() {
        state.playback.write().await.remove(&session_id);
        info!("Playback {} finished", session_id);
    }

    (
        StatusCode::OK,
        Json(FinishPlaybackResponse { session_id, route }),
    )
        .into_response()
}

/// POST /playback/:session_id/exit
/// Manual exit: discard the session without recording
pub async fn exit_playback(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    let removed = state.playback.write().await.remove(&session_id);

    match removed {
        Some(playback) => {
            playback.lock().await.timer.abandon();
            info!("Playback {} abandoned", session_id);
            (StatusCode::OK, Json(Route::Back)).into_response()
        }
        None => error_response(
            StatusCode::NOT_FOUND,
            format!("Playback {} not found", session_id),
        ),
    }
}

// ============================================================================
// Records
// ============================================================================

/// POST /records
pub async fn save_record(
    State(state): State<AppState>,
    Json(req): Json<SaveRecordRequest>,
) -> Response {
    let mut draft = RecordDraft::for_practice(req.audio_id, req.practice_duration_seconds);
    if let Some(rating) = req.anxiety_rating {
        draft.set_anxiety_rating(rating);
    }
    if !draft.set_description(&req.description) {
        return error_response(StatusCode::BAD_REQUEST, "Description is too long");
    }
    for tag in &req.tags {
        draft.select_tag(tag);
    }

    match state.app.records.save(draft).await {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(alert) => alert_response(StatusCode::INTERNAL_SERVER_ERROR, alert),
    }
}

/// GET /records
pub async fn list_records(State(state): State<AppState>) -> Response {
    (StatusCode::OK, Json(state.app.records.history().await)).into_response()
}

/// GET /records/stats
pub async fn get_stats(State(state): State<AppState>) -> Response {
    (StatusCode::OK, Json(state.app.records.stats().await)).into_response()
}

// ============================================================================
// Reminder
// ============================================================================

/// GET /reminder
pub async fn get_reminder(State(state): State<AppState>) -> Response {
    (StatusCode::OK, Json(state.app.reminders.load().await)).into_response()
}

/// PUT /reminder
pub async fn update_reminder(
    State(state): State<AppState>,
    Json(req): Json<UpdateReminderRequest>,
) -> Response {
    let time = match req.time.as_deref().map(TimeOfDay::parse).transpose() {
        Ok(time) => time,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, format!("{:#}", e)),
    };

    let mut update = None;
    if let Some(enabled) = req.enabled {
        update = Some(state.app.reminders.set_enabled(enabled).await);
    }
    if let Some(time) = time {
        update = Some(state.app.reminders.set_time(time).await);
    }

    match update {
        Some(update) => (StatusCode::OK, Json(update)).into_response(),
        None => error_response(StatusCode::BAD_REQUEST, "Nothing to update"),
    }
}

// ============================================================================
// Profile
// ============================================================================

/// GET /profile
pub async fn get_profile(State(state): State<AppState>) -> Response {
    let user = &state.app.user;
    (
        StatusCode::OK,
        Json(ProfileResponse {
            cohort_code: user.cohort_code().await,
            device_id: user.device_id().await,
            subject_id: user.subject_id().await,
        }),
    )
        .into_response()
}

/// POST /profile/cohort
pub async fn submit_cohort(
    State(state): State<AppState>,
    Json(req): Json<CohortRequest>,
) -> Response {
    match state.app.cohort.submit(&req.code, &req.subject_id).await {
        Ok(update @ CohortUpdate::Rejected { .. }) => {
            (StatusCode::UNPROCESSABLE_ENTITY, Json(update)).into_response()
        }
        Ok(update) => (StatusCode::OK, Json(update)).into_response(),
        Err(alert) => alert_response(StatusCode::BAD_GATEWAY, alert),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
