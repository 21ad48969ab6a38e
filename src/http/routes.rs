use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Catalog
        .route("/catalog", get(handlers::get_catalog))
        .route("/catalog/recommendation", get(handlers::get_recommendation))
        // Playback timers
        .route("/playback/start", post(handlers::start_playback))
        .route("/playback/:session_id", get(handlers::get_playback))
        .route("/playback/:session_id/pause", post(handlers::pause_playback))
        .route("/playback/:session_id/resume", post(handlers::resume_playback))
        .route("/playback/:session_id/seek/begin", post(handlers::begin_seek))
        .route("/playback/:session_id/seek/end", post(handlers::end_seek))
        .route("/playback/:session_id/finish", post(handlers::finish_playback))
        .route("/playback/:session_id/exit", post(handlers::exit_playback))
        // Practice records
        .route(
            "/records",
            get(handlers::list_records).post(handlers::save_record),
        )
        .route("/records/stats", get(handlers::get_stats))
        // Reminder
        .route(
            "/reminder",
            get(handlers::get_reminder).put(handlers::update_reminder),
        )
        // Profile and cohort
        .route("/profile", get(handlers::get_profile))
        .route("/profile/cohort", post(handlers::submit_cohort))
        .layer(CorsLayer::permissive())
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
