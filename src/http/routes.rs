use super::handlers;
use super::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Region selection
        .route("/states", get(handlers::list_states))
        .route(
            "/region",
            get(handlers::get_region).post(handlers::select_region),
        )
        // Cards
        .route(
            "/cards/offline",
            get(handlers::list_offline_cards).post(handlers::save_offline_card),
        )
        .route("/cards/:card_id/share", get(handlers::share_card))
        // Emergency contacts and alerts
        .route(
            "/contacts",
            get(handlers::list_contacts).post(handlers::add_contact),
        )
        .route("/contacts/:contact_id", delete(handlers::remove_contact))
        .route("/alerts", post(handlers::send_alert))
        .route(
            "/preferences",
            get(handlers::get_preferences).put(handlers::update_preferences),
        )
        // Recording control
        .route("/recording/start", post(handlers::start_recording))
        .route("/recording/pause", post(handlers::pause_recording))
        .route("/recording/resume", post(handlers::resume_recording))
        .route("/recording/stop", post(handlers::stop_recording))
        .route("/recording/status", get(handlers::recording_status))
        .route("/recordings", get(handlers::list_recordings))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
