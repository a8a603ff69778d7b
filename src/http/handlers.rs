use super::error::ApiError;
use super::state::AppState;
use crate::alert::{AlertReceipt, EmergencyContact};
use crate::capture::MediaKind;
use crate::recording::{EncounterRecord, RecordingSession, RecordingStatus, SessionController};
use crate::rights::{all_states, find_state, search_states, Language, RightsCard, StateInfo};
use crate::share::ShareLinks;
use crate::storage::{Preferences, PreferencesPatch};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StatesQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SelectRegionRequest {
    pub code: String,
    pub language: Option<Language>,
}

#[derive(Debug, Serialize)]
pub struct RegionResponse {
    pub region: Option<StateInfo>,
    pub card: Option<RightsCard>,
}

#[derive(Debug, Deserialize)]
pub struct AddContactRequest {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct StartRecordingRequest {
    /// Falls back to the preferred media kind
    pub kind: Option<MediaKind>,
}

#[derive(Debug, Serialize)]
pub struct TransitionResponse {
    /// False when the request was a no-op in the current state
    pub changed: bool,
    pub session: RecordingSession,
}

#[derive(Debug, Serialize)]
pub struct StopRecordingResponse {
    pub session: RecordingSession,
    pub duration_ms: u64,
    pub size_bytes: usize,
    pub mime_type: String,
    /// Base64-encoded media
    pub data: String,
    pub record: Option<EncounterRecord>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /states?q=
/// List all states, or those whose name or code matches `q`
pub async fn list_states(Query(query): Query<StatesQuery>) -> Json<Vec<StateInfo>> {
    match query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => Json(search_states(q).into_iter().copied().collect()),
        None => Json(all_states().to_vec()),
    }
}

/// GET /region
/// Currently selected region and its card
pub async fn get_region(State(state): State<AppState>) -> Json<RegionResponse> {
    let card = match state.ctx.current_card() {
        Some(card) => Some(card),
        None => state.ctx.restore_selection().await,
    };
    let region = card
        .as_ref()
        .and_then(|c| find_state(&c.state))
        .copied();

    Json(RegionResponse { region, card })
}

/// POST /region
/// Select a region and return its card
pub async fn select_region(
    State(state): State<AppState>,
    Json(req): Json<SelectRegionRequest>,
) -> Result<Json<RightsCard>, ApiError> {
    if req.code.trim().is_empty() {
        return Err(ApiError::bad_request("Region code is required"));
    }
    info!("Selecting region {}", req.code);
    let card = state.ctx.select_region(&req.code, req.language).await?;
    Ok(Json(card))
}

/// GET /cards/offline
pub async fn list_offline_cards(State(state): State<AppState>) -> Json<Vec<RightsCard>> {
    Json(state.ctx.persistence.offline_cards())
}

/// POST /cards/offline
/// Save the current card for offline use
pub async fn save_offline_card(
    State(state): State<AppState>,
) -> Result<Json<Vec<RightsCard>>, ApiError> {
    match state.ctx.save_current_card_offline()? {
        Some(cards) => Ok(Json(cards)),
        None => Err(ApiError::not_found("No region selected")),
    }
}

/// GET /cards/:card_id/share
pub async fn share_card(
    State(state): State<AppState>,
    Path(card_id): Path<String>,
) -> Result<Json<ShareLinks>, ApiError> {
    state
        .ctx
        .share_links(&card_id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Card {} not found", card_id)))
}

/// GET /contacts
pub async fn list_contacts(State(state): State<AppState>) -> Json<Vec<EmergencyContact>> {
    Json(state.ctx.contacts.list())
}

/// POST /contacts
pub async fn add_contact(
    State(state): State<AppState>,
    Json(req): Json<AddContactRequest>,
) -> Result<(StatusCode, Json<EmergencyContact>), ApiError> {
    let contact = state
        .ctx
        .contacts
        .add(&req.name, &req.phone, req.email.as_deref())?;
    Ok((StatusCode::CREATED, Json(contact)))
}

/// DELETE /contacts/:contact_id
pub async fn remove_contact(
    State(state): State<AppState>,
    Path(contact_id): Path<String>,
) -> Result<Json<EmergencyContact>, ApiError> {
    Ok(Json(state.ctx.contacts.remove(&contact_id)?))
}

/// POST /alerts
/// Send an emergency alert to every stored contact
pub async fn send_alert(State(state): State<AppState>) -> Result<Json<AlertReceipt>, ApiError> {
    let receipt = state.ctx.send_alert().await?;
    Ok(Json(receipt))
}

/// GET /preferences
pub async fn get_preferences(State(state): State<AppState>) -> Json<Preferences> {
    Json(state.ctx.persistence.preferences())
}

/// PUT /preferences
pub async fn update_preferences(
    State(state): State<AppState>,
    Json(patch): Json<PreferencesPatch>,
) -> Result<Json<Preferences>, ApiError> {
    let updated = state.ctx.persistence.preferences().apply(patch);
    state.ctx.persistence.set_preferences(&updated)?;
    Ok(Json(updated))
}

/// POST /recording/start
/// Start a new recording session
pub async fn start_recording(
    State(state): State<AppState>,
    body: Option<Json<StartRecordingRequest>>,
) -> Result<Json<RecordingSession>, ApiError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let kind = req
        .kind
        .unwrap_or_else(|| state.ctx.persistence.preferences().preferred_media_kind);

    info!("Starting {} recording", kind);

    let session = state.ctx.start_recording(kind).await.map_err(|e| {
        error!("Failed to start recording: {}", e);
        ApiError::from(e)
    })?;

    Ok(Json(session.snapshot()))
}

fn current_session(state: &AppState) -> Result<Arc<SessionController>, ApiError> {
    state
        .ctx
        .recorder
        .current()
        .ok_or_else(|| ApiError::not_found("No recording session"))
}

/// POST /recording/pause
pub async fn pause_recording(
    State(state): State<AppState>,
) -> Result<Json<TransitionResponse>, ApiError> {
    let session = current_session(&state)?;
    let changed = session.pause();
    Ok(Json(TransitionResponse {
        changed,
        session: session.snapshot(),
    }))
}

/// POST /recording/resume
pub async fn resume_recording(
    State(state): State<AppState>,
) -> Result<Json<TransitionResponse>, ApiError> {
    let session = current_session(&state)?;
    let changed = session.resume();
    Ok(Json(TransitionResponse {
        changed,
        session: session.snapshot(),
    }))
}

/// POST /recording/stop
/// Stop the session and return its media with the archive record
///
/// Repeating the call on a stopped session returns the same result without
/// archiving again.
pub async fn stop_recording(
    State(state): State<AppState>,
) -> Result<Json<StopRecordingResponse>, ApiError> {
    let session = current_session(&state)?;

    // Ok(None) after Stopped means an earlier stop or the duration limit
    // already finalized it
    let recording = match session.stop()? {
        Some(recording) => recording,
        None if session.status() == RecordingStatus::Stopped => session.finished().await?,
        None => {
            return Err(ApiError::new(
                StatusCode::CONFLICT,
                "Recording has not started",
            ))
        }
    };

    let record = state.ctx.archived_record(&recording.id).await;

    info!(
        "Recording {} stopped ({} ms, {} bytes)",
        recording.id,
        recording.duration_ms,
        recording.size_bytes()
    );

    Ok(Json(StopRecordingResponse {
        session: session.snapshot(),
        duration_ms: recording.duration_ms,
        size_bytes: recording.size_bytes(),
        mime_type: recording.mime_type.clone(),
        data: STANDARD.encode(&recording.data),
        record,
    }))
}

/// GET /recording/status
pub async fn recording_status(
    State(state): State<AppState>,
) -> Result<Json<RecordingSession>, ApiError> {
    Ok(Json(current_session(&state)?.snapshot()))
}

/// GET /recordings
/// Archived encounter records, newest first
pub async fn list_recordings(
    State(state): State<AppState>,
) -> Result<Json<Vec<EncounterRecord>>, ApiError> {
    Ok(Json(state.ctx.archive.list().await?))
}
