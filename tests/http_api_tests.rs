// Integration tests for the HTTP API
//
// The router is driven in-process with `tower::ServiceExt::oneshot`, wired
// to an in-memory store and the synthetic capture device.

use anyhow::Result;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use base64::Engine;
use kyr_cards::alert::{LogAlertSender, StaticLocation};
use kyr_cards::capture::{MediaKind, SyntheticCapture};
use kyr_cards::error::DeviceAccessError;
use kyr_cards::rights::ContentSelector;
use kyr_cards::storage::MemoryStore;
use kyr_cards::{create_router, AppContext, AppState, Collaborators, Config};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

fn app_with_capture(capture: SyntheticCapture, dir: &TempDir) -> Router {
    app_with_config(Config::default(), capture, dir)
}

fn app_with_config(mut config: Config, capture: SyntheticCapture, dir: &TempDir) -> Router {
    config.recording.recordings_path = dir
        .path()
        .join("recordings")
        .to_string_lossy()
        .into_owned();

    let ctx = AppContext::new(
        &config,
        Collaborators {
            store: Arc::new(MemoryStore::new()),
            capture: Arc::new(capture),
            location: Arc::new(StaticLocation::unavailable()),
            sender: Arc::new(LogAlertSender),
            selector: ContentSelector::bundled(),
        },
    );
    create_router(AppState::new(ctx))
}

fn app(dir: &TempDir) -> Router {
    app_with_capture(SyntheticCapture::new(Duration::from_millis(50)), dir)
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health() -> Result<()> {
    let dir = TempDir::new()?;
    let (status, _) = call(&app(&dir), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_state_listing_and_search() -> Result<()> {
    let dir = TempDir::new()?;
    let app = app(&dir);

    let (status, all) = call(&app, Method::GET, "/states", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().map(Vec::len), Some(50));

    let (_, found) = call(&app, Method::GET, "/states?q=new", None).await;
    let codes: Vec<_> = found
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["code"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(codes, vec!["NH", "NJ", "NM", "NY"]);
    assert!(found[0]["display_glyph"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_region_selection_flow() -> Result<()> {
    let dir = TempDir::new()?;
    let app = app(&dir);

    let (_, empty) = call(&app, Method::GET, "/region", None).await;
    assert!(empty["card"].is_null());

    let (status, card) = call(&app, Method::POST, "/region", Some(json!({"code": "ca"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(card["state"], "CA");
    assert_eq!(card["language"], "en");

    let (_, current) = call(&app, Method::GET, "/region", None).await;
    assert_eq!(current["region"]["name"], "California");
    assert_eq!(current["card"]["card_id"], card["card_id"]);

    let (status, err) = call(&app, Method::POST, "/region", Some(json!({"code": "ZZ"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["error"], "Unknown region: ZZ");
    Ok(())
}

#[tokio::test]
async fn test_offline_cards_and_share_links() -> Result<()> {
    let dir = TempDir::new()?;
    let app = app(&dir);

    let (status, _) = call(&app, Method::POST, "/cards/offline", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, card) = call(
        &app,
        Method::POST,
        "/region",
        Some(json!({"code": "TX", "language": "es"})),
    )
    .await;
    let card_id = card["card_id"].as_str().unwrap().to_string();

    let (status, cards) = call(&app, Method::POST, "/cards/offline", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cards[0]["card_id"], card_id.as_str());

    let (_, listed) = call(&app, Method::GET, "/cards/offline", None).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    let (status, links) = call(&app, Method::GET, &format!("/cards/{}/share", card_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        links["share_url"],
        format!("https://knowyourrights.cards/share/{}", card_id)
    );

    let (status, _) = call(&app, Method::GET, "/cards/card_missing/share", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_contacts_and_alerts() -> Result<()> {
    let dir = TempDir::new()?;
    let app = app(&dir);

    let (status, err) = call(&app, Method::POST, "/alerts", None).await;
    assert_eq!(status, StatusCode::PRECONDITION_FAILED);
    assert_eq!(err["error"], "Please add at least one emergency contact");

    let (status, _) = call(
        &app,
        Method::POST,
        "/contacts",
        Some(json!({"name": "Alex", "phone": "12345"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, contact) = call(
        &app,
        Method::POST,
        "/contacts",
        Some(json!({"name": "Alex", "phone": "+1 555 555 0123"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let contact_id = contact["id"].as_str().unwrap().to_string();

    let (status, receipt) = call(&app, Method::POST, "/alerts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(receipt["message"]
        .as_str()
        .unwrap()
        .contains("Location unavailable"));
    assert_eq!(receipt["recipients"][0], contact_id.as_str());

    let (status, _) = call(
        &app,
        Method::DELETE,
        &format!("/contacts/{}", contact_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, contacts) = call(&app, Method::GET, "/contacts", None).await;
    assert_eq!(contacts.as_array().map(Vec::len), Some(0));

    let (status, _) = call(
        &app,
        Method::DELETE,
        &format!("/contacts/{}", contact_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_preferences_update() -> Result<()> {
    let dir = TempDir::new()?;
    let app = app(&dir);

    let (_, prefs) = call(&app, Method::GET, "/preferences", None).await;
    assert_eq!(prefs["language"], "en");

    let (status, updated) = call(
        &app,
        Method::PUT,
        "/preferences",
        Some(json!({"language": "es", "preferred_media_kind": "video"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["language"], "es");
    assert_eq!(updated["preferred_media_kind"], "video");
    assert_eq!(updated["share_location"], true);

    // Selection now defaults to the preferred language
    let (_, card) = call(&app, Method::POST, "/region", Some(json!({"code": "FL"}))).await;
    assert_eq!(card["language"], "es");
    Ok(())
}

#[tokio::test]
async fn test_recording_lifecycle() -> Result<()> {
    let dir = TempDir::new()?;
    let app = app(&dir);

    let (status, _) = call(&app, Method::GET, "/recording/status", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, session) = call(
        &app,
        Method::POST,
        "/recording/start",
        Some(json!({"kind": "video"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["status"], "recording");
    assert_eq!(session["media_kind"], "video");

    let (status, _) = call(&app, Method::POST, "/recording/start", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, paused) = call(&app, Method::POST, "/recording/pause", None).await;
    assert_eq!(paused["changed"], true);
    assert_eq!(paused["session"]["status"], "paused");

    let (_, again) = call(&app, Method::POST, "/recording/pause", None).await;
    assert_eq!(again["changed"], false);

    let (_, resumed) = call(&app, Method::POST, "/recording/resume", None).await;
    assert_eq!(resumed["changed"], true);

    tokio::time::sleep(Duration::from_millis(300)).await;

    let (status, stopped) = call(&app, Method::POST, "/recording/stop", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stopped["session"]["status"], "stopped");
    assert_eq!(stopped["mime_type"], "video/webm");
    assert!(stopped["duration_ms"].as_u64().unwrap() >= 300);

    let data = base64::engine::general_purpose::STANDARD
        .decode(stopped["data"].as_str().unwrap())?;
    assert!(!data.is_empty());
    assert_eq!(stopped["size_bytes"].as_u64(), Some(data.len() as u64));

    let file_path = stopped["record"]["file_path"].as_str().unwrap();
    assert_eq!(std::fs::read(file_path)?, data);

    let (_, records) = call(&app, Method::GET, "/recordings", None).await;
    assert_eq!(records.as_array().map(Vec::len), Some(1));
    assert_eq!(records[0]["recording_type"], "video");

    // A new session can start once the previous one stopped
    let (status, session) = call(&app, Method::POST, "/recording/start", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["media_kind"], "audio");
    Ok(())
}

#[tokio::test]
async fn test_repeated_stop_returns_the_same_record() -> Result<()> {
    let dir = TempDir::new()?;
    let app = app(&dir);

    call(&app, Method::POST, "/recording/start", None).await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    let (status, first) = call(&app, Method::POST, "/recording/stop", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, second) = call(&app, Method::POST, "/recording/stop", None).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(first["record"], second["record"]);
    assert_eq!(first["data"], second["data"]);

    let (_, records) = call(&app, Method::GET, "/recordings", None).await;
    assert_eq!(records.as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn test_duration_limit_archives_without_stop_request() -> Result<()> {
    let dir = TempDir::new()?;
    let mut config = Config::default();
    config.recording.max_duration_ms = 200;
    let app = app_with_config(config, SyntheticCapture::new(Duration::from_millis(50)), &dir);

    let (_, first) = call(&app, Method::POST, "/recording/start", None).await;
    let first_id = first["id"].as_str().unwrap().to_string();

    tokio::time::sleep(Duration::from_millis(600)).await;

    let (_, status) = call(&app, Method::GET, "/recording/status", None).await;
    assert_eq!(status["status"], "stopped");
    assert_eq!(status["auto_stopped"], true);

    // Starting again replaces the slot without losing the first recording
    let (status, second) = call(&app, Method::POST, "/recording/start", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["status"], "recording");

    let (_, records) = call(&app, Method::GET, "/recordings", None).await;
    assert_eq!(records.as_array().map(Vec::len), Some(1));
    assert_eq!(records[0]["record_id"], first_id.as_str());

    let (_, stopped) = call(&app, Method::POST, "/recording/stop", None).await;
    assert_eq!(stopped["session"]["id"], second["id"]);

    let (_, records) = call(&app, Method::GET, "/recordings", None).await;
    assert_eq!(records.as_array().map(Vec::len), Some(2));
    Ok(())
}

#[tokio::test]
async fn test_device_denied_maps_to_service_unavailable() -> Result<()> {
    let dir = TempDir::new()?;
    let capture = SyntheticCapture::default()
        .denying(DeviceAccessError::PermissionDenied(MediaKind::Audio));
    let app = app_with_capture(capture, &dir);

    let (status, err) = call(
        &app,
        Method::POST,
        "/recording/start",
        Some(json!({"kind": "audio"})),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(err["error"], "Permission denied for audio capture");

    let (status, _) = call(&app, Method::GET, "/recording/status", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
