// Integration tests for the local recording archive

use anyhow::Result;
use chrono::{Duration as ChronoDuration, Utc};
use kyr_cards::alert::Coordinates;
use kyr_cards::capture::MediaKind;
use kyr_cards::recording::{FinalizedRecording, RecordingArchive};
use tempfile::TempDir;

fn recording(id: &str, kind: MediaKind, age_secs: i64) -> FinalizedRecording {
    let finished_at = Utc::now() - ChronoDuration::seconds(age_secs);
    FinalizedRecording {
        id: id.to_string(),
        media_kind: kind,
        mime_type: kind.mime_type().to_string(),
        data: vec![7u8; 2048],
        duration_ms: 4200,
        chunk_count: 5,
        started_at: finished_at - ChronoDuration::milliseconds(4200),
        finished_at,
        auto_stopped: false,
    }
}

#[tokio::test]
async fn test_save_writes_media_and_sidecar() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let archive = RecordingArchive::new(temp_dir.path().join("recordings"));

    let location = Coordinates {
        latitude: 47.6062,
        longitude: -122.3321,
    };
    let record = archive
        .save(&recording("rec_a", MediaKind::Audio, 0), Some(location))
        .await?;

    assert_eq!(record.record_id, "rec_a");
    assert_eq!(record.size_bytes, 2048);
    assert_eq!(record.duration_ms, 4200);
    assert_eq!(record.location, Some(location));
    assert!(record.file_path.ends_with("rec_a.webm"));
    assert_eq!(std::fs::read(&record.file_path)?.len(), 2048);
    assert!(temp_dir.path().join("recordings/rec_a.json").exists());
    Ok(())
}

#[tokio::test]
async fn test_list_is_newest_first() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let archive = RecordingArchive::new(temp_dir.path());

    archive
        .save(&recording("rec_old", MediaKind::Video, 600), None)
        .await?;
    archive
        .save(&recording("rec_new", MediaKind::Audio, 0), None)
        .await?;
    std::fs::write(temp_dir.path().join("notes.json"), "not a record")?;

    let records = archive.list().await?;
    let ids: Vec<_> = records.iter().map(|r| r.record_id.as_str()).collect();
    assert_eq!(ids, vec!["rec_new", "rec_old"]);
    assert_eq!(records[1].recording_type, MediaKind::Video);
    Ok(())
}

#[tokio::test]
async fn test_list_of_missing_archive_is_empty() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let archive = RecordingArchive::new(temp_dir.path().join("never-created"));

    assert!(archive.list().await?.is_empty());
    Ok(())
}
