use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

use super::state::FinalizedRecording;
use crate::alert::Coordinates;
use crate::capture::MediaKind;
use crate::error::StorageError;

/// Metadata written next to every archived recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterRecord {
    pub record_id: String,
    pub timestamp: DateTime<Utc>,
    pub file_path: PathBuf,
    pub recording_type: MediaKind,
    pub duration_ms: u64,
    pub size_bytes: usize,
    pub location: Option<Coordinates>,
}

/// Local store for finalized recordings
///
/// Each recording lands as `<id>.webm` plus an `<id>.json` sidecar.
pub struct RecordingArchive {
    dir: PathBuf,
}

impl RecordingArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn save(
        &self,
        recording: &FinalizedRecording,
        location: Option<Coordinates>,
    ) -> Result<EncounterRecord, StorageError> {
        fs::create_dir_all(&self.dir).await?;

        let file_path = self.dir.join(format!(
            "{}.{}",
            recording.id,
            recording.media_kind.file_extension()
        ));
        fs::write(&file_path, &recording.data).await?;

        let record = EncounterRecord {
            record_id: recording.id.clone(),
            timestamp: recording.finished_at,
            file_path,
            recording_type: recording.media_kind,
            duration_ms: recording.duration_ms,
            size_bytes: recording.size_bytes(),
            location,
        };

        let sidecar = self.dir.join(format!("{}.json", recording.id));
        fs::write(&sidecar, serde_json::to_vec_pretty(&record)?).await?;

        info!(
            "Archived recording {} ({} bytes) to {:?}",
            record.record_id, record.size_bytes, record.file_path
        );

        Ok(record)
    }

    /// All readable records, newest first. Unreadable sidecars are skipped.
    pub async fn list(&self) -> Result<Vec<EncounterRecord>, StorageError> {
        let mut records = Vec::new();

        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(records),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }

            let bytes = fs::read(&path).await?;
            match serde_json::from_slice::<EncounterRecord>(&bytes) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping unreadable record {:?}: {}", path, e),
            }
        }

        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(records)
    }
}
