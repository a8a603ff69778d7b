//! Recording state machine types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::capture::MediaKind;

/// Lifecycle of a single recording session
///
/// `Idle -> Recording -> {Paused <-> Recording} -> Stopped`. `Stopped` is
/// terminal; recording again needs a new session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingStatus {
    Idle,
    Recording,
    Paused,
    Stopped,
}

impl RecordingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordingStatus::Idle => "idle",
            RecordingStatus::Recording => "recording",
            RecordingStatus::Paused => "paused",
            RecordingStatus::Stopped => "stopped",
        }
    }
}

impl Default for RecordingStatus {
    fn default() -> Self {
        Self::Idle
    }
}

/// Point-in-time view of a session, safe to hand to observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingSession {
    pub id: String,
    pub status: RecordingStatus,
    pub media_kind: Option<MediaKind>,
    pub started_at: Option<DateTime<Utc>>,
    /// Time spent in `Recording`, updated on every clock tick
    pub elapsed_ms: u64,
    pub chunk_count: usize,
    pub byte_count: usize,
    pub max_duration_ms: u64,
    /// Whether the session was ended by the duration limit
    pub auto_stopped: bool,
}

/// The single immutable media object produced by `stop()`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedRecording {
    pub id: String,
    pub media_kind: MediaKind,
    pub mime_type: String,
    pub data: Vec<u8>,
    pub duration_ms: u64,
    pub chunk_count: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub auto_stopped: bool,
}

impl FinalizedRecording {
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}

/// Change notifications emitted by a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingEvent {
    Started { kind: MediaKind },
    Paused { elapsed_ms: u64 },
    Resumed { elapsed_ms: u64 },
    Progress { elapsed_ms: u64 },
    Stopped { duration_ms: u64, auto_stopped: bool },
    Error(String),
}
