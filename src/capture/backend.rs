use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;

use crate::error::DeviceAccessError;

/// What a recording session captures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Microphone only
    Audio,
    /// Camera plus microphone
    Video,
}

impl MediaKind {
    /// Container type of the finalized media
    pub fn mime_type(&self) -> &'static str {
        match self {
            MediaKind::Audio => "audio/webm",
            MediaKind::Video => "video/webm",
        }
    }

    /// Codec-qualified type requested from the encoder
    pub fn encoder_mime_type(&self) -> &'static str {
        match self {
            MediaKind::Audio => "audio/webm;codecs=opus",
            MediaKind::Video => "video/webm;codecs=vp9",
        }
    }

    pub fn file_extension(&self) -> &'static str {
        "webm"
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Microphone processing constraints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConstraints {
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub auto_gain_control: bool,
}

impl Default for AudioConstraints {
    fn default() -> Self {
        Self {
            echo_cancellation: true,
            noise_suppression: true,
            auto_gain_control: true,
        }
    }
}

/// Camera constraints (ideal values, the device may pick the closest match)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConstraints {
    pub width: u32,
    pub height: u32,
    /// "environment" (rear camera) or "user" (front camera)
    pub facing_mode: String,
}

impl Default for VideoConstraints {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            facing_mode: "environment".to_string(),
        }
    }
}

/// Constraint set used for every capture request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConstraints {
    pub audio: AudioConstraints,
    pub video: VideoConstraints,
}

/// A single device acquisition request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequest {
    pub kind: MediaKind,
    pub audio: AudioConstraints,
    /// Only present for video capture
    pub video: Option<VideoConstraints>,
}

impl CaptureRequest {
    pub fn new(kind: MediaKind, constraints: &CaptureConstraints) -> Self {
        let video = match kind {
            MediaKind::Video => Some(constraints.video.clone()),
            MediaKind::Audio => None,
        };

        Self {
            kind,
            audio: constraints.audio.clone(),
            video,
        }
    }
}

/// Encoded media fragment delivered by the device while active
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaChunk {
    /// Delivery order (0-indexed)
    pub sequence: u64,
    /// Encoded bytes
    pub data: Vec<u8>,
    /// Container type of the fragment
    pub mime_type: String,
    /// Milliseconds since the device started
    pub captured_at_ms: u64,
}

/// Open connection to a microphone/camera
///
/// Implementations stop emitting chunks while paused and after release.
pub trait CaptureHandle: Send + Sync {
    fn pause(&mut self);

    fn resume(&mut self);

    /// Stop all tracks. Must be safe to call more than once.
    fn release(&mut self);

    fn is_active(&self) -> bool;
}

/// An acquired device plus the chunk stream it feeds
pub struct CaptureStream {
    pub handle: Box<dyn CaptureHandle>,
    pub chunks: mpsc::Receiver<MediaChunk>,
}

/// Capture device acquisition
///
/// Implementations:
/// - Synthetic: in-process generator (service without hardware, tests)
/// - Platform backends plug in here
#[async_trait::async_trait]
pub trait CaptureProvider: Send + Sync {
    /// Request a capture handle for the given kind and constraints
    async fn acquire(&self, request: &CaptureRequest) -> Result<CaptureStream, DeviceAccessError>;

    /// Provider name for logging
    fn name(&self) -> &str;
}
