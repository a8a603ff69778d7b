//! Error types
//!
//! One enum per concern. Location and content-generation failures are
//! absorbed by their flows with a fallback; device, precondition and storage
//! write errors reach the caller.

use thiserror::Error;

use crate::capture::MediaKind;

/// The capture device could not be acquired
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceAccessError {
    #[error("Permission denied for {0} capture")]
    PermissionDenied(MediaKind),

    #[error("No {0} capture device available")]
    NoDevice(MediaKind),

    #[error("Failed to acquire capture device: {0}")]
    Failed(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordingError {
    #[error(transparent)]
    DeviceAccess(#[from] DeviceAccessError),

    #[error("A recording session is already active")]
    SessionActive,

    #[error("Cannot {action} while session is {status}")]
    InvalidTransition {
        action: &'static str,
        status: &'static str,
    },

    #[error("Recording was stopped before the capture device became available")]
    StoppedDuringStart,

    #[error("Failed to finalize recording: {0}")]
    Finalize(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Location unavailable: {reason}")]
pub struct LocationUnavailableError {
    pub reason: String,
}

impl LocationUnavailableError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentGenerationError {
    #[error("Remote content generation is not configured")]
    NotConfigured,

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Generator returned status {0}")]
    Status(u16),

    #[error("Malformed generated content: {0}")]
    Malformed(String),

    #[error("Content generation timed out after {0} ms")]
    Timeout(u64),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlertError {
    #[error("Please add at least one emergency contact")]
    NoContacts,

    #[error("Failed to deliver alert: {0}")]
    Delivery(String),
}

#[derive(Error, Debug)]
pub enum ContactError {
    #[error("Contact name must not be empty")]
    InvalidName,

    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),

    #[error("Emergency contact limit of {0} reached")]
    LimitReached(usize),

    #[error("Contact {0} not found")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Write-side persistence failures. Reads never fail: unreadable data is
/// reported as absent.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectError {
    #[error("Unknown region: {0}")]
    UnknownRegion(String),
}

/// Stored data that could not be used. Logged by the reader and treated as
/// absent.
#[derive(Error, Debug)]
pub enum PersistenceReadError {
    #[error("Unparsable value under {key}: {source}")]
    Corrupt {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported schema version {found} under {key}")]
    UnsupportedVersion { key: &'static str, found: u32 },
}
