//! Recording session management
//!
//! This module provides:
//! - `SessionController`: start/pause/resume/stop of one capture session
//! - `ElapsedClock`: recording time excluding pauses, drives auto-stop
//! - `Recorder`: the slot that keeps at most one session active
//! - `RecordingArchive`: local storage of finalized recordings

mod archive;
mod clock;
mod config;
mod controller;
mod recorder;
mod state;

pub use archive::{EncounterRecord, RecordingArchive};
pub use clock::ElapsedClock;
pub use config::RecorderSettings;
pub use controller::SessionController;
pub use recorder::Recorder;
pub use state::{FinalizedRecording, RecordingEvent, RecordingSession, RecordingStatus};
