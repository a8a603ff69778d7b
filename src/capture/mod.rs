//! Capture device acquisition
//!
//! Device access is abstracted behind [`CaptureProvider`] so the recording
//! controller can run against real hardware or the synthetic device.

pub mod backend;
pub mod guard;
pub mod synthetic;

pub use backend::{
    AudioConstraints, CaptureConstraints, CaptureHandle, CaptureProvider, CaptureRequest,
    CaptureStream, MediaChunk, MediaKind, VideoConstraints,
};
pub use guard::DeviceGuard;
pub use synthetic::{SyntheticCapture, SyntheticStats};
