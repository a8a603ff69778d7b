use std::time::Duration;

use crate::capture::CaptureConstraints;

/// Per-session recording limits and device constraints
#[derive(Debug, Clone)]
pub struct RecorderSettings {
    /// Auto-stop threshold
    /// Default: 5 minutes
    pub max_duration: Duration,

    /// Elapsed-time clock period
    pub tick_interval: Duration,

    pub constraints: CaptureConstraints,
}

impl RecorderSettings {
    pub fn max_duration_ms(&self) -> u64 {
        self.max_duration.as_millis() as u64
    }
}

impl Default for RecorderSettings {
    fn default() -> Self {
        Self {
            max_duration: Duration::from_millis(300_000),
            tick_interval: Duration::from_millis(100),
            constraints: CaptureConstraints::default(),
        }
    }
}
