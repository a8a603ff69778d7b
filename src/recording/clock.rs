use std::time::Duration;
use tokio::time::Instant;

/// Elapsed recording time across pause/resume cycles
///
/// Completed intervals are accumulated; the open interval is measured from
/// the reference taken at start or at the latest resume.
#[derive(Debug, Clone, Default)]
pub struct ElapsedClock {
    accumulated: Duration,
    running_since: Option<Instant>,
}

impl ElapsedClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset and begin measuring
    pub fn start(&mut self, now: Instant) {
        self.accumulated = Duration::ZERO;
        self.running_since = Some(now);
    }

    /// Close the open interval. No-op when not running.
    pub fn pause(&mut self, now: Instant) {
        if let Some(since) = self.running_since.take() {
            self.accumulated += now.saturating_duration_since(since);
        }
    }

    /// Open a new interval with a fresh reference, keeping accumulated time
    pub fn resume(&mut self, now: Instant) {
        if self.running_since.is_none() {
            self.running_since = Some(now);
        }
    }

    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        match self.running_since {
            Some(since) => self.accumulated + now.saturating_duration_since(since),
            None => self.accumulated,
        }
    }

    pub fn elapsed_ms(&self, now: Instant) -> u64 {
        self.elapsed(now).as_millis() as u64
    }
}
