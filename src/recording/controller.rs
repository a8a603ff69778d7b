use chrono::Utc;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::clock::ElapsedClock;
use super::config::RecorderSettings;
use super::state::{FinalizedRecording, RecordingEvent, RecordingSession, RecordingStatus};
use crate::capture::{
    CaptureConstraints, CaptureProvider, CaptureRequest, DeviceGuard, MediaChunk, MediaKind,
};
use crate::error::RecordingError;

type FinishedSlot = Option<Result<Arc<FinalizedRecording>, RecordingError>>;

/// Owns one recording session from acquisition to finalization
///
/// Transitions are serialized by the caller. Clock ticks and explicit
/// `stop()` may race; whichever reaches `Stopped` first wins.
pub struct SessionController {
    provider: Arc<dyn CaptureProvider>,
    shared: Arc<Shared>,
}

struct Shared {
    id: String,
    settings: RecorderSettings,
    inner: Mutex<Inner>,
    events: broadcast::Sender<RecordingEvent>,
    finished: watch::Sender<FinishedSlot>,
}

#[derive(Default)]
struct Inner {
    status: RecordingStatus,
    media_kind: Option<MediaKind>,
    /// Device acquisition in flight
    acquiring: bool,
    started_at: Option<chrono::DateTime<Utc>>,
    clock: ElapsedClock,
    elapsed_ms: u64,
    chunks: Vec<MediaChunk>,
    chunk_count: usize,
    byte_count: usize,
    device: Option<DeviceGuard>,
    chunk_rx: Option<mpsc::Receiver<MediaChunk>>,
    ticker: Option<JoinHandle<()>>,
    auto_stopped: bool,
}

impl Inner {
    fn drain_chunks(&mut self) {
        let Some(rx) = self.chunk_rx.as_mut() else {
            return;
        };

        while let Ok(chunk) = rx.try_recv() {
            if chunk.data.is_empty() {
                continue;
            }
            self.chunk_count += 1;
            self.byte_count += chunk.data.len();
            self.chunks.push(chunk);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopCause {
    Requested,
    DurationLimit,
}

impl SessionController {
    pub fn new(provider: Arc<dyn CaptureProvider>, settings: RecorderSettings) -> Self {
        let (events, _) = broadcast::channel(64);
        let (finished, _) = watch::channel(None);
        let id = format!("rec_{}", uuid::Uuid::new_v4().simple());

        debug!("Created recording session {}", id);

        Self {
            provider,
            shared: Arc::new(Shared {
                id,
                settings,
                inner: Mutex::new(Inner::default()),
                events,
                finished,
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.shared.id
    }

    pub fn settings(&self) -> &RecorderSettings {
        &self.shared.settings
    }

    /// Acquire the device and begin recording
    ///
    /// On `DeviceAccessError` the session stays `Idle`. If `stop()` ran while
    /// acquisition was pending, the device is released as soon as it arrives.
    pub async fn start(
        &self,
        kind: MediaKind,
        constraints: &CaptureConstraints,
    ) -> Result<(), RecordingError> {
        self.reserve(kind)?;
        self.acquire_device(kind, constraints).await
    }

    /// Claim an idle session for a start request. The session counts as
    /// active from here on.
    pub(crate) fn reserve(&self, kind: MediaKind) -> Result<(), RecordingError> {
        let mut inner = self.shared.inner.lock();
        if inner.status != RecordingStatus::Idle || inner.acquiring {
            return Err(RecordingError::InvalidTransition {
                action: "start",
                status: inner.status.as_str(),
            });
        }
        inner.acquiring = true;
        inner.media_kind = Some(kind);
        Ok(())
    }

    /// Second half of `start`, after `reserve`
    pub(crate) async fn acquire_device(
        &self,
        kind: MediaKind,
        constraints: &CaptureConstraints,
    ) -> Result<(), RecordingError> {
        info!(
            "Starting {} recording {} via {}",
            kind,
            self.shared.id,
            self.provider.name()
        );

        let request = CaptureRequest::new(kind, constraints);
        let acquired = self.provider.acquire(&request).await;

        let mut inner = self.shared.inner.lock();
        inner.acquiring = false;

        let stream = match acquired {
            Ok(stream) => stream,
            Err(e) => {
                if inner.status == RecordingStatus::Idle {
                    inner.media_kind = None;
                }
                drop(inner);
                error!("Failed to acquire capture device: {}", e);
                self.shared.emit(RecordingEvent::Error(e.to_string()));
                return Err(e.into());
            }
        };

        let mut device = DeviceGuard::new(stream.handle, format!("{} {}", kind, self.shared.id));

        if inner.status == RecordingStatus::Stopped {
            drop(inner);
            warn!("Session {} stopped during device acquisition", self.shared.id);
            device.release();
            return Err(RecordingError::StoppedDuringStart);
        }

        let now = Instant::now();
        inner.status = RecordingStatus::Recording;
        inner.started_at = Some(Utc::now());
        inner.clock.start(now);
        inner.elapsed_ms = 0;
        inner.chunks.clear();
        inner.chunk_count = 0;
        inner.byte_count = 0;
        inner.device = Some(device);
        inner.chunk_rx = Some(stream.chunks);
        inner.ticker = Some(spawn_ticker(Arc::clone(&self.shared)));
        drop(inner);

        info!("Recording {} started", self.shared.id);
        self.shared.emit(RecordingEvent::Started { kind });

        Ok(())
    }

    /// Suspend accumulation and the clock. Ignored unless `Recording`.
    pub fn pause(&self) -> bool {
        let mut inner = self.shared.inner.lock();
        if inner.status != RecordingStatus::Recording {
            debug!("Pause ignored while {}", inner.status.as_str());
            return false;
        }

        let now = Instant::now();
        if let Some(ticker) = inner.ticker.take() {
            ticker.abort();
        }
        inner.clock.pause(now);
        inner.elapsed_ms = inner.clock.elapsed_ms(now);
        inner.drain_chunks();
        if let Some(device) = inner.device.as_mut() {
            device.pause();
        }
        inner.status = RecordingStatus::Paused;

        let elapsed_ms = inner.elapsed_ms;
        drop(inner);

        info!("Recording {} paused at {} ms", self.shared.id, elapsed_ms);
        self.shared.emit(RecordingEvent::Paused { elapsed_ms });
        true
    }

    /// Resume accumulation and restart the clock. Ignored unless `Paused`.
    pub fn resume(&self) -> bool {
        let mut inner = self.shared.inner.lock();
        if inner.status != RecordingStatus::Paused {
            debug!("Resume ignored while {}", inner.status.as_str());
            return false;
        }

        inner.clock.resume(Instant::now());
        if let Some(device) = inner.device.as_mut() {
            device.resume();
        }
        inner.status = RecordingStatus::Recording;
        inner.ticker = Some(spawn_ticker(Arc::clone(&self.shared)));

        let elapsed_ms = inner.elapsed_ms;
        drop(inner);

        info!("Recording {} resumed at {} ms", self.shared.id, elapsed_ms);
        self.shared.emit(RecordingEvent::Resumed { elapsed_ms });
        true
    }

    /// Finalize the session
    ///
    /// Returns the finalized recording to the first caller that reaches
    /// `Stopped`; every later call gets `Ok(None)`. The device is released
    /// even when finalization fails.
    pub fn stop(&self) -> Result<Option<Arc<FinalizedRecording>>, RecordingError> {
        self.shared.finish(StopCause::Requested)
    }

    pub fn status(&self) -> RecordingStatus {
        self.shared.inner.lock().status
    }

    /// True from the start request until the session is stopped
    pub fn is_active(&self) -> bool {
        let inner = self.shared.inner.lock();
        if inner.status == RecordingStatus::Stopped {
            return false;
        }
        inner.acquiring
            || matches!(
                inner.status,
                RecordingStatus::Recording | RecordingStatus::Paused
            )
    }

    pub fn snapshot(&self) -> RecordingSession {
        let inner = self.shared.inner.lock();
        RecordingSession {
            id: self.shared.id.clone(),
            status: inner.status,
            media_kind: inner.media_kind,
            started_at: inner.started_at,
            elapsed_ms: inner.elapsed_ms,
            chunk_count: inner.chunk_count,
            byte_count: inner.byte_count,
            max_duration_ms: self.shared.settings.max_duration_ms(),
            auto_stopped: inner.auto_stopped,
        }
    }

    /// Subscribe to change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<RecordingEvent> {
        self.shared.events.subscribe()
    }

    /// Resolves once the session has been finalized, whoever stopped it
    pub async fn finished(&self) -> Result<Arc<FinalizedRecording>, RecordingError> {
        let mut rx = self.shared.finished.subscribe();
        loop {
            if let Some(outcome) = rx.borrow_and_update().as_ref() {
                return outcome.clone();
            }
            if rx.changed().await.is_err() {
                return Err(RecordingError::Finalize(
                    "session dropped before finalization".to_string(),
                ));
            }
        }
    }
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("id", &self.shared.id)
            .field("status", &self.status())
            .finish()
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        let mut inner = self.shared.inner.lock();
        if let Some(ticker) = inner.ticker.take() {
            ticker.abort();
        }
        if let Some(mut device) = inner.device.take() {
            warn!("Recording {} dropped while active", self.shared.id);
            device.release();
        }
    }
}

enum Tick {
    Continue(u64),
    Halt,
}

impl Shared {
    fn emit(&self, event: RecordingEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn tick(&self, now: Instant) -> Tick {
        let mut inner = self.inner.lock();
        if inner.status != RecordingStatus::Recording {
            return Tick::Halt;
        }

        inner.elapsed_ms = inner.clock.elapsed_ms(now);
        inner.drain_chunks();

        if inner.elapsed_ms >= self.settings.max_duration_ms() {
            info!(
                "Recording {} reached limit of {} ms",
                self.id,
                self.settings.max_duration_ms()
            );
            drop(inner);
            if let Err(e) = self.finish(StopCause::DurationLimit) {
                error!("Auto-stop failed to finalize: {}", e);
            }
            return Tick::Halt;
        }

        Tick::Continue(inner.elapsed_ms)
    }

    fn finish(
        &self,
        cause: StopCause,
    ) -> Result<Option<Arc<FinalizedRecording>>, RecordingError> {
        let mut inner = self.inner.lock();

        match inner.status {
            RecordingStatus::Stopped => {
                debug!("Stop ignored, {} already stopped", self.id);
                return Ok(None);
            }
            RecordingStatus::Idle if !inner.acquiring => {
                debug!("Stop ignored, {} never started", self.id);
                return Ok(None);
            }
            _ => {}
        }

        let now = Instant::now();
        inner.clock.pause(now);
        inner.elapsed_ms = inner.clock.elapsed_ms(now);

        if let Some(ticker) = inner.ticker.take() {
            // The ticker finishes on its own when it drives the stop
            if cause == StopCause::Requested {
                ticker.abort();
            }
        }

        if let Some(mut device) = inner.device.take() {
            device.release();
        }
        inner.drain_chunks();
        inner.chunk_rx = None;

        inner.status = RecordingStatus::Stopped;
        inner.auto_stopped = cause == StopCause::DurationLimit;

        let kind = inner.media_kind.unwrap_or(MediaKind::Audio);
        let chunks = std::mem::take(&mut inner.chunks);
        let finished_at = Utc::now();
        let started_at = inner.started_at.unwrap_or(finished_at);
        let duration_ms = inner.elapsed_ms;
        let auto_stopped = inner.auto_stopped;
        drop(inner);

        let outcome = assemble(kind, &chunks).map(|data| {
            Arc::new(FinalizedRecording {
                id: self.id.clone(),
                media_kind: kind,
                mime_type: kind.mime_type().to_string(),
                data,
                duration_ms,
                chunk_count: chunks.len(),
                started_at,
                finished_at,
                auto_stopped,
            })
        });

        match &outcome {
            Ok(recording) => {
                info!(
                    "Recording {} stopped: {} ms, {} chunks, {} bytes",
                    self.id,
                    recording.duration_ms,
                    recording.chunk_count,
                    recording.size_bytes()
                );
                self.emit(RecordingEvent::Stopped {
                    duration_ms,
                    auto_stopped,
                });
            }
            Err(e) => {
                error!("Recording {} failed to finalize: {}", self.id, e);
                self.emit(RecordingEvent::Error(e.to_string()));
            }
        }

        self.finished.send_replace(Some(outcome.clone()));
        outcome.map(Some)
    }
}

/// Concatenate chunks in delivery order into one media object
fn assemble(kind: MediaKind, chunks: &[MediaChunk]) -> Result<Vec<u8>, RecordingError> {
    let mut ordered: Vec<&MediaChunk> = chunks.iter().collect();
    ordered.sort_by_key(|chunk| chunk.sequence);

    let mut data = Vec::with_capacity(ordered.iter().map(|c| c.data.len()).sum());
    for chunk in ordered {
        let container = chunk.mime_type.split(';').next().unwrap_or_default().trim();
        if container != kind.mime_type() {
            return Err(RecordingError::Finalize(format!(
                "chunk {} is {}, expected {}",
                chunk.sequence,
                chunk.mime_type,
                kind.mime_type()
            )));
        }
        data.extend_from_slice(&chunk.data);
    }

    Ok(data)
}

fn spawn_ticker(shared: Arc<Shared>) -> JoinHandle<()> {
    let period = shared.settings.tick_interval;

    tokio::spawn(async move {
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            match shared.tick(Instant::now()) {
                Tick::Continue(elapsed_ms) => {
                    shared.emit(RecordingEvent::Progress { elapsed_ms });
                }
                Tick::Halt => break,
            }
        }
    })
}
