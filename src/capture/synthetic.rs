use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use super::backend::{CaptureHandle, CaptureProvider, CaptureRequest, CaptureStream, MediaChunk};
use crate::error::DeviceAccessError;

/// Counters shared between a provider and every handle it hands out
#[derive(Debug, Default)]
pub struct SyntheticStats {
    acquisitions: AtomicUsize,
    releases: AtomicUsize,
    chunks_emitted: AtomicU64,
}

impl SyntheticStats {
    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }

    /// Raw `release()` calls observed on handles
    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    pub fn chunks_emitted(&self) -> u64 {
        self.chunks_emitted.load(Ordering::SeqCst)
    }
}

/// In-process capture device
///
/// Emits a fixed-size chunk every `chunk_interval` while active, a trailing
/// chunk on release, and nothing while paused.
pub struct SyntheticCapture {
    chunk_interval: Duration,
    chunk_bytes: usize,
    acquire_delay: Option<Duration>,
    deny: Option<DeviceAccessError>,
    mime_override: Option<String>,
    stats: Arc<SyntheticStats>,
}

impl SyntheticCapture {
    pub fn new(chunk_interval: Duration) -> Self {
        Self {
            chunk_interval,
            chunk_bytes: 4096,
            acquire_delay: None,
            deny: None,
            mime_override: None,
            stats: Arc::new(SyntheticStats::default()),
        }
    }

    pub fn with_chunk_bytes(mut self, chunk_bytes: usize) -> Self {
        self.chunk_bytes = chunk_bytes;
        self
    }

    /// Simulate a slow permission prompt
    pub fn with_acquire_delay(mut self, delay: Duration) -> Self {
        self.acquire_delay = Some(delay);
        self
    }

    /// Fail every acquisition with the given error
    pub fn denying(mut self, error: DeviceAccessError) -> Self {
        self.deny = Some(error);
        self
    }

    /// Tag chunks with a container type other than the requested kind's
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_override = Some(mime_type.into());
        self
    }

    pub fn stats(&self) -> Arc<SyntheticStats> {
        Arc::clone(&self.stats)
    }
}

impl Default for SyntheticCapture {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[async_trait::async_trait]
impl CaptureProvider for SyntheticCapture {
    async fn acquire(&self, request: &CaptureRequest) -> Result<CaptureStream, DeviceAccessError> {
        if let Some(delay) = self.acquire_delay {
            time::sleep(delay).await;
        }

        if let Some(error) = &self.deny {
            info!("Synthetic capture denied: {}", error);
            return Err(error.clone());
        }

        self.stats.acquisitions.fetch_add(1, Ordering::SeqCst);

        let mime_type = self
            .mime_override
            .clone()
            .unwrap_or_else(|| request.kind.mime_type().to_string());

        let device = Arc::new(DeviceState {
            paused: AtomicBool::new(false),
            released: AtomicBool::new(false),
            sequence: AtomicU64::new(0),
            started_at: Instant::now(),
        });

        let (tx, rx) = mpsc::channel(64);

        let emitter = Emitter {
            device: Arc::clone(&device),
            stats: Arc::clone(&self.stats),
            tx: tx.clone(),
            chunk_bytes: self.chunk_bytes,
            mime_type: mime_type.clone(),
        };

        let period = self.chunk_interval;
        tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if emitter.device.released.load(Ordering::SeqCst) {
                    break;
                }
                if emitter.device.paused.load(Ordering::SeqCst) {
                    continue;
                }
                if !emitter.emit(emitter.chunk_bytes).await {
                    break;
                }
            }
            debug!("Synthetic emitter stopped");
        });

        info!(
            "Synthetic {} capture acquired (video: {:?})",
            request.kind, request.video
        );

        Ok(CaptureStream {
            handle: Box::new(SyntheticHandle {
                device,
                stats: Arc::clone(&self.stats),
                tx,
                trailing_bytes: (self.chunk_bytes / 2).max(1),
                mime_type,
            }),
            chunks: rx,
        })
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}

struct DeviceState {
    paused: AtomicBool,
    released: AtomicBool,
    sequence: AtomicU64,
    started_at: Instant,
}

impl DeviceState {
    fn next_chunk(&self, bytes: usize, mime_type: &str) -> MediaChunk {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        MediaChunk {
            sequence,
            data: vec![(sequence % 251) as u8; bytes],
            mime_type: mime_type.to_string(),
            captured_at_ms: self.started_at.elapsed().as_millis() as u64,
        }
    }
}

struct Emitter {
    device: Arc<DeviceState>,
    stats: Arc<SyntheticStats>,
    tx: mpsc::Sender<MediaChunk>,
    chunk_bytes: usize,
    mime_type: String,
}

impl Emitter {
    async fn emit(&self, bytes: usize) -> bool {
        let chunk = self.device.next_chunk(bytes, &self.mime_type);
        if self.tx.send(chunk).await.is_err() {
            return false;
        }
        self.stats.chunks_emitted.fetch_add(1, Ordering::SeqCst);
        true
    }
}

struct SyntheticHandle {
    device: Arc<DeviceState>,
    stats: Arc<SyntheticStats>,
    tx: mpsc::Sender<MediaChunk>,
    trailing_bytes: usize,
    mime_type: String,
}

impl CaptureHandle for SyntheticHandle {
    fn pause(&mut self) {
        self.device.paused.store(true, Ordering::SeqCst);
    }

    fn resume(&mut self) {
        self.device.paused.store(false, Ordering::SeqCst);
    }

    fn release(&mut self) {
        self.stats.releases.fetch_add(1, Ordering::SeqCst);

        if self.device.released.swap(true, Ordering::SeqCst) {
            return;
        }

        // Flush whatever the encoder buffered since the last chunk
        let chunk = self.device.next_chunk(self.trailing_bytes, &self.mime_type);
        if self.tx.try_send(chunk).is_ok() {
            self.stats.chunks_emitted.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn is_active(&self) -> bool {
        !self.device.released.load(Ordering::SeqCst)
    }
}
