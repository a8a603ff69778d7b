use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, warn};

use super::config::RecorderSettings;
use super::controller::SessionController;
use crate::capture::{CaptureProvider, MediaKind};
use crate::error::RecordingError;

/// Process-wide recording slot
///
/// Holds at most one active session. A stopped session stays readable until
/// the next `begin`.
pub struct Recorder {
    provider: Arc<dyn CaptureProvider>,
    settings: RecorderSettings,
    current: Mutex<Option<Arc<SessionController>>>,
}

impl Recorder {
    pub fn new(provider: Arc<dyn CaptureProvider>, settings: RecorderSettings) -> Self {
        Self {
            provider,
            settings,
            current: Mutex::new(None),
        }
    }

    pub fn settings(&self) -> &RecorderSettings {
        &self.settings
    }

    /// Construct a fresh session and start it
    pub async fn begin(&self, kind: MediaKind) -> Result<Arc<SessionController>, RecordingError> {
        let controller = {
            let mut current = self.current.lock();
            if let Some(existing) = current.as_ref() {
                if existing.is_active() {
                    warn!("Recording {} is still active", existing.id());
                    return Err(RecordingError::SessionActive);
                }
            }

            let controller = Arc::new(SessionController::new(
                Arc::clone(&self.provider),
                self.settings.clone(),
            ));
            // Active before the slot lock is released
            controller.reserve(kind)?;
            *current = Some(Arc::clone(&controller));
            controller
        };

        if let Err(e) = controller
            .acquire_device(kind, &self.settings.constraints)
            .await
        {
            let mut current = self.current.lock();
            let is_same = current
                .as_ref()
                .map(|c| Arc::ptr_eq(c, &controller))
                .unwrap_or(false);
            if is_same && !controller.is_active() {
                *current = None;
            }
            return Err(e);
        }

        info!("Recorder slot now holds {}", controller.id());
        Ok(controller)
    }

    pub fn current(&self) -> Option<Arc<SessionController>> {
        self.current.lock().clone()
    }
}
