use tracing::{info, warn};

use super::backend::CaptureHandle;

/// Exclusive owner of an acquired capture handle
///
/// The handle is released exactly once: explicitly through [`release`]
/// or, if the owner is dropped on an abnormal path, in `Drop`.
///
/// [`release`]: DeviceGuard::release
pub struct DeviceGuard {
    handle: Option<Box<dyn CaptureHandle>>,
    label: String,
}

impl DeviceGuard {
    pub fn new(handle: Box<dyn CaptureHandle>, label: impl Into<String>) -> Self {
        Self {
            handle: Some(handle),
            label: label.into(),
        }
    }

    pub fn pause(&mut self) {
        if let Some(handle) = &mut self.handle {
            handle.pause();
        }
    }

    pub fn resume(&mut self) {
        if let Some(handle) = &mut self.handle {
            handle.resume();
        }
    }

    /// Release the device. Returns false if it was already released.
    pub fn release(&mut self) -> bool {
        match self.handle.take() {
            Some(mut handle) => {
                handle.release();
                info!("Capture device released ({})", self.label);
                true
            }
            None => false,
        }
    }

    pub fn is_held(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for DeviceGuard {
    fn drop(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            warn!("Capture device released on drop ({})", self.label);
            handle.release();
        }
    }
}
