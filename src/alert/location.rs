use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::LocationUnavailableError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// Current-position lookup
#[async_trait::async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<Coordinates, LocationUnavailableError>;
}

/// Fixed position, or none at all
#[derive(Debug, Clone, Default)]
pub struct StaticLocation {
    position: Option<Coordinates>,
}

impl StaticLocation {
    pub fn new(position: Option<Coordinates>) -> Self {
        Self { position }
    }

    pub fn unavailable() -> Self {
        Self { position: None }
    }
}

#[async_trait::async_trait]
impl LocationProvider for StaticLocation {
    async fn current_position(&self) -> Result<Coordinates, LocationUnavailableError> {
        self.position
            .ok_or_else(|| LocationUnavailableError::new("no position fix"))
    }
}
