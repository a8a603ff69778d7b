use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

use crate::alert::DEFAULT_MAX_CONTACTS;
use crate::capture::{AudioConstraints, CaptureConstraints, VideoConstraints};
use crate::recording::RecorderSettings;
use crate::share::DEFAULT_SHARE_BASE_URL;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub recording: RecordingConfig,
    pub storage: StorageConfig,
    pub alerts: AlertsConfig,
    pub content: ContentConfig,
    pub share: ShareConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "kyr-cards".to_string(),
            http: HttpConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    pub max_duration_ms: u64,
    pub tick_ms: u64,
    /// How often the device delivers a chunk
    pub chunk_interval_ms: u64,
    pub recordings_path: String,
    pub audio: AudioConstraints,
    pub video: VideoConstraints,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            max_duration_ms: 300_000, // 5 minutes
            tick_ms: 100,
            chunk_interval_ms: 1000,
            recordings_path: "data/recordings".to_string(),
            audio: AudioConstraints::default(),
            video: VideoConstraints::default(),
        }
    }
}

impl RecordingConfig {
    pub fn recorder_settings(&self) -> RecorderSettings {
        RecorderSettings {
            max_duration: Duration::from_millis(self.max_duration_ms),
            tick_interval: Duration::from_millis(self.tick_ms.max(1)),
            constraints: CaptureConstraints {
                audio: self.audio.clone(),
                video: self.video.clone(),
            },
        }
    }

    pub fn chunk_interval(&self) -> Duration {
        Duration::from_millis(self.chunk_interval_ms.max(1))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file backing the local key-value store
    pub path: String,
    pub offline_card_limit: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "data/store.json".to_string(),
            offline_card_limit: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    pub max_contacts: usize,
    pub location_timeout_ms: u64,
    /// Publish alerts to NATS when set, otherwise log them
    pub nats_url: Option<String>,
    /// Fixed position reported by the service (no GPS on a server)
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            max_contacts: DEFAULT_MAX_CONTACTS,
            location_timeout_ms: 5000,
            nats_url: None,
            latitude: None,
            longitude: None,
        }
    }
}

impl AlertsConfig {
    pub fn location_timeout(&self) -> Duration {
        Duration::from_millis(self.location_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub timeout_ms: u64,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "https://openrouter.ai/api/v1".to_string(),
            model: "google/gemini-2.0-flash-001".to_string(),
            api_key_env: "OPENROUTER_API_KEY".to_string(),
            timeout_ms: 30_000,
        }
    }
}

impl ContentConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    pub base_url: String,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SHARE_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Load from a config file (extension optional) plus `KYR__*` overrides
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("KYR").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(contents, config::FileFormat::Toml))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
