pub mod alert;
pub mod capture;
pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod nats;
pub mod recording;
pub mod rights;
pub mod share;
pub mod storage;

pub use alert::{AlertReceipt, ContactBook, EmergencyAlertFlow, EmergencyContact};
pub use capture::{CaptureProvider, MediaKind, SyntheticCapture};
pub use config::Config;
pub use context::{AppContext, Collaborators};
pub use http::{create_router, AppState};
pub use nats::{AlertDeliveryMessage, NatsClient};
pub use recording::{
    ElapsedClock, FinalizedRecording, Recorder, RecordingSession, RecordingStatus,
    SessionController,
};
pub use rights::{ContentSelector, Language, RightsCard, StateInfo};
pub use share::{ShareFlow, ShareLinks};
pub use storage::{FileStore, KeyValueStore, MemoryStore, Persistence};
