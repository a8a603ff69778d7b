//! Application context
//!
//! Built once at startup and handed to every component that needs
//! persistence, devices or delivery channels.

use anyhow::{Context as _, Result};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::alert::{
    AlertReceipt, AlertSender, ContactBook, Coordinates, EmergencyAlertFlow, LocationProvider,
    LogAlertSender, NatsAlertSender, StaticLocation,
};
use crate::capture::{CaptureProvider, MediaKind, SyntheticCapture};
use crate::config::Config;
use crate::error::{AlertError, RecordingError, SelectError, StorageError};
use crate::nats::NatsClient;
use crate::recording::{
    EncounterRecord, FinalizedRecording, Recorder, RecordingArchive, SessionController,
};
use crate::rights::{
    ChatCompletionGenerator, ChatCompletionSettings, ContentSelector, Language, RightsCard,
};
use crate::share::ShareLinks;
use crate::storage::{FileStore, KeyValueStore, Persistence};

pub struct AppContext {
    pub persistence: Persistence,
    pub contacts: ContactBook,
    pub selector: ContentSelector,
    pub alerts: EmergencyAlertFlow,
    pub recorder: Recorder,
    pub archive: RecordingArchive,
    pub share_base_url: String,
    current_card: RwLock<Option<RightsCard>>,
    archived: watch::Sender<Option<ArchivedSession>>,
}

/// Archive outcome of the most recently finished session
#[derive(Debug, Clone)]
struct ArchivedSession {
    session_id: String,
    record: Option<EncounterRecord>,
}

/// Collaborators injected into the context
pub struct Collaborators {
    pub store: Arc<dyn KeyValueStore>,
    pub capture: Arc<dyn CaptureProvider>,
    pub location: Arc<dyn LocationProvider>,
    pub sender: Arc<dyn AlertSender>,
    pub selector: ContentSelector,
}

impl AppContext {
    /// Wire the production collaborators described by the config
    pub async fn from_config(config: &Config) -> Result<Self> {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&config.storage.path));

        let capture: Arc<dyn CaptureProvider> =
            Arc::new(SyntheticCapture::new(config.recording.chunk_interval()));

        let position = match (config.alerts.latitude, config.alerts.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        };
        let location: Arc<dyn LocationProvider> = Arc::new(StaticLocation::new(position));

        let sender: Arc<dyn AlertSender> = match &config.alerts.nats_url {
            Some(url) => {
                let client = NatsClient::connect(url)
                    .await
                    .context("Failed to connect alert channel")?;
                Arc::new(NatsAlertSender::new(Arc::new(client)))
            }
            None => {
                info!("No NATS URL configured, alerts will be logged");
                Arc::new(LogAlertSender)
            }
        };

        let selector = if config.content.enabled {
            let api_key = std::env::var(&config.content.api_key_env).ok();
            if api_key.is_none() {
                warn!(
                    "{} is not set, content requests go out unauthenticated",
                    config.content.api_key_env
                );
            }
            let generator = ChatCompletionGenerator::new(ChatCompletionSettings {
                endpoint: config.content.endpoint.clone(),
                model: config.content.model.clone(),
                api_key,
                timeout: config.content.timeout(),
            })
            .context("Failed to build content generator")?;
            ContentSelector::with_generator(Arc::new(generator), config.content.timeout())
        } else {
            ContentSelector::bundled()
        };

        Ok(Self::new(
            config,
            Collaborators {
                store,
                capture,
                location,
                sender,
                selector,
            },
        ))
    }

    pub fn new(config: &Config, collaborators: Collaborators) -> Self {
        let persistence = Persistence::new(collaborators.store)
            .with_offline_card_limit(config.storage.offline_card_limit);
        let contacts = ContactBook::load(persistence.clone(), config.alerts.max_contacts);

        Self {
            contacts,
            selector: collaborators.selector,
            alerts: EmergencyAlertFlow::new(
                collaborators.location,
                collaborators.sender,
                config.alerts.location_timeout(),
            ),
            recorder: Recorder::new(
                collaborators.capture,
                config.recording.recorder_settings(),
            ),
            archive: RecordingArchive::new(&config.recording.recordings_path),
            share_base_url: config.share.base_url.clone(),
            current_card: RwLock::new(None),
            archived: watch::channel(None).0,
            persistence,
        }
    }

    /// Select a region, persist the choice and keep the card as current
    pub async fn select_region(
        &self,
        code: &str,
        language: Option<Language>,
    ) -> Result<RightsCard, SelectError> {
        let language = language.unwrap_or_else(|| self.persistence.preferences().language);
        let card = self.selector.select(code, language).await?;

        if let Err(e) = self.persistence.set_selected_region(&card.state) {
            warn!("Failed to persist selected region: {}", e);
        }
        *self.current_card.write() = Some(card.clone());
        Ok(card)
    }

    /// Rebuild the card for the stored region, if any
    pub async fn restore_selection(&self) -> Option<RightsCard> {
        let code = self.persistence.selected_region()?;
        match self.select_region(&code, None).await {
            Ok(card) => Some(card),
            Err(e) => {
                warn!("Ignoring stored region: {}", e);
                None
            }
        }
    }

    pub fn current_card(&self) -> Option<RightsCard> {
        self.current_card.read().clone()
    }

    /// Find a card by id among the current card and the offline cache
    pub fn find_card(&self, card_id: &str) -> Option<RightsCard> {
        if let Some(card) = self.current_card().filter(|c| c.card_id == card_id) {
            return Some(card);
        }
        self.persistence
            .offline_cards()
            .into_iter()
            .find(|c| c.card_id == card_id)
    }

    pub fn share_links(&self, card_id: &str) -> Option<ShareLinks> {
        self.find_card(card_id)
            .map(|card| ShareLinks::for_card(&card, &self.share_base_url))
    }

    pub fn save_current_card_offline(&self) -> Result<Option<Vec<RightsCard>>, StorageError> {
        match self.current_card() {
            Some(card) => self.persistence.save_offline_card(&card).map(Some),
            None => Ok(None),
        }
    }

    pub async fn send_alert(&self) -> Result<AlertReceipt, AlertError> {
        let contacts = self.contacts.list();
        let language = self.persistence.preferences().language;
        self.alerts.send_alert(&contacts, language).await
    }

    /// Start a recording session
    ///
    /// The media is archived as soon as the session finishes, whether it was
    /// stopped on request or by the duration limit.
    pub async fn start_recording(
        self: &Arc<Self>,
        kind: MediaKind,
    ) -> Result<Arc<SessionController>, RecordingError> {
        let session = self.recorder.begin(kind).await?;

        let ctx = Arc::clone(self);
        let watched = Arc::clone(&session);
        tokio::spawn(async move { ctx.archive_when_finished(watched).await });

        Ok(session)
    }

    async fn archive_when_finished(&self, session: Arc<SessionController>) {
        let session_id = session.id().to_string();
        let record = match session.finished().await {
            Ok(recording) => match self.archive_recording(&recording).await {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Failed to archive recording {}: {}", session_id, e);
                    None
                }
            },
            Err(e) => {
                warn!("Recording {} finished without media: {}", session_id, e);
                None
            }
        };

        self.archived.send_replace(Some(ArchivedSession { session_id, record }));
    }

    /// Archive record of a session started with `start_recording`. Waits
    /// until the archiving step for that session has run.
    pub async fn archived_record(&self, session_id: &str) -> Option<EncounterRecord> {
        let mut rx = self.archived.subscribe();
        loop {
            if let Some(archived) = rx
                .borrow_and_update()
                .as_ref()
                .filter(|a| a.session_id == session_id)
            {
                return archived.record.clone();
            }
            if rx.changed().await.is_err() {
                return None;
            }
        }
    }

    /// Archive a finished recording, attaching the position if allowed
    pub async fn archive_recording(
        &self,
        recording: &FinalizedRecording,
    ) -> Result<EncounterRecord, StorageError> {
        let location = if self.persistence.preferences().share_location {
            self.alerts.locate().await.ok()
        } else {
            None
        };
        self.archive.save(recording, location).await
    }
}
