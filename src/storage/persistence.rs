use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use super::preferences::Preferences;
use super::store::KeyValueStore;
use crate::alert::EmergencyContact;
use crate::error::{PersistenceReadError, StorageError};
use crate::rights::RightsCard;

/// Version stamped into every stored value
pub const SCHEMA_VERSION: u32 = 1;

/// Cached cards kept for offline use
pub const DEFAULT_OFFLINE_CARD_LIMIT: usize = 10;

/// The four logical keys of the local store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    SelectedRegion,
    EmergencyContacts,
    OfflineCards,
    Preferences,
}

impl StorageKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::SelectedRegion => "kyr_selected_state",
            StorageKey::EmergencyContacts => "kyr_emergency_contacts",
            StorageKey::OfflineCards => "kyr_offline_cards",
            StorageKey::Preferences => "kyr_user_preferences",
        }
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    schema_version: u32,
    data: &'a T,
}

#[derive(Deserialize)]
struct Envelope {
    schema_version: u32,
    data: Value,
}

/// Typed access to the local key-value store
///
/// Values are wrapped as `{"schema_version": 1, "data": ...}`. Anything
/// unreadable (bad JSON, wrong shape, unknown version) reads as absent.
#[derive(Clone)]
pub struct Persistence {
    store: Arc<dyn KeyValueStore>,
    offline_card_limit: usize,
}

impl Persistence {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            offline_card_limit: DEFAULT_OFFLINE_CARD_LIMIT,
        }
    }

    pub fn with_offline_card_limit(mut self, limit: usize) -> Self {
        self.offline_card_limit = limit.max(1);
        self
    }

    pub fn read<T: DeserializeOwned>(&self, key: StorageKey) -> Option<T> {
        match self.try_read(key) {
            Ok(value) => value,
            Err(e) => {
                warn!("Treating stored value as absent: {}", e);
                None
            }
        }
    }

    fn try_read<T: DeserializeOwned>(
        &self,
        key: StorageKey,
    ) -> Result<Option<T>, PersistenceReadError> {
        let Some(raw) = self.store.get(key.as_str()) else {
            return Ok(None);
        };

        let corrupt = |source| PersistenceReadError::Corrupt {
            key: key.as_str(),
            source,
        };

        let envelope: Envelope = serde_json::from_str(&raw).map_err(corrupt)?;
        if envelope.schema_version != SCHEMA_VERSION {
            return Err(PersistenceReadError::UnsupportedVersion {
                key: key.as_str(),
                found: envelope.schema_version,
            });
        }

        serde_json::from_value(envelope.data)
            .map(Some)
            .map_err(corrupt)
    }

    pub fn write<T: Serialize>(&self, key: StorageKey, value: &T) -> Result<(), StorageError> {
        let payload = serde_json::to_string(&EnvelopeRef {
            schema_version: SCHEMA_VERSION,
            data: value,
        })?;
        self.store.set(key.as_str(), &payload)?;
        debug!("Persisted {}", key.as_str());
        Ok(())
    }

    pub fn clear(&self, key: StorageKey) -> Result<(), StorageError> {
        self.store.remove(key.as_str())
    }

    pub fn selected_region(&self) -> Option<String> {
        self.read(StorageKey::SelectedRegion)
    }

    pub fn set_selected_region(&self, code: &str) -> Result<(), StorageError> {
        self.write(StorageKey::SelectedRegion, &code)
    }

    pub fn contacts(&self) -> Vec<EmergencyContact> {
        self.read(StorageKey::EmergencyContacts).unwrap_or_default()
    }

    pub fn set_contacts(&self, contacts: &[EmergencyContact]) -> Result<(), StorageError> {
        self.write(StorageKey::EmergencyContacts, &contacts)
    }

    pub fn offline_cards(&self) -> Vec<RightsCard> {
        self.read(StorageKey::OfflineCards).unwrap_or_default()
    }

    /// Cache a card, most recent first. A card with the same id is replaced.
    pub fn save_offline_card(&self, card: &RightsCard) -> Result<Vec<RightsCard>, StorageError> {
        let mut cards = self.offline_cards();
        cards.retain(|cached| cached.card_id != card.card_id);
        cards.insert(0, card.clone());
        cards.truncate(self.offline_card_limit);

        self.write(StorageKey::OfflineCards, &cards)?;
        Ok(cards)
    }

    pub fn preferences(&self) -> Preferences {
        self.read(StorageKey::Preferences).unwrap_or_default()
    }

    pub fn set_preferences(&self, preferences: &Preferences) -> Result<(), StorageError> {
        self.write(StorageKey::Preferences, preferences)
    }
}
