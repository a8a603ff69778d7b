//! Local persistence
//!
//! A synchronous key-value surface ([`KeyValueStore`]) and the typed,
//! schema-versioned adapter on top of it ([`Persistence`]).

mod persistence;
mod preferences;
mod store;

pub use persistence::{Persistence, StorageKey, DEFAULT_OFFLINE_CARD_LIMIT, SCHEMA_VERSION};
pub use preferences::{Preferences, PreferencesPatch};
pub use store::{FileStore, KeyValueStore, MemoryStore};
