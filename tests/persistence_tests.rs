// Integration tests for local persistence
//
// These tests verify the schema-versioned envelope, that unreadable data
// reads as absent, and that the file-backed store survives a reopen.

use anyhow::Result;
use kyr_cards::alert::{ContactBook, EmergencyContact};
use kyr_cards::capture::MediaKind;
use kyr_cards::rights::{default_content, find_state, Language, RightsCard};
use kyr_cards::storage::{
    FileStore, KeyValueStore, MemoryStore, Persistence, Preferences, StorageKey, SCHEMA_VERSION,
};
use std::sync::Arc;
use tempfile::TempDir;

fn memory() -> (Arc<MemoryStore>, Persistence) {
    let store = Arc::new(MemoryStore::new());
    let persistence = Persistence::new(store.clone());
    (store, persistence)
}

fn card(code: &str) -> RightsCard {
    let state = find_state(code).unwrap();
    RightsCard::new(state, Language::En, default_content(state, Language::En))
}

#[test]
fn test_values_are_wrapped_in_versioned_envelope() -> Result<()> {
    let (store, persistence) = memory();
    persistence.set_selected_region("CA")?;

    let raw = store.get("kyr_selected_state").unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    assert_eq!(value["schema_version"], SCHEMA_VERSION);
    assert_eq!(value["data"], "CA");

    assert_eq!(persistence.selected_region().as_deref(), Some("CA"));
    Ok(())
}

#[test]
fn test_corrupt_value_reads_as_absent() -> Result<()> {
    let (store, persistence) = memory();
    store.set("kyr_emergency_contacts", "{not json")?;
    store.set("kyr_selected_state", "\"CA\"")?;

    assert!(persistence.contacts().is_empty());
    assert_eq!(persistence.selected_region(), None);
    Ok(())
}

#[test]
fn test_wrong_shape_reads_as_absent() -> Result<()> {
    let (store, persistence) = memory();
    store.set(
        "kyr_emergency_contacts",
        r#"{"schema_version": 1, "data": {"name": "Alex"}}"#,
    )?;

    assert!(persistence.contacts().is_empty());
    Ok(())
}

#[test]
fn test_unknown_schema_version_reads_as_absent() -> Result<()> {
    let (store, persistence) = memory();
    store.set(
        "kyr_selected_state",
        r#"{"schema_version": 99, "data": "CA"}"#,
    )?;

    assert_eq!(persistence.selected_region(), None);
    Ok(())
}

#[test]
fn test_preferences_default_when_absent() {
    let (_, persistence) = memory();
    let prefs = persistence.preferences();

    assert_eq!(prefs, Preferences::default());
    assert_eq!(prefs.preferred_media_kind, MediaKind::Audio);
}

#[test]
fn test_clear_removes_value() -> Result<()> {
    let (_, persistence) = memory();
    persistence.set_selected_region("NY")?;
    persistence.clear(StorageKey::SelectedRegion)?;

    assert_eq!(persistence.selected_region(), None);
    Ok(())
}

#[test]
fn test_offline_cards_newest_first_and_bounded() -> Result<()> {
    let (_, persistence) = memory();
    let persistence = persistence.with_offline_card_limit(2);

    persistence.save_offline_card(&card("CA"))?;
    persistence.save_offline_card(&card("TX"))?;
    persistence.save_offline_card(&card("CA"))?;
    let cards = persistence.save_offline_card(&card("NY"))?;

    let codes: Vec<_> = cards.iter().map(|c| c.state.as_str()).collect();
    assert_eq!(codes, vec!["NY", "CA"]);
    assert_eq!(persistence.offline_cards().len(), 2);
    Ok(())
}

#[test]
fn test_file_store_survives_reopen() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("nested").join("store.json");

    {
        let persistence = Persistence::new(Arc::new(FileStore::open(&path)));
        persistence.set_selected_region("WA")?;
        persistence.set_preferences(&Preferences {
            language: Language::Es,
            preferred_media_kind: MediaKind::Video,
            share_location: false,
        })?;
    }

    assert!(path.exists());

    let reopened = Persistence::new(Arc::new(FileStore::open(&path)));
    assert_eq!(reopened.selected_region().as_deref(), Some("WA"));
    assert_eq!(reopened.preferences().language, Language::Es);
    assert_eq!(reopened.preferences().preferred_media_kind, MediaKind::Video);
    assert!(!reopened.preferences().share_location);
    Ok(())
}

#[test]
fn test_file_store_ignores_unreadable_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("store.json");
    std::fs::write(&path, "garbage")?;

    let store = FileStore::open(&path);
    assert_eq!(store.get("kyr_selected_state"), None);

    // Writes still go through and replace the file
    store.set("kyr_selected_state", "x")?;
    let reopened = FileStore::open(&path);
    assert_eq!(reopened.get("kyr_selected_state").as_deref(), Some("x"));
    Ok(())
}

#[test]
fn test_failed_write_keeps_previous_value() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("store.json");

    let store = FileStore::open(&path);
    store.set("kyr_selected_state", "CA")?;

    // A regular file where the store directory should be
    let blocker = temp_dir.path().join("blocked");
    std::fs::write(&blocker, "not a directory")?;
    let unwritable = FileStore::open(blocker.join("store.json"));

    assert!(unwritable.set("kyr_selected_state", "TX").is_err());
    assert_eq!(unwritable.get("kyr_selected_state"), None);

    // Make the existing store's target a directory so the rename fails
    std::fs::remove_file(&path)?;
    std::fs::create_dir(&path)?;
    std::fs::write(path.join("occupied"), "x")?;

    assert!(store.set("kyr_selected_state", "TX").is_err());
    assert_eq!(store.get("kyr_selected_state").as_deref(), Some("CA"));
    assert!(store.remove("kyr_selected_state").is_err());
    assert_eq!(store.get("kyr_selected_state").as_deref(), Some("CA"));
    Ok(())
}

#[test]
fn test_rejected_contact_is_not_listed_after_failed_write() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let blocker = temp_dir.path().join("blocked");
    std::fs::write(&blocker, "not a directory")?;

    let persistence = Persistence::new(Arc::new(FileStore::open(blocker.join("store.json"))));
    let book = ContactBook::load(persistence.clone(), 5);

    assert!(book.add("Alex", "+1 (555) 123-4567", None).is_err());
    assert!(persistence.contacts().is_empty());
    Ok(())
}

#[test]
fn test_contacts_persist_across_books() -> Result<()> {
    let (_, persistence) = memory();
    let book = ContactBook::load(persistence.clone(), 5);
    let added = book.add("Alex", "+1 (555) 123-4567", None)?;

    let reloaded = ContactBook::load(persistence, 5);
    let contacts: Vec<EmergencyContact> = reloaded.list();
    assert_eq!(contacts, vec![added]);
    Ok(())
}
