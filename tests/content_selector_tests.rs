// Integration tests for region selection and rights content

use anyhow::Result;
use async_trait::async_trait;
use kyr_cards::error::{ContentGenerationError, SelectError};
use kyr_cards::rights::{
    default_sections, search_states, ContentGenerator, ContentSelector, Language, StateInfo,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

enum Behavior {
    Reply(String),
    Fail,
    Hang,
}

struct ScriptedGenerator {
    behavior: Behavior,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        _state: &StateInfo,
        _language: Language,
    ) -> Result<String, ContentGenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Reply(text) => Ok(text.clone()),
            Behavior::Fail => Err(ContentGenerationError::Status(503)),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(ContentGenerationError::Request("unreachable".to_string()))
            }
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[tokio::test]
async fn test_selecting_same_region_twice_gives_equal_cards() -> Result<()> {
    let selector = ContentSelector::bundled();

    let first = selector.select("CA", Language::En).await?;
    let second = selector.select("ca", Language::En).await?;

    assert_eq!(first.state, "CA");
    assert_eq!(first.card_id, second.card_id);
    assert_eq!(first.content_hash, second.content_hash);
    assert_eq!(first.content.title, second.content.title);
    assert_eq!(first.content.sections, second.content.sections);
    assert_eq!(first.content.scripts, second.content.scripts);
    assert!(first.card_id.starts_with("card_ca_en_"));
    Ok(())
}

#[tokio::test]
async fn test_language_changes_card_identity() -> Result<()> {
    let selector = ContentSelector::bundled();

    let en = selector.select("TX", Language::En).await?;
    let es = selector.select("TX", Language::Es).await?;

    assert_ne!(en.card_id, es.card_id);
    assert_eq!(es.language, Language::Es);
    assert!(es.content.scripts.iter().all(|s| s.language == Language::Es));
    Ok(())
}

#[tokio::test]
async fn test_unknown_region_is_rejected() {
    let selector = ContentSelector::bundled();

    let err = selector.select("ZZ", Language::En).await.unwrap_err();
    assert_eq!(err, SelectError::UnknownRegion("ZZ".to_string()));
}

#[tokio::test]
async fn test_generated_content_is_used() -> Result<()> {
    let reply = r#"{
        "title": "Know Your Rights in Oregon",
        "sections": [
            {"title": "Stay Silent", "content": "You may decline to answer questions."}
        ],
        "scripts": [
            {"scenario": "traffic-stop", "text": "I do not consent to searches."}
        ]
    }"#;
    let generator = ScriptedGenerator::new(Behavior::Reply(reply.to_string()));
    let selector = ContentSelector::with_generator(generator.clone(), Duration::from_secs(5));

    let card = selector.select("OR", Language::En).await?;

    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    assert_eq!(card.content.title, "Know Your Rights in Oregon");
    assert_eq!(card.content.sections.len(), 1);
    assert_eq!(card.content.scripts[0].text, "I do not consent to searches.");
    Ok(())
}

#[tokio::test]
async fn test_generator_failure_falls_back_to_bundled_content() -> Result<()> {
    let generator = ScriptedGenerator::new(Behavior::Fail);
    let selector = ContentSelector::with_generator(generator.clone(), Duration::from_secs(5));

    let card = selector.select("NV", Language::En).await?;

    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    assert_eq!(card.content.sections, default_sections(Language::En));
    Ok(())
}

#[tokio::test]
async fn test_malformed_generation_falls_back_to_bundled_content() -> Result<()> {
    let generator =
        ScriptedGenerator::new(Behavior::Reply("Sure! Here are your rights...".to_string()));
    let selector = ContentSelector::with_generator(generator, Duration::from_secs(5));

    let generated = selector.select("NV", Language::Es).await?;
    let bundled = ContentSelector::bundled().select("NV", Language::Es).await?;

    assert_eq!(generated.card_id, bundled.card_id);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_slow_generator_times_out_to_bundled_content() -> Result<()> {
    let generator = ScriptedGenerator::new(Behavior::Hang);
    let selector = ContentSelector::with_generator(generator, Duration::from_secs(30));

    let card = selector.select("FL", Language::En).await?;

    assert_eq!(card.content.sections, default_sections(Language::En));
    Ok(())
}

#[test]
fn test_state_search() {
    let codes: Vec<_> = search_states("new").iter().map(|s| s.code).collect();
    assert_eq!(codes, vec!["NH", "NJ", "NM", "NY"]);

    let by_code: Vec<_> = search_states("wa").iter().map(|s| s.code).collect();
    assert!(by_code.contains(&"WA"));
}
