use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::content::{default_content, Language, RightsCard, RightsContent};
use super::generator::{parse_generated, ContentGenerator};
use super::states::{find_state, StateInfo};
use crate::error::{ContentGenerationError, SelectError};

/// Maps a region to its rights card
///
/// Uses the remote generator when one is configured and falls back to the
/// bundled content on any failure.
pub struct ContentSelector {
    generator: Option<Arc<dyn ContentGenerator>>,
    timeout: Duration,
}

impl ContentSelector {
    /// Selector that only serves bundled content
    pub fn bundled() -> Self {
        Self {
            generator: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_generator(generator: Arc<dyn ContentGenerator>, timeout: Duration) -> Self {
        Self {
            generator: Some(generator),
            timeout,
        }
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    pub async fn select(&self, code: &str, language: Language) -> Result<RightsCard, SelectError> {
        let state = find_state(code).ok_or_else(|| SelectError::UnknownRegion(code.to_string()))?;

        let content = match self.generate(state, language).await {
            Ok(content) => content,
            Err(ContentGenerationError::NotConfigured) => default_content(state, language),
            Err(e) => {
                warn!(
                    "Falling back to bundled {} content for {}: {}",
                    language, state.code, e
                );
                default_content(state, language)
            }
        };

        let card = RightsCard::new(state, language, content);
        info!("Selected {} ({}) -> {}", state.name, language, card.card_id);
        Ok(card)
    }

    async fn generate(
        &self,
        state: &StateInfo,
        language: Language,
    ) -> Result<RightsContent, ContentGenerationError> {
        let generator = self
            .generator
            .as_ref()
            .ok_or(ContentGenerationError::NotConfigured)?;

        let text = tokio::time::timeout(self.timeout, generator.generate(state, language))
            .await
            .map_err(|_| ContentGenerationError::Timeout(self.timeout.as_millis() as u64))??;

        parse_generated(&text, state, language)
    }
}

impl Default for ContentSelector {
    fn default() -> Self {
        Self::bundled()
    }
}
