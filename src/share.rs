//! Share flow
//!
//! Links are derived from the card id alone, so sharing needs no network
//! state. Copy, intent links and native share are independent actions.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::rights::{find_state, RightsCard};

pub const DEFAULT_SHARE_BASE_URL: &str = "https://knowyourrights.cards";

/// Payload for a platform share sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeSharePayload {
    pub title: String,
    pub text: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareLinks {
    pub share_url: String,
    pub twitter_url: String,
    pub farcaster_text: String,
    pub native: NativeSharePayload,
}

impl ShareLinks {
    pub fn for_card(card: &RightsCard, base_url: &str) -> Self {
        let region = find_state(&card.state)
            .map(|s| s.name.to_string())
            .unwrap_or_else(|| card.state.clone());

        let share_url = format!("{}/share/{}", base_url.trim_end_matches('/'), card.card_id);

        let tweet = format!(
            "Check out this KnowYourRights Card for {} - essential legal information for police encounters.",
            region
        );
        let twitter_url = format!(
            "https://twitter.com/intent/tweet?text={}&url={}",
            urlencoding::encode(&tweet),
            urlencoding::encode(&share_url)
        );

        let farcaster_text = format!(
            "KnowYourRights Card for {} \u{1F6E1}\u{FE0F}\n\nEssential legal information for police encounters.\n\n{}",
            region, share_url
        );

        let native = NativeSharePayload {
            title: format!("KnowYourRights Card - {}", region),
            text: "Essential legal information for police encounters".to_string(),
            url: share_url.clone(),
        };

        Self {
            share_url,
            twitter_url,
            farcaster_text,
            native,
        }
    }
}

/// Clipboard capability
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), String>;
}

/// Platform share sheet capability
pub trait NativeShare: Send + Sync {
    fn share(&self, payload: &NativeSharePayload) -> Result<(), String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareAction {
    Copy,
    Twitter,
    Farcaster,
    Native,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ShareOutcome {
    Copied { url: String },
    OpenUrl { url: String },
    ComposeText { text: String },
    Shared,
    Unsupported,
    Failed { reason: String },
}

/// Runs share actions for one card
pub struct ShareFlow {
    links: ShareLinks,
    clipboard: Option<Arc<dyn Clipboard>>,
    native: Option<Arc<dyn NativeShare>>,
}

impl ShareFlow {
    pub fn new(card: &RightsCard, base_url: &str) -> Self {
        Self {
            links: ShareLinks::for_card(card, base_url),
            clipboard: None,
            native: None,
        }
    }

    pub fn with_clipboard(mut self, clipboard: Arc<dyn Clipboard>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    pub fn with_native_share(mut self, native: Arc<dyn NativeShare>) -> Self {
        self.native = Some(native);
        self
    }

    pub fn links(&self) -> &ShareLinks {
        &self.links
    }

    pub fn perform(&self, action: ShareAction) -> ShareOutcome {
        let outcome = match action {
            ShareAction::Copy => match &self.clipboard {
                Some(clipboard) => match clipboard.write_text(&self.links.share_url) {
                    Ok(()) => ShareOutcome::Copied {
                        url: self.links.share_url.clone(),
                    },
                    Err(reason) => ShareOutcome::Failed { reason },
                },
                None => ShareOutcome::Unsupported,
            },
            ShareAction::Twitter => ShareOutcome::OpenUrl {
                url: self.links.twitter_url.clone(),
            },
            ShareAction::Farcaster => ShareOutcome::ComposeText {
                text: self.links.farcaster_text.clone(),
            },
            ShareAction::Native => match &self.native {
                Some(native) => match native.share(&self.links.native) {
                    Ok(()) => ShareOutcome::Shared,
                    Err(reason) => ShareOutcome::Failed { reason },
                },
                None => ShareOutcome::Unsupported,
            },
        };

        match &outcome {
            ShareOutcome::Failed { reason } => warn!("Share via {:?} failed: {}", action, reason),
            _ => info!("Share via {:?}: {:?}", action, outcome),
        }

        outcome
    }
}
