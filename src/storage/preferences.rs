use serde::{Deserialize, Serialize};

use crate::capture::MediaKind;
use crate::rights::Language;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub language: Language,
    pub preferred_media_kind: MediaKind,
    /// Attach the current position to archived recordings
    pub share_location: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            language: Language::En,
            preferred_media_kind: MediaKind::Audio,
            share_location: true,
        }
    }
}

/// Partial update; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferencesPatch {
    pub language: Option<Language>,
    pub preferred_media_kind: Option<MediaKind>,
    pub share_location: Option<bool>,
}

impl Preferences {
    pub fn apply(&self, patch: PreferencesPatch) -> Preferences {
        Preferences {
            language: patch.language.unwrap_or(self.language),
            preferred_media_kind: patch
                .preferred_media_kind
                .unwrap_or(self.preferred_media_kind),
            share_location: patch.share_location.unwrap_or(self.share_location),
        }
    }
}
