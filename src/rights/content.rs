use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::states::StateInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Es => "Spanish",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RightsSection {
    pub id: String,
    pub title: String,
    pub body: String,
    /// Icon tag understood by the presentation layer
    pub icon: String,
}

/// A phrase to say in a given scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub id: String,
    pub scenario: String,
    pub text: String,
    pub language: Language,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RightsContent {
    pub title: String,
    pub sections: Vec<RightsSection>,
    pub scripts: Vec<Script>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RightsCard {
    pub card_id: String,
    /// Region code, e.g. "CA"
    pub state: String,
    pub content_hash: String,
    pub language: Language,
    pub content: RightsContent,
}

#[derive(Serialize)]
struct HashInput<'a> {
    state: &'a str,
    language: Language,
    title: &'a str,
    sections: &'a [RightsSection],
    scripts: &'a [Script],
}

impl RightsCard {
    /// Build a card; id and hash depend only on region, language and
    /// content, never on `last_updated`
    pub fn new(state: &StateInfo, language: Language, content: RightsContent) -> Self {
        let content_hash = content_hash(state.code, language, &content);
        let card_id = format!(
            "card_{}_{}_{}",
            state.code.to_lowercase(),
            language,
            &content_hash[..12]
        );

        Self {
            card_id,
            state: state.code.to_string(),
            content_hash,
            language,
            content,
        }
    }
}

fn content_hash(state: &str, language: Language, content: &RightsContent) -> String {
    let namespace = Uuid::new_v5(&Uuid::NAMESPACE_URL, b"https://knowyourrights.cards");
    let input = HashInput {
        state,
        language,
        title: &content.title,
        sections: &content.sections,
        scripts: &content.scripts,
    };
    // Serializing plain structs of strings cannot fail
    let bytes = serde_json::to_vec(&input).unwrap_or_default();
    Uuid::new_v5(&namespace, &bytes).simple().to_string()
}

fn section(id: &str, title: &str, body: &str, icon: &str) -> RightsSection {
    RightsSection {
        id: id.to_string(),
        title: title.to_string(),
        body: body.to_string(),
        icon: icon.to_string(),
    }
}

fn script(id: &str, scenario: &str, text: &str, language: Language) -> Script {
    Script {
        id: id.to_string(),
        scenario: scenario.to_string(),
        text: text.to_string(),
        language,
    }
}

/// Bundled sections for a language
pub fn default_sections(language: Language) -> Vec<RightsSection> {
    match language {
        Language::En => vec![
            section(
                "core-rights",
                "Core Rights",
                "You have the right to remain silent. You have the right to refuse searches. You have the right to leave if not detained.",
                "shield",
            ),
            section(
                "what-to-say",
                "What to Say",
                "Am I free to leave? I invoke my right to remain silent. I do not consent to any searches.",
                "message-circle",
            ),
            section(
                "what-not-to-say",
                "What NOT to Say",
                "Do not resist physically. Do not argue or become confrontational. Do not provide false information.",
                "x-circle",
            ),
        ],
        Language::Es => vec![
            section(
                "core-rights",
                "Derechos Fundamentales",
                "Tiene derecho a permanecer en silencio. Tiene derecho a rechazar registros. Tiene derecho a irse si no está detenido.",
                "shield",
            ),
            section(
                "what-to-say",
                "Qué Decir",
                "¿Soy libre de irme? Invoco mi derecho a permanecer en silencio. No consiento ningún registro.",
                "message-circle",
            ),
            section(
                "what-not-to-say",
                "Qué NO Decir",
                "No resista físicamente. No discuta o se vuelva confrontativo. No proporcione información falsa.",
                "x-circle",
            ),
        ],
    }
}

/// Scenario scripts: traffic stop, street encounter, home visit
pub fn default_scripts(language: Language) -> Vec<Script> {
    match language {
        Language::En => vec![
            script(
                "traffic-stop",
                "Traffic Stop",
                "Officer, am I free to leave? I invoke my right to remain silent. I do not consent to any searches.",
                language,
            ),
            script(
                "street-encounter",
                "Street Encounter",
                "I am exercising my right to remain silent. I do not consent to any searches. Am I being detained?",
                language,
            ),
            script(
                "home-visit",
                "Home Visit",
                "I do not consent to you entering my home. Do you have a warrant? I am exercising my right to remain silent.",
                language,
            ),
        ],
        Language::Es => vec![
            script(
                "traffic-stop",
                "Parada de Tráfico",
                "Oficial, ¿soy libre de irme? Invoco mi derecho a permanecer en silencio. No consiento ningún registro.",
                language,
            ),
            script(
                "street-encounter",
                "Encuentro en la Calle",
                "Estoy ejerciendo mi derecho a permanecer en silencio. No consiento ningún registro. ¿Estoy detenido?",
                language,
            ),
            script(
                "home-visit",
                "Visita al Hogar",
                "No consiento que entre a mi casa. ¿Tiene una orden judicial? Estoy ejerciendo mi derecho a permanecer en silencio.",
                language,
            ),
        ],
    }
}

pub fn default_title(state: &StateInfo, language: Language) -> String {
    match language {
        Language::En => format!("Your Rights in {}", state.name),
        Language::Es => format!("Sus Derechos en {}", state.name),
    }
}

/// Bundled content customized for a state
pub fn default_content(state: &StateInfo, language: Language) -> RightsContent {
    RightsContent {
        title: default_title(state, language),
        sections: default_sections(language),
        scripts: default_scripts(language),
        last_updated: Utc::now(),
    }
}
