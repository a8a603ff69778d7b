use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::content::{default_scripts, default_title, Language, RightsContent, RightsSection, Script};
use super::states::StateInfo;
use crate::error::ContentGenerationError;

/// Remote text generation for a region
#[async_trait::async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Free-form generated text for the region and language
    async fn generate(
        &self,
        state: &StateInfo,
        language: Language,
    ) -> Result<String, ContentGenerationError>;

    fn name(&self) -> &str;
}

/// Connection settings for an OpenAI-compatible chat-completions endpoint
#[derive(Debug, Clone)]
pub struct ChatCompletionSettings {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

pub struct ChatCompletionGenerator {
    client: reqwest::Client,
    settings: ChatCompletionSettings,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl ChatCompletionGenerator {
    pub fn new(settings: ChatCompletionSettings) -> Result<Self, ContentGenerationError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| ContentGenerationError::Request(e.to_string()))?;

        Ok(Self { client, settings })
    }

    fn request_body(&self, state: &StateInfo, language: Language) -> ChatRequest<'_> {
        let prompt = format!(
            "Summarize the rights of a person during police encounters in {name}. \
             Respond with JSON only: {{\"title\": string, \"sections\": [{{\"id\", \"title\", \"body\", \"icon\"}}], \
             \"scripts\": [{{\"id\", \"scenario\", \"text\"}}]}}. Cover traffic stops, street encounters \
             and home visits. Language: {language}.",
            name = state.name,
            language = language.display_name(),
        );

        ChatRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: "You provide accurate, state-specific legal rights information.".to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt,
                },
            ],
            temperature: 0.3,
            max_tokens: 2000,
        }
    }
}

#[async_trait::async_trait]
impl ContentGenerator for ChatCompletionGenerator {
    async fn generate(
        &self,
        state: &StateInfo,
        language: Language,
    ) -> Result<String, ContentGenerationError> {
        let url = format!(
            "{}/chat/completions",
            self.settings.endpoint.trim_end_matches('/')
        );

        debug!("Requesting {} content for {} from {}", language, state.code, url);

        let mut request = self.client.post(&url).json(&self.request_body(state, language));
        if let Some(key) = &self.settings.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ContentGenerationError::Timeout(self.settings.timeout.as_millis() as u64)
            } else {
                ContentGenerationError::Request(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(ContentGenerationError::Status(response.status().as_u16()));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ContentGenerationError::Malformed(e.to_string()))?;

        let text = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| ContentGenerationError::Malformed("empty completion".to_string()))?;

        info!("Generated {} bytes of {} content for {}", text.len(), language, state.code);
        Ok(text)
    }

    fn name(&self) -> &str {
        &self.settings.model
    }
}

#[derive(Debug, Deserialize)]
struct GeneratedContent {
    title: Option<String>,
    #[serde(default)]
    sections: Vec<GeneratedSection>,
    #[serde(default)]
    scripts: Vec<GeneratedScript>,
}

#[derive(Debug, Deserialize)]
struct GeneratedSection {
    id: Option<String>,
    title: String,
    #[serde(alias = "content")]
    body: String,
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeneratedScript {
    id: Option<String>,
    scenario: String,
    text: String,
}

/// Parse generated text into card content
///
/// Accepts bare JSON or JSON inside a fenced code block. Sections are
/// required; missing scripts fall back to the bundled ones.
pub fn parse_generated(
    text: &str,
    state: &StateInfo,
    language: Language,
) -> Result<RightsContent, ContentGenerationError> {
    let json = strip_code_fence(text);
    let generated: GeneratedContent = serde_json::from_str(json)
        .map_err(|e| ContentGenerationError::Malformed(e.to_string()))?;

    if generated.sections.is_empty() {
        return Err(ContentGenerationError::Malformed(
            "no sections in generated content".to_string(),
        ));
    }

    let sections = generated
        .sections
        .into_iter()
        .enumerate()
        .map(|(i, s)| RightsSection {
            id: s.id.unwrap_or_else(|| format!("section-{}", i + 1)),
            title: s.title,
            body: s.body,
            icon: s.icon.unwrap_or_else(|| "shield".to_string()),
        })
        .collect();

    let scripts = if generated.scripts.is_empty() {
        default_scripts(language)
    } else {
        generated
            .scripts
            .into_iter()
            .enumerate()
            .map(|(i, s)| Script {
                id: s.id.unwrap_or_else(|| format!("script-{}", i + 1)),
                scenario: s.scenario,
                text: s.text,
                language,
            })
            .collect()
    };

    Ok(RightsContent {
        title: generated
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| default_title(state, language)),
        sections,
        scripts,
        last_updated: Utc::now(),
    })
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.trim_end().trim_end_matches("```").trim()
}
