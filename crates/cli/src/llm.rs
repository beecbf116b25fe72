use anyhow::{Context as AnyhowContext, Result};
use async_trait::async_trait;
use intent_engine::{ExternalServiceError, PromptPair, TextGenerator};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

pub const BASE_URL_ENV: &str = "INTENT_LLM_BASE_URL";
pub const API_KEY_ENV: &str = "INTENT_LLM_API_KEY";
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const MODEL_ENV: &str = "INTENT_LLM_MODEL";

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl GeneratorSettings {
    /// `None` when no API key is configured.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_empty(API_KEY_ENV).or_else(|| non_empty(OPENAI_API_KEY_ENV))?;
        let base_url = non_empty(BASE_URL_ENV)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let model = non_empty(MODEL_ENV).unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Some(Self {
            base_url,
            api_key,
            model,
        })
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

/// Chat-completions client for any OpenAI-compatible endpoint.
pub struct OpenAiCompatibleGenerator {
    client: Client,
    settings: GeneratorSettings,
}

impl OpenAiCompatibleGenerator {
    pub fn new(settings: GeneratorSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("intent/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, settings })
    }

    fn request_body(&self, prompt: &PromptPair) -> serde_json::Value {
        let user = format!(
            "{}\n\nReply with a JSON object matching this schema:\n{}",
            prompt.user, prompt.response_schema
        );
        json!({
            "model": self.settings.model,
            "temperature": 0,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": prompt.system },
                { "role": "user", "content": user }
            ]
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Pull `choices[0].message.content` out of a completion body.
fn completion_content(body: &str) -> Result<String, ExternalServiceError> {
    let completion: ChatCompletion = serde_json::from_str(body)
        .map_err(|err| ExternalServiceError::MalformedReply(err.to_string()))?;
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| ExternalServiceError::MalformedReply("completion has no content".into()))
}

#[async_trait]
impl TextGenerator for OpenAiCompatibleGenerator {
    async fn complete(&self, prompt: &PromptPair) -> Result<String, ExternalServiceError> {
        let url = self.settings.completions_url();
        log::debug!("Requesting completion from {url} (model {})", self.settings.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.settings.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|err| ExternalServiceError::Transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| ExternalServiceError::Transport(err.to_string()))?;

        if !status.is_success() {
            return Err(ExternalServiceError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        completion_content(&body)
    }
}
