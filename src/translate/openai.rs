//! Hinglish translation through an OpenAI-compatible chat completions API.

use crate::config::Config;
use crate::translate::{TranslationError, Translator};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const SYSTEM_PROMPT: &str = "You translate subtitle lines into Hinglish: conversational Hindi written in Latin script, mixed naturally with English. \
Keep names and the original line breaks. Return ONLY the translated text, nothing else.";

/// Translator backed by `POST {api_base}/chat/completions`.
pub struct OpenAiTranslator {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiTranslator {
    /// Create a translator with the given API key and default settings.
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            api_base: crate::config::DEFAULT_API_BASE.to_string(),
            model: crate::config::DEFAULT_MODEL.to_string(),
            temperature: 0.5,
            max_tokens: 1000,
        }
    }

    /// Build a translator from configuration. The HTTP client carries the
    /// configured request timeout.
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let api_key = config.translation_api_key.clone().ok_or_else(|| {
            crate::SubbotError::Config(
                "OpenAI API key not set. Set OPENAI_API_KEY environment variable.".to_string(),
            )
        })?;

        Ok(Self::new(api_key)
            .with_api_base(config.api_base.clone())
            .with_model(config.model.clone())
            .with_timeout(config.request_timeout())?)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point at a different OpenAI-compatible endpoint root.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> crate::Result<Self> {
        self.client = Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    fn build_prompt(&self, text: &str) -> String {
        format!("Translate the following text to Hinglish:\n\n{}", text)
    }

    fn build_request(&self, text: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: self.build_prompt(text),
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            n: 1,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    n: u32,
}

#[derive(Serialize, Debug)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize, Debug)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Deserialize, Debug)]
struct ApiErrorDetail {
    message: String,
}

#[async_trait]
impl Translator for OpenAiTranslator {
    async fn translate(&self, text: &str) -> Result<String, TranslationError> {
        let url = format!("{}/chat/completions", self.api_base);
        debug!("Translating {} chars with {}", text.len(), self.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.build_request(text))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(TranslationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| TranslationError::InvalidResponse(e.to_string()))?;

        let translated = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .unwrap_or_default();

        if translated.is_empty() {
            return Err(TranslationError::EmptyResponse);
        }

        Ok(translated)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
