pub mod openai;
pub mod orchestrator;

pub use openai::OpenAiTranslator;
pub use orchestrator::{TranslationOrchestrator, TranslationStats};

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Why a single translation call produced no usable text.
///
/// Never fatal for a document: the orchestrator keeps the original cue text.
#[derive(Error, Debug)]
pub enum TranslationError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("empty translation returned")]
    EmptyResponse,

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str) -> Result<String, TranslationError>;
    fn name(&self) -> &'static str;
}
