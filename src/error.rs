use crate::config::SubtitleFormat;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubbotError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid {format} file: {message}")]
    Format {
        format: SubtitleFormat,
        message: String,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Telegram request failed: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Telegram download failed: {0}")]
    Download(#[from] teloxide::DownloadError),
}

impl SubbotError {
    pub(crate) fn format(format: SubtitleFormat, message: impl Into<String>) -> Self {
        SubbotError::Format {
            format,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SubbotError>;
