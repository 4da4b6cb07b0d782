use crate::error::{Result, SubbotError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default OpenAI-compatible API root.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Default chat model used for translation.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    Srt,
    Ass,
}

impl std::fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubtitleFormat::Srt => write!(f, "SRT"),
            SubtitleFormat::Ass => write!(f, "ASS"),
        }
    }
}

impl std::str::FromStr for SubtitleFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "srt" | "subrip" => Ok(SubtitleFormat::Srt),
            "ass" => Ok(SubtitleFormat::Ass),
            _ => Err(format!("Unknown subtitle format: {}. Use 'srt' or 'ass'", s)),
        }
    }
}

impl SubtitleFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            SubtitleFormat::Srt => "srt",
            SubtitleFormat::Ass => "ass",
        }
    }

    /// MIME type Telegram clients attach to this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            SubtitleFormat::Srt => "application/x-subrip",
            SubtitleFormat::Ass => "application/x-ass",
        }
    }

    /// The other supported format.
    pub fn counterpart(&self) -> SubtitleFormat {
        match self {
            SubtitleFormat::Srt => SubtitleFormat::Ass,
            SubtitleFormat::Ass => SubtitleFormat::Srt,
        }
    }

    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "srt" => Some(SubtitleFormat::Srt),
            "ass" => Some(SubtitleFormat::Ass),
            _ => None,
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_lowercase().as_str() {
            "application/x-subrip" => Some(SubtitleFormat::Srt),
            "application/x-ass" => Some(SubtitleFormat::Ass),
            _ => None,
        }
    }
}

/// What the process is about to do; decides which settings are mandatory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Bot,
    Translate,
    Convert,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub translation_api_key: Option<String>,
    pub bot_token: Option<String>,
    pub model: String,
    pub api_base: String,
    pub concurrency: usize,
    pub request_timeout_secs: u64,
    pub keepalive_url: Option<String>,
    pub keepalive_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            translation_api_key: None,
            bot_token: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            concurrency: 4,
            request_timeout_secs: 30,
            keepalive_url: None,
            keepalive_interval_secs: 40,
        }
    }
}

impl Config {
    /// Load from the default config file location, then apply environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_file_path().as_deref())
    }

    /// Load from an explicit config file (if it exists), then apply environment overrides.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(config_path) = path {
            if config_path.exists() {
                let contents = std::fs::read_to_string(config_path)?;
                config = toml::from_str::<Config>(&contents).map_err(|e| {
                    SubbotError::Config(format!("{}: {}", config_path.display(), e))
                })?;
            }
        }

        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.translation_api_key = Some(key);
        }
        if let Ok(token) =
            std::env::var("TELEGRAM_BOT_TOKEN").or_else(|_| std::env::var("TELOXIDE_TOKEN"))
        {
            self.bot_token = Some(token);
        }
        if let Ok(model) = std::env::var("HINGLISH_MODEL") {
            self.model = model;
        }
        if let Ok(base) = std::env::var("HINGLISH_API_BASE") {
            self.api_base = base;
        }
        if let Ok(concurrency) = std::env::var("HINGLISH_CONCURRENCY") {
            if let Ok(c) = concurrency.parse() {
                self.concurrency = c;
            }
        }
        if let Ok(timeout) = std::env::var("HINGLISH_TIMEOUT_SECS") {
            if let Ok(t) = timeout.parse() {
                self.request_timeout_secs = t;
            }
        }
        if let Ok(url) = std::env::var("HINGLISH_KEEPALIVE_URL") {
            self.keepalive_url = Some(url);
        }
    }

    pub fn validate(&self, mode: RunMode) -> Result<()> {
        if matches!(mode, RunMode::Bot | RunMode::Translate) && self.translation_api_key.is_none()
        {
            return Err(SubbotError::Config(
                "OPENAI_API_KEY not set. Export it with: export OPENAI_API_KEY=sk-...".to_string(),
            ));
        }

        if mode == RunMode::Bot && self.bot_token.is_none() {
            return Err(SubbotError::Config(
                "TELEGRAM_BOT_TOKEN not set. Get one from @BotFather".to_string(),
            ));
        }

        if self.concurrency == 0 {
            return Err(SubbotError::Config(
                "Concurrency must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(SubbotError::Config(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn keepalive_interval(&self) -> Duration {
        Duration::from_secs(self.keepalive_interval_secs.max(1))
    }

    pub fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("hinglish-subbot").join("config.toml"))
    }
}
