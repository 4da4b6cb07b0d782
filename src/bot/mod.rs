//! Telegram front end: receives subtitle uploads and replies with the
//! translated SRT and ASS files.

pub mod keepalive;

use crate::config::{Config, SubtitleFormat};
use crate::error::{Result, SubbotError};
use crate::pipeline::{self, RequestWorkspace};
use crate::translate::{OpenAiTranslator, TranslationOrchestrator};
use std::sync::Arc;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{Document, InputFile};
use teloxide::utils::command::BotCommands;
use tokio::fs;
use tracing::{error, info, warn};

pub const START_MESSAGE: &str = "Send me a subtitle file (SRT or ASS format) and I will translate it to Hinglish and convert it to both SRT and ASS formats.";
pub const UNSUPPORTED_MESSAGE: &str = "Unsupported file format. Please send an SRT or ASS file.";
pub const DONE_MESSAGE: &str = "Translation complete. Here are your files:";
pub const WORKING_MESSAGE: &str = "Got it! Translating your subtitles, this can take a minute...";
pub const HINT_MESSAGE: &str = "Please send a subtitle file (.srt or .ass) as a document.";
pub const INTERNAL_ERROR_MESSAGE: &str =
    "Something went wrong while processing your file. Please try again later.";

/// Telegram bots may only download files up to 20 MB.
pub const MAX_UPLOAD_BYTES: u64 = 20 * 1024 * 1024;

type HandlerResult = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum Command {
    #[command(description = "Show what this bot does.")]
    Start,
    #[command(description = "Display this help message.")]
    Help,
}

/// Immutable state shared by every handler.
pub struct BotState {
    pub orchestrator: TranslationOrchestrator,
}

/// Decide whether an upload is a subtitle file we handle.
///
/// The file extension wins over the MIME type since many clients send
/// subtitles as `application/octet-stream`.
pub fn classify_upload(file_name: Option<&str>, mime_type: Option<&str>) -> Result<SubtitleFormat> {
    file_name
        .and_then(|name| SubtitleFormat::from_extension(std::path::Path::new(name)))
        .or_else(|| mime_type.and_then(SubtitleFormat::from_mime))
        .ok_or_else(|| {
            SubbotError::UnsupportedFormat(format!(
                "{} ({})",
                file_name.unwrap_or("unnamed file"),
                mime_type.unwrap_or("no MIME type")
            ))
        })
}

/// The text shown to the user when a request fails.
pub fn user_message(err: &SubbotError) -> String {
    match err {
        SubbotError::UnsupportedFormat(_) => UNSUPPORTED_MESSAGE.to_string(),
        SubbotError::Format { format, message } => format!(
            "Could not read your {} file: {}. Please check the file and try again.",
            format, message
        ),
        _ => INTERNAL_ERROR_MESSAGE.to_string(),
    }
}

/// Start the bot and block until it is stopped with Ctrl+C.
pub async fn run(config: Config) -> Result<()> {
    let token = config.bot_token.clone().ok_or_else(|| {
        SubbotError::Config("Telegram bot token not set. Set TELEGRAM_BOT_TOKEN.".to_string())
    })?;

    let translator = Arc::new(OpenAiTranslator::from_config(&config)?);
    let orchestrator = TranslationOrchestrator::new(translator, config.concurrency)
        .with_timeout(config.request_timeout())
        .with_progress(false);
    let state = Arc::new(BotState { orchestrator });

    if let Some(url) = config.keepalive_url.clone() {
        keepalive::spawn(url, config.keepalive_interval());
    }

    let bot = Bot::new(token);
    let me = bot.get_me().await?;
    info!("Starting as @{}", me.username());

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(
            Update::filter_message()
                .filter(|msg: Message| msg.document().is_some())
                .endpoint(handle_document),
        )
        .branch(Update::filter_message().endpoint(handle_other));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Bot stopped");
    Ok(())
}

async fn handle_command(bot: Bot, msg: Message, cmd: Command) -> HandlerResult {
    match cmd {
        Command::Start => {
            bot.send_message(msg.chat.id, START_MESSAGE).await?;
        }
        Command::Help => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string())
                .await?;
        }
    }
    Ok(())
}

async fn handle_other(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, HINT_MESSAGE).await?;
    Ok(())
}

async fn handle_document(bot: Bot, msg: Message, state: Arc<BotState>) -> HandlerResult {
    let Some(document) = msg.document() else {
        return Ok(());
    };

    if let Err(err) = process_document(&bot, &msg, document, &state).await {
        match &err {
            SubbotError::UnsupportedFormat(detail) => {
                warn!("Rejected upload in chat {}: {}", msg.chat.id.0, detail)
            }
            SubbotError::Format { .. } => warn!("Unparseable upload in chat {}: {}", msg.chat.id.0, err),
            _ => error!("Failed to process upload in chat {}: {}", msg.chat.id.0, err),
        }
        bot.send_message(msg.chat.id, user_message(&err)).await?;
    }

    Ok(())
}

async fn process_document(
    bot: &Bot,
    msg: &Message,
    document: &Document,
    state: &BotState,
) -> Result<()> {
    let mime = document.mime_type.as_ref().map(|m| m.essence_str().to_string());
    let format = classify_upload(document.file_name.as_deref(), mime.as_deref())?;

    if u64::from(document.file.size) > MAX_UPLOAD_BYTES {
        return Err(SubbotError::UnsupportedFormat(format!(
            "file is {} bytes, limit is {}",
            document.file.size, MAX_UPLOAD_BYTES
        )));
    }

    info!(
        "Received {} upload {:?} in chat {}",
        format, document.file_name, msg.chat.id.0
    );
    bot.send_message(msg.chat.id, WORKING_MESSAGE).await?;

    // Everything below lives in the workspace and is removed when it drops,
    // whichever way this function returns.
    let workspace = RequestWorkspace::new()?;
    let input_path = workspace.input_path(document.file_name.as_deref().unwrap_or_default(), format);

    let file = bot.get_file(document.file.id.clone()).await?;
    let mut dst = fs::File::create(&input_path).await?;
    bot.download_file(&file.path, &mut dst).await?;
    drop(dst);

    let result =
        pipeline::translate_file(&input_path, format, workspace.path(), &state.orchestrator)
            .await?;

    bot.send_message(msg.chat.id, DONE_MESSAGE).await?;
    bot.send_document(msg.chat.id, InputFile::file(&result.srt_path))
        .await?;
    bot.send_document(msg.chat.id, InputFile::file(&result.ass_path))
        .await?;

    info!(
        "Sent {} cues to chat {} ({} kept original text)",
        result.cue_count, msg.chat.id.0, result.stats.translation.fallback_cues
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_extension() {
        assert_eq!(
            classify_upload(Some("movie.srt"), Some("application/octet-stream")).unwrap(),
            SubtitleFormat::Srt
        );
        assert_eq!(
            classify_upload(Some("anime.ass"), None).unwrap(),
            SubtitleFormat::Ass
        );
    }

    #[test]
    fn test_classify_by_mime() {
        assert_eq!(
            classify_upload(None, Some("application/x-subrip")).unwrap(),
            SubtitleFormat::Srt
        );
        assert_eq!(
            classify_upload(Some("subs"), Some("application/x-ass")).unwrap(),
            SubtitleFormat::Ass
        );
    }

    #[test]
    fn test_classify_rejects_plain_text() {
        let err = classify_upload(Some("notes.txt"), Some("text/plain")).unwrap_err();
        assert!(matches!(err, SubbotError::UnsupportedFormat(_)));
        assert_eq!(user_message(&err), UNSUPPORTED_MESSAGE);
    }

    #[test]
    fn test_user_message_for_parse_failure() {
        let err = SubbotError::Format {
            format: SubtitleFormat::Srt,
            message: "line 2: cue 1 is missing the timestamp arrow".to_string(),
        };
        let text = user_message(&err);
        assert!(text.starts_with("Could not read your SRT file"));
        assert!(text.contains("missing the timestamp arrow"));
    }

    #[test]
    fn test_user_message_hides_internal_errors() {
        let err = SubbotError::Io(std::io::Error::other("disk full"));
        assert_eq!(user_message(&err), INTERNAL_ERROR_MESSAGE);
    }

    #[test]
    fn test_command_descriptions() {
        let help = Command::descriptions().to_string();
        assert!(help.contains("/start"));
        assert!(help.contains("/help"));
    }
}
