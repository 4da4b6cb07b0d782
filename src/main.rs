use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hinglish_subbot::config::{Config, RunMode};
use hinglish_subbot::pipeline::{self, detect_format};
use hinglish_subbot::translate::{OpenAiTranslator, TranslationOrchestrator};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "hinglish-subbot")]
#[command(version, about = "Translate SRT/ASS subtitles to Hinglish")]
#[command(long_about = "Telegram bot (and command-line tool) that translates subtitle files to Hinglish with an OpenAI-compatible model and returns both SRT and ASS.")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (defaults to ~/.config/hinglish-subbot/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Number of concurrent translation requests
    #[arg(short, long, global = true)]
    concurrency: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Telegram bot (default)
    Serve,

    /// Translate a local .srt/.ass file and write both formats
    Translate {
        /// Input subtitle file
        input: PathBuf,

        /// Output directory (defaults to the input's directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Convert between SRT and ASS without translating
    Convert {
        /// Input subtitle file
        input: PathBuf,

        /// Output directory (defaults to the input's directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

fn resolve_output_dir(input: &Path, output_dir: Option<PathBuf>) -> PathBuf {
    output_dir.unwrap_or_else(|| {
        input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Config::load_from(Some(path.as_path()))
        }
        None => Config::load(),
    }
    .context("Failed to load configuration")?;
    if let Some(concurrency) = cli.concurrency {
        config.concurrency = concurrency;
    }

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            config
                .validate(RunMode::Bot)
                .context("Configuration validation failed")?;
            info!("Model:       {}", config.model);
            info!("Concurrency: {}", config.concurrency);
            hinglish_subbot::bot::run(config)
                .await
                .context("Bot stopped with an error")?;
        }
        Commands::Translate { input, output_dir } => {
            config
                .validate(RunMode::Translate)
                .context("Configuration validation failed")?;
            let format = detect_format(&input)?;
            let output_dir = resolve_output_dir(&input, output_dir);

            info!("Input:  {}", input.display());
            info!("Output: {}", output_dir.display());
            info!("Model:  {}", config.model);

            let translator = Arc::new(OpenAiTranslator::from_config(&config)?);
            let orchestrator = TranslationOrchestrator::new(translator, config.concurrency)
                .with_timeout(config.request_timeout())
                .with_progress(true);

            let result = pipeline::translate_file(&input, format, &output_dir, &orchestrator)
                .await
                .with_context(|| format!("Failed to translate {}", input.display()))?;
            pipeline::print_summary(&result);
        }
        Commands::Convert { input, output_dir } => {
            config
                .validate(RunMode::Convert)
                .context("Configuration validation failed")?;
            let output_dir = resolve_output_dir(&input, output_dir);
            let output = pipeline::convert_file(&input, &output_dir)
                .with_context(|| format!("Failed to convert {}", input.display()))?;
            println!("{}", output.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_output_dir() {
        assert_eq!(
            resolve_output_dir(Path::new("/path/to/movie.srt"), None),
            PathBuf::from("/path/to")
        );
        assert_eq!(
            resolve_output_dir(Path::new("movie.srt"), None),
            PathBuf::from(".")
        );
        assert_eq!(
            resolve_output_dir(Path::new("movie.srt"), Some(PathBuf::from("/out"))),
            PathBuf::from("/out")
        );
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["hinglish-subbot", "translate", "a.srt", "-o", "out"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Translate { .. })));

        let cli = Cli::try_parse_from(["hinglish-subbot", "-v"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.verbose);
    }
}
