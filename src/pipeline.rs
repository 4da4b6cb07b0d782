use crate::config::SubtitleFormat;
use crate::error::{Result, SubbotError};
use crate::subtitle::{self, ass::AssFormatter, srt::SrtFormatter, Cue, SubtitleFormatter};
use crate::translate::{TranslationOrchestrator, TranslationStats};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tracing::{debug, info, warn};

/// Suffix appended to the input file stem for translated outputs.
pub const TRANSLATED_SUFFIX: &str = "_hinglish";

/// Statistics from one document run.
#[derive(Debug, Clone)]
pub struct PipelineStats {
    /// Total time taken for the entire pipeline.
    pub total_time: Duration,
    /// Time taken for parsing the input.
    pub parse_time: Duration,
    /// Per-cue translation outcome counts.
    pub translation: TranslationStats,
}

/// Both serialisations of a translated document, not yet written anywhere.
#[derive(Debug)]
pub struct TranslatedDocument {
    pub cues: Vec<Cue>,
    pub srt: String,
    pub ass: String,
    pub stats: PipelineStats,
}

/// Result of translating a subtitle file on disk.
#[derive(Debug)]
pub struct PipelineResult {
    pub input_path: PathBuf,
    pub srt_path: PathBuf,
    pub ass_path: PathBuf,
    pub cue_count: usize,
    pub stats: PipelineStats,
}

/// Per-request scratch directory; removed with everything in it when dropped.
pub struct RequestWorkspace {
    temp_dir: TempDir,
}

impl RequestWorkspace {
    pub fn new() -> Result<Self> {
        let temp_dir = tempfile::Builder::new().prefix("hinglish-subbot").tempdir()?;
        debug!("Using temp directory: {:?}", temp_dir.path());
        Ok(Self { temp_dir })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Location for a downloaded upload. Only the final path component of
    /// `file_name` is used.
    pub fn input_path(&self, file_name: &str, format: SubtitleFormat) -> PathBuf {
        let name = Path::new(file_name)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("subtitle.{}", format.extension()));
        self.temp_dir.path().join(name)
    }
}

/// Determine the subtitle format of a file from its extension.
pub fn detect_format(path: &Path) -> Result<SubtitleFormat> {
    SubtitleFormat::from_extension(path).ok_or_else(|| {
        SubbotError::UnsupportedFormat(format!(
            "{} (expected .srt or .ass)",
            path.display()
        ))
    })
}

/// Output path `<dir>/<stem><suffix>.<ext>`.
pub fn output_path(input: &Path, output_dir: &Path, suffix: &str, format: SubtitleFormat) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    output_dir.join(format!("{}{}.{}", stem, suffix, format.extension()))
}

fn read_subtitle(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    match String::from_utf8(bytes) {
        Ok(content) => Ok(content),
        Err(e) => {
            warn!("{:?} is not valid UTF-8, replacing invalid bytes", path);
            Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
        }
    }
}

/// Parse, translate every cue and render the result as SRT and ASS.
pub async fn translate_document(
    content: &str,
    format: SubtitleFormat,
    orchestrator: &TranslationOrchestrator,
) -> Result<TranslatedDocument> {
    let start_time = Instant::now();

    // ═══════════════════════════════════════════════════════════════════════
    // Stage 1: Parsing
    // ═══════════════════════════════════════════════════════════════════════
    info!("Stage 1/3: Parsing {} document", format);
    let cues = subtitle::parse(content, format)?;
    let parse_time = start_time.elapsed();
    info!("Parsed {} cues", cues.len());

    // ═══════════════════════════════════════════════════════════════════════
    // Stage 2: Translation
    // ═══════════════════════════════════════════════════════════════════════
    info!("Stage 2/3: Translating");
    let (cues, translation) = orchestrator.translate_cues(cues).await;

    // ═══════════════════════════════════════════════════════════════════════
    // Stage 3: Serialisation
    // ═══════════════════════════════════════════════════════════════════════
    info!("Stage 3/3: Rendering SRT and ASS");
    let srt = SrtFormatter.format(&cues);
    let ass = AssFormatter::default().format(&cues);

    Ok(TranslatedDocument {
        cues,
        srt,
        ass,
        stats: PipelineStats {
            total_time: start_time.elapsed(),
            parse_time,
            translation,
        },
    })
}

/// Translate a subtitle file and write `<stem>_hinglish.srt` and
/// `<stem>_hinglish.ass` into `output_dir`.
pub async fn translate_file(
    input: &Path,
    format: SubtitleFormat,
    output_dir: &Path,
    orchestrator: &TranslationOrchestrator,
) -> Result<PipelineResult> {
    if !input.exists() {
        return Err(SubbotError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("File not found: {}", input.display()),
        )));
    }

    let content = read_subtitle(input)?;
    let document = translate_document(&content, format, orchestrator).await?;

    let srt_path = output_path(input, output_dir, TRANSLATED_SUFFIX, SubtitleFormat::Srt);
    let ass_path = output_path(input, output_dir, TRANSLATED_SUFFIX, SubtitleFormat::Ass);
    fs::write(&srt_path, &document.srt)?;
    fs::write(&ass_path, &document.ass)?;

    info!(
        "Wrote {} cues to {:?} and {:?}",
        document.cues.len(),
        srt_path,
        ass_path
    );

    Ok(PipelineResult {
        input_path: input.to_path_buf(),
        srt_path,
        ass_path,
        cue_count: document.cues.len(),
        stats: document.stats,
    })
}

/// Convert a subtitle file to the other format without translating it.
/// Returns the path of the written file.
pub fn convert_file(input: &Path, output_dir: &Path) -> Result<PathBuf> {
    let format = detect_format(input)?;
    let content = read_subtitle(input)?;
    let converted = subtitle::convert_document(&content, format)?;

    let target = format.counterpart();
    let output = output_path(input, output_dir, "", target);
    fs::write(&output, converted)?;
    info!("Converted {} to {}: {:?}", format, target, output);

    Ok(output)
}

/// Print a summary of the pipeline results.
pub fn print_summary(result: &PipelineResult) {
    let t = &result.stats.translation;
    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("                   Hinglish Translation Complete               ");
    println!("═══════════════════════════════════════════════════════════════");
    println!();
    println!("  Input:      {}", result.input_path.display());
    println!("  SRT:        {}", result.srt_path.display());
    println!("  ASS:        {}", result.ass_path.display());
    println!("  Cues:       {}", result.cue_count);
    println!("  Translated: {}", t.translated_cues);
    if t.fallback_cues > 0 {
        println!("  Kept as-is: {} (translation failed)", t.fallback_cues);
    }
    println!();
    println!(
        "  Total:      {:.2}s",
        result.stats.total_time.as_secs_f64()
    );
    println!();
    println!("═══════════════════════════════════════════════════════════════");
}
