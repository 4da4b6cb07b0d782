pub mod ass;
pub mod convert;
pub mod srt;

pub use convert::{ass_to_srt, convert_document, srt_to_ass};

use crate::config::SubtitleFormat;
use crate::error::Result;
use std::time::Duration;

/// One timed line of subtitle text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    pub index: usize,
    pub start: Duration,
    pub end: Duration,
    pub text: String,
}

impl Cue {
    /// Same timing and index, different text.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            index: self.index,
            start: self.start,
            end: self.end,
            text: text.into(),
        }
    }
}

pub trait SubtitleFormatter {
    fn format(&self, cues: &[Cue]) -> String;
    fn extension(&self) -> &'static str;
}

pub fn create_formatter(format: SubtitleFormat) -> Box<dyn SubtitleFormatter> {
    match format {
        SubtitleFormat::Srt => Box::new(srt::SrtFormatter),
        SubtitleFormat::Ass => Box::new(ass::AssFormatter::default()),
    }
}

/// Parse a subtitle document of the declared format into ordered cues.
pub fn parse(content: &str, format: SubtitleFormat) -> Result<Vec<Cue>> {
    match format {
        SubtitleFormat::Srt => srt::parse_srt(content),
        SubtitleFormat::Ass => ass::parse_ass(content),
    }
}

/// Strip a UTF-8 BOM and normalise line endings.
pub(crate) fn normalize_input(content: &str) -> String {
    content
        .trim_start_matches('\u{feff}')
        .replace("\r\n", "\n")
        .replace('\r', "\n")
}
