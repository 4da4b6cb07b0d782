//! Advanced SubStation Alpha (ASS) reading and writing.
//!
//! Only the `[Events]` section matters for translation: dialogue timing and
//! text are kept, override blocks and styling are dropped. Output is a minimal
//! script with a single `Default` style.

use super::{normalize_input, Cue, SubtitleFormatter};
use crate::config::SubtitleFormat;
use crate::error::{Result, SubbotError};
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

static TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+):(\d{1,2}):(\d{1,2})\.(\d{1,3})$").expect("Invalid ASS timestamp regex")
});

static OVERRIDE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^}]*\}").expect("Invalid ASS override regex"));

static TAG_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\\[^}]*\}").expect("Invalid tag block regex"));

/// Field order assumed when `[Events]` has no `Format:` line.
const DEFAULT_EVENT_FORMAT: [&str; 10] = [
    "Layer", "Start", "End", "Style", "Name", "MarginL", "MarginR", "MarginV", "Effect", "Text",
];

const STYLE_FORMAT: &str = "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding";

const EVENT_FORMAT: &str =
    "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

pub struct AssFormatter {
    pub title: String,
    pub font_name: String,
    pub font_size: u32,
}

impl Default for AssFormatter {
    fn default() -> Self {
        Self {
            title: "Hinglish subtitles".to_string(),
            font_name: "Arial".to_string(),
            font_size: 20,
        }
    }
}

impl SubtitleFormatter for AssFormatter {
    fn format(&self, cues: &[Cue]) -> String {
        let mut output = String::new();

        output.push_str("[Script Info]\n");
        output.push_str(&format!("Title: {}\n", self.title));
        output.push_str("ScriptType: v4.00+\n");
        output.push_str("WrapStyle: 0\n");
        output.push_str("ScaledBorderAndShadow: yes\n");
        output.push_str("PlayResX: 384\n");
        output.push_str("PlayResY: 288\n\n");

        output.push_str("[V4+ Styles]\n");
        output.push_str(STYLE_FORMAT);
        output.push('\n');
        output.push_str(&format!(
            "Style: Default,{},{},&H00FFFFFF,&H000000FF,&H00000000,&H00000000,0,0,0,0,100,100,0,0,1,2,2,2,10,10,10,1\n\n",
            self.font_name.replace(',', " "),
            self.font_size
        ));

        output.push_str("[Events]\n");
        output.push_str(EVENT_FORMAT);
        output.push('\n');
        for cue in cues {
            output.push_str(&format!(
                "Dialogue: 0,{},{},Default,,0,0,0,,{}\n",
                format_timestamp(cue.start),
                format_timestamp(cue.end),
                escape_text(&cue.text)
            ));
        }

        output
    }

    fn extension(&self) -> &'static str {
        "ass"
    }
}

/// `H:MM:SS.cc`, rounded to the nearest centisecond.
pub fn format_timestamp(d: Duration) -> String {
    let total_cs = (d.as_millis() + 5) / 10;
    let cs = total_cs % 100;
    let total_secs = total_cs / 100;
    let seconds = total_secs % 60;
    let minutes = (total_secs / 60) % 60;
    let hours = total_secs / 3600;
    format!("{}:{:02}:{:02}.{:02}", hours, minutes, seconds, cs)
}

/// Parse `H:MM:SS.cc`. The fraction is read as hundredths; a three digit
/// fraction is tolerated and read as milliseconds.
pub fn parse_timestamp(s: &str) -> Option<Duration> {
    let caps = TIMESTAMP_RE.captures(s.trim())?;
    let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u64>().ok());

    let hours = field(1)?;
    let minutes = field(2)?;
    let seconds = field(3)?;
    let fraction = caps.get(4)?.as_str();
    if minutes >= 60 || seconds >= 60 {
        return None;
    }

    let millis = match fraction.len() {
        1 => field(4)? * 100,
        2 => field(4)? * 10,
        _ => field(4)?,
    };

    let total_secs = hours.checked_mul(3600)?.checked_add(minutes * 60 + seconds)?;
    Some(Duration::from_millis(
        total_secs.checked_mul(1000)?.checked_add(millis)?,
    ))
}

/// Newlines become the `\N` hard line break. Tag blocks carried over from
/// SRT (`{\an8}`) are dropped along with any other brace.
pub fn escape_text(text: &str) -> String {
    TAG_BLOCK_RE
        .replace_all(text, "")
        .replace("\r\n", "\n")
        .replace('\n', "\\N")
        .replace(['{', '}'], "")
}

/// Drop override blocks and turn ASS line-break markers into plain text.
pub fn unescape_text(text: &str) -> String {
    OVERRIDE_RE
        .replace_all(text, "")
        .replace("\\N", "\n")
        .replace("\\n", "\n")
        .replace("\\h", " ")
}

/// Parse the `[Events]` section of an ASS script into cues numbered 1..n.
pub fn parse_ass(content: &str) -> Result<Vec<Cue>> {
    let content = normalize_input(content);
    let err = |message: String| SubbotError::format(SubtitleFormat::Ass, message);

    let mut in_events = false;
    let mut saw_events = false;
    let mut fields: Vec<String> = DEFAULT_EVENT_FORMAT.iter().map(|f| f.to_string()).collect();
    let mut cues: Vec<Cue> = Vec::new();

    for (i, raw) in content.lines().enumerate() {
        let line_no = i + 1;
        let line = raw.trim();

        if line.starts_with('[') && line.ends_with(']') {
            in_events = line.eq_ignore_ascii_case("[events]");
            saw_events |= in_events;
            continue;
        }
        if !in_events {
            continue;
        }

        let Some((kind, rest)) = line.split_once(':') else {
            continue;
        };

        match kind.trim().to_lowercase().as_str() {
            "format" => {
                fields = rest.split(',').map(|f| f.trim().to_string()).collect();
                if !fields.last().is_some_and(|f| f.eq_ignore_ascii_case("text")) {
                    return Err(err(format!(
                        "line {}: event format must end with Text",
                        line_no
                    )));
                }
            }
            "dialogue" => {
                let values: Vec<&str> = rest.trim_start().splitn(fields.len(), ',').collect();
                if values.len() != fields.len() {
                    return Err(err(format!(
                        "line {}: dialogue has {} fields, expected {}",
                        line_no,
                        values.len(),
                        fields.len()
                    )));
                }

                let lookup = |name: &str| {
                    fields
                        .iter()
                        .position(|f| f.eq_ignore_ascii_case(name))
                        .map(|pos| values[pos])
                        .ok_or_else(|| err(format!("line {}: event format has no {} field", line_no, name)))
                };

                let start_raw = lookup("Start")?;
                let end_raw = lookup("End")?;
                let start = parse_timestamp(start_raw).ok_or_else(|| {
                    err(format!("line {}: invalid start time '{}'", line_no, start_raw.trim()))
                })?;
                let end = parse_timestamp(end_raw).ok_or_else(|| {
                    err(format!("line {}: invalid end time '{}'", line_no, end_raw.trim()))
                })?;
                if end < start {
                    return Err(err(format!("line {}: dialogue ends before it starts", line_no)));
                }

                let text = values[fields.len() - 1];
                cues.push(Cue {
                    index: cues.len() + 1,
                    start,
                    end,
                    text: unescape_text(text),
                });
            }
            _ => {}
        }
    }

    if !saw_events {
        return Err(err("missing [Events] section".to_string()));
    }
    if cues.is_empty() {
        return Err(err("no dialogue events found".to_string()));
    }

    Ok(cues)
}
