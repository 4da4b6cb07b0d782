// SRT subtitle format
use super::{normalize_input, Cue, SubtitleFormatter};
use crate::config::SubtitleFormat;
use crate::error::{Result, SubbotError};
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

static TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+):(\d{2}):(\d{2})[,.](\d{3})$").expect("Invalid SRT timestamp regex")
});

pub struct SrtFormatter;

impl SubtitleFormatter for SrtFormatter {
    fn format(&self, cues: &[Cue]) -> String {
        cues.iter()
            .map(|cue| {
                format!(
                    "{}\n{} --> {}\n{}\n\n",
                    cue.index,
                    format_timestamp(cue.start),
                    format_timestamp(cue.end),
                    cue_body(&cue.text)
                )
            })
            .collect()
    }

    fn extension(&self) -> &'static str {
        "srt"
    }
}

/// A blank line ends an SRT block, so blank lines inside cue text are dropped.
fn cue_body(text: &str) -> String {
    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_timestamp(d: Duration) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let millis = d.subsec_millis();
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

/// Parse `HH:MM:SS,mmm` (a `.` before the milliseconds is accepted too).
pub fn parse_timestamp(s: &str) -> Option<Duration> {
    let caps = TIMESTAMP_RE.captures(s.trim())?;
    let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u64>().ok());

    let hours = field(1)?;
    let minutes = field(2)?;
    let seconds = field(3)?;
    let millis = field(4)?;
    if minutes >= 60 || seconds >= 60 {
        return None;
    }

    let total_secs = hours.checked_mul(3600)?.checked_add(minutes * 60 + seconds)?;
    Some(Duration::from_millis(
        total_secs.checked_mul(1000)?.checked_add(millis)?,
    ))
}

/// Parse an SRT document into cues.
///
/// Blocks are separated by blank lines; each must carry a numeric index, a
/// `start --> end` line and zero or more text lines. Indices must strictly
/// increase and every cue must end no earlier than it starts.
pub fn parse_srt(content: &str) -> Result<Vec<Cue>> {
    let content = normalize_input(content);
    let mut cues: Vec<Cue> = Vec::new();

    let mut block: Vec<&str> = Vec::new();
    let mut block_line = 0;
    for (i, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            if !block.is_empty() {
                let cue = parse_block(&block, block_line, cues.last())?;
                cues.push(cue);
                block.clear();
            }
            continue;
        }
        if block.is_empty() {
            block_line = i + 1;
        }
        block.push(line);
    }
    if !block.is_empty() {
        let cue = parse_block(&block, block_line, cues.last())?;
        cues.push(cue);
    }

    if cues.is_empty() {
        return Err(SubbotError::format(
            SubtitleFormat::Srt,
            "no subtitle cues found",
        ));
    }

    Ok(cues)
}

fn parse_block(lines: &[&str], line_no: usize, previous: Option<&Cue>) -> Result<Cue> {
    let err = |message: String| SubbotError::format(SubtitleFormat::Srt, message);

    let index_line = lines[0].trim();
    let index: usize = index_line
        .parse()
        .ok()
        .filter(|i| *i > 0)
        .ok_or_else(|| err(format!("line {}: invalid cue index '{}'", line_no, index_line)))?;

    if let Some(prev) = previous {
        if index <= prev.index {
            return Err(err(format!(
                "line {}: cue index {} does not follow {}",
                line_no, index, prev.index
            )));
        }
    }

    let timing = lines.get(1).map(|l| l.trim()).unwrap_or_default();
    let (start_raw, end_raw) = timing.split_once("-->").ok_or_else(|| {
        err(format!(
            "line {}: cue {} is missing the timestamp arrow",
            line_no + 1,
            index
        ))
    })?;

    let start = parse_timestamp(start_raw)
        .ok_or_else(|| err(format!("line {}: invalid start time '{}'", line_no + 1, start_raw.trim())))?;
    // Some files carry position hints after the end time ("X1:... Y1:...").
    let end_token = end_raw.split_whitespace().next().unwrap_or_default();
    let end = parse_timestamp(end_token)
        .ok_or_else(|| err(format!("line {}: invalid end time '{}'", line_no + 1, end_raw.trim())))?;

    if end < start {
        return Err(err(format!(
            "line {}: cue {} ends before it starts",
            line_no + 1,
            index
        )));
    }

    let text = lines
        .iter()
        .skip(2)
        .map(|l| l.trim_end())
        .collect::<Vec<_>>()
        .join("\n");

    Ok(Cue {
        index,
        start,
        end,
        text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "1\n00:00:01,500 --> 00:00:04,000\nHello, world!\n\n2\n00:00:04,500 --> 00:00:07,000\nThis is a test.\nSecond line.\n";

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(Duration::from_millis(1500)), "00:00:01,500");
        assert_eq!(
            format_timestamp(Duration::from_secs(3661) + Duration::from_millis(123)),
            "01:01:01,123"
        );
    }

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("00:00:01,500"), Some(Duration::from_millis(1500)));
        assert_eq!(parse_timestamp("01:01:01.123"), Some(Duration::from_millis(3_661_123)));
        assert_eq!(parse_timestamp("00:61:00,000"), None);
        assert_eq!(parse_timestamp("garbage"), None);
    }

    #[test]
    fn test_srt_format() {
        let cues = vec![
            Cue {
                index: 1,
                start: Duration::from_millis(1500),
                end: Duration::from_millis(4000),
                text: "Hello, world!".to_string(),
            },
            Cue {
                index: 2,
                start: Duration::from_millis(4500),
                end: Duration::from_millis(7000),
                text: "This is a test.".to_string(),
            },
        ];

        let output = SrtFormatter.format(&cues);

        assert_eq!(
            output,
            "1\n00:00:01,500 --> 00:00:04,000\nHello, world!\n\n2\n00:00:04,500 --> 00:00:07,000\nThis is a test.\n\n"
        );
    }

    #[test]
    fn test_parse_srt() {
        let cues = parse_srt(SAMPLE).unwrap();
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].index, 1);
        assert_eq!(cues[0].start, Duration::from_millis(1500));
        assert_eq!(cues[0].end, Duration::from_millis(4000));
        assert_eq!(cues[0].text, "Hello, world!");
        assert_eq!(cues[1].text, "This is a test.\nSecond line.");
    }

    #[test]
    fn test_parse_srt_crlf_and_bom() {
        let input = "\u{feff}1\r\n00:00:00,000 --> 00:00:02,000\r\nHi\r\n\r\n\r\n2\r\n00:00:02,500 --> 00:00:04,000\r\nThere\r\n";
        let cues = parse_srt(input).unwrap();
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[1].text, "There");
    }

    #[test]
    fn test_parse_srt_round_trip() {
        let cues = parse_srt(SAMPLE).unwrap();
        let output = SrtFormatter.format(&cues);
        assert_eq!(parse_srt(&output).unwrap(), cues);
    }

    #[test]
    fn test_parse_srt_missing_arrow() {
        let input = "1\n00:00:01,000 00:00:02,000\nHello\n";
        let err = parse_srt(input).unwrap_err();
        assert!(err.to_string().contains("missing the timestamp arrow"));
    }

    #[test]
    fn test_parse_srt_rejects_bad_index() {
        assert!(parse_srt("one\n00:00:01,000 --> 00:00:02,000\nHello\n").is_err());
        let out_of_order = "2\n00:00:01,000 --> 00:00:02,000\nA\n\n1\n00:00:03,000 --> 00:00:04,000\nB\n";
        assert!(parse_srt(out_of_order).is_err());
    }

    #[test]
    fn test_parse_srt_rejects_reversed_times() {
        let input = "1\n00:00:05,000 --> 00:00:02,000\nHello\n";
        assert!(parse_srt(input).is_err());
    }

    #[test]
    fn test_parse_srt_empty_is_error() {
        assert!(matches!(
            parse_srt("\n\n  \n"),
            Err(SubbotError::Format { format: SubtitleFormat::Srt, .. })
        ));
    }

    #[test]
    fn test_format_collapses_blank_lines_in_text() {
        let cues = vec![Cue {
            index: 1,
            start: Duration::ZERO,
            end: Duration::from_secs(2),
            text: "x\n\n  \ny".to_string(),
        }];

        let output = SrtFormatter.format(&cues);

        assert_eq!(output, "1\n00:00:00,000 --> 00:00:02,000\nx\ny\n\n");
        assert_eq!(parse_srt(&output).unwrap()[0].text, "x\ny");
    }

    #[test]
    fn test_parse_srt_timestamp_overflow() {
        assert_eq!(parse_timestamp("9999999999999999999:00:00,000"), None);
        let input = "1\n9999999999999999999:00:00,000 --> 9999999999999999999:00:01,000\nHello\n";
        assert!(matches!(
            parse_srt(input),
            Err(SubbotError::Format { format: SubtitleFormat::Srt, .. })
        ));
    }

    #[test]
    fn test_parse_srt_position_hints() {
        let input = "1\n00:00:01,000 --> 00:00:02,000 X1:10 X2:20 Y1:30 Y2:40\nHello\n";
        let cues = parse_srt(input).unwrap();
        assert_eq!(cues[0].end, Duration::from_millis(2000));
    }
}
