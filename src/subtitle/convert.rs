use super::ass::{parse_ass, AssFormatter};
use super::srt::{parse_srt, SrtFormatter};
use super::{Cue, SubtitleFormatter};
use crate::config::SubtitleFormat;
use crate::error::Result;

/// Re-serialise an SRT document as a minimal ASS script.
pub fn srt_to_ass(content: &str) -> Result<String> {
    let cues = parse_srt(content)?;
    Ok(AssFormatter::default().format(&cues))
}

/// Re-serialise an ASS script as SRT, numbering cues 1..n in event order.
pub fn ass_to_srt(content: &str) -> Result<String> {
    let cues = renumber(parse_ass(content)?);
    Ok(SrtFormatter.format(&cues))
}

/// Convert a document to the other supported format.
pub fn convert_document(content: &str, from: SubtitleFormat) -> Result<String> {
    match from {
        SubtitleFormat::Srt => srt_to_ass(content),
        SubtitleFormat::Ass => ass_to_srt(content),
    }
}

/// Assign sequential indices starting at 1, keeping order.
pub fn renumber(cues: Vec<Cue>) -> Vec<Cue> {
    cues.into_iter()
        .enumerate()
        .map(|(i, cue)| Cue { index: i + 1, ..cue })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subtitle::parse;
    use std::time::Duration;

    const SRT: &str = "1\n00:00:00,000 --> 00:00:02,000\nHello\n\n2\n00:00:02,500 --> 00:00:04,000\nTwo\nlines\n";

    #[test]
    fn test_srt_to_ass() {
        let ass = srt_to_ass(SRT).unwrap();
        assert!(ass.contains("Dialogue: 0,0:00:00.00,0:00:02.00,Default,,0,0,0,,Hello\n"));
        assert!(ass.contains("Dialogue: 0,0:00:02.50,0:00:04.00,Default,,0,0,0,,Two\\Nlines\n"));
    }

    #[test]
    fn test_ass_srt_ass_preserves_cues() {
        let ass = srt_to_ass(SRT).unwrap();
        let srt = ass_to_srt(&ass).unwrap();
        let back = srt_to_ass(&srt).unwrap();

        let original = parse(&ass, SubtitleFormat::Ass).unwrap();
        let round_tripped = parse(&back, SubtitleFormat::Ass).unwrap();
        assert_eq!(original, round_tripped);
    }

    #[test]
    fn test_srt_to_ass_rounds_to_centiseconds() {
        let input = "1\n00:00:01,234 --> 00:00:02,996\nHi\n";
        let ass = srt_to_ass(input).unwrap();
        assert!(ass.contains("0:00:01.23,0:00:03.00"));
    }

    #[test]
    fn test_renumber() {
        let cues = vec![
            Cue {
                index: 7,
                start: Duration::ZERO,
                end: Duration::from_secs(1),
                text: "a".to_string(),
            },
            Cue {
                index: 9,
                start: Duration::from_secs(1),
                end: Duration::from_secs(2),
                text: "b".to_string(),
            },
        ];
        let renumbered = renumber(cues);
        assert_eq!(renumbered[0].index, 1);
        assert_eq!(renumbered[1].index, 2);
        assert_eq!(renumbered[1].text, "b");
    }

    #[test]
    fn test_convert_document_propagates_errors() {
        assert!(convert_document("not a subtitle", SubtitleFormat::Srt).is_err());
        assert!(convert_document("[Script Info]\n", SubtitleFormat::Ass).is_err());
    }
}
