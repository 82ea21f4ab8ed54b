//! Line-ending normalisation and SubRip validity checking (§6).

use once_cell::sync::Lazy;
use regex_lite::Regex;

static TIMESTAMP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d{2}:\d{2}:\d{2}[,.]\d{3}\s*-->\s*\d{2}:\d{2}:\d{2}[,.]\d{3}").unwrap()
});

/// Strip a UTF-8 BOM, replace invalid multi-byte sequences, and convert
/// CRLF/lone-CR to LF.
pub fn fix_line_ending(bytes: &[u8]) -> Vec<u8> {
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
    let text = String::from_utf8_lossy(bytes);

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            out.push('\n');
        } else {
            out.push(c);
        }
    }
    out.into_bytes()
}

/// Sniff the format of `content` from its first 256 bytes. Only SubRip is
/// recognised with confidence today; everything else is `Unknown` and
/// still gets a best-effort SubRip validity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SniffedFormat {
    SubRip,
    Unknown,
}

pub fn sniff_format(content: &[u8]) -> SniffedFormat {
    let head = &content[..content.len().min(256)];
    let text = String::from_utf8_lossy(head);
    if TIMESTAMP_RE.is_match(&text) {
        SniffedFormat::SubRip
    } else {
        SniffedFormat::Unknown
    }
}

/// Validity per §3: parses as SubRip and succeeds iff the first ≥80% of
/// declared cues parse (have a recognisable timestamp line).
pub fn is_valid_subrip(content: &[u8]) -> bool {
    let text = String::from_utf8_lossy(content);
    let blocks: Vec<&str> = text
        .split("\n\n")
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .collect();

    if blocks.is_empty() {
        return false;
    }

    let parsed = blocks
        .iter()
        .filter(|block| block.lines().take(3).any(|line| TIMESTAMP_RE.is_match(line)))
        .count();

    (parsed as f64) / (blocks.len() as f64) >= 0.8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"1\n00:00:01,000 --> 00:00:02,000\nhi\n");
        let fixed = fix_line_ending(&bytes);
        assert!(!fixed.starts_with(&[0xEF, 0xBB, 0xBF]));
    }

    #[test]
    fn converts_crlf_and_lone_cr() {
        let fixed = fix_line_ending(b"a\r\nb\rc\n");
        assert_eq!(fixed, b"a\nb\nc\n");
    }

    #[test]
    fn fix_line_ending_is_idempotent() {
        let once = fix_line_ending(b"a\r\nb\rc\n");
        let twice = fix_line_ending(&once);
        assert_eq!(once, twice);
    }

    fn subrip_cue(n: u32) -> String {
        format!("{n}\n00:00:0{n},000 --> 00:00:0{n},500\nline {n}\n")
    }

    #[test]
    fn valid_subrip_passes() {
        let content = format!("{}\n{}\n{}\n", subrip_cue(1), subrip_cue(2), subrip_cue(3));
        assert!(is_valid_subrip(content.as_bytes()));
    }

    #[test]
    fn mostly_garbage_fails() {
        let content = format!("{}\ngarbage\n\nmore garbage\n\nnoise\n", subrip_cue(1));
        assert!(!is_valid_subrip(content.as_bytes()));
    }

    #[test]
    fn empty_content_is_invalid() {
        assert!(!is_valid_subrip(b""));
    }

    #[test]
    fn sniff_recognises_subrip() {
        let content = subrip_cue(1);
        assert_eq!(sniff_format(content.as_bytes()), SniffedFormat::SubRip);
    }
}
