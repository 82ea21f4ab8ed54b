//! Subtitle path derivation (§6).

use std::path::PathBuf;

use crate::language::Language;

/// `<stem>.<lang-suffix>.<ext>` where `lang-suffix` is the IETF tag for
/// non-undefined languages and empty otherwise; `ext` defaults to `.srt`.
pub fn get_subtitle_path(video_name: &str, language: Option<&Language>) -> PathBuf {
    let stem = strip_extension(video_name);
    let include_suffix = language.map(|l| !l.is_undefined()).unwrap_or(false);

    match (include_suffix, language) {
        (true, Some(lang)) => PathBuf::from(format!("{stem}.{}.srt", lang.to_ietf())),
        _ => PathBuf::from(format!("{stem}.srt")),
    }
}

/// Strip the final `.ext` from `name`, leaving any directory components
/// (and earlier dots, e.g. in `Show.S01E02`) untouched.
fn strip_extension(name: &str) -> &str {
    let file_start = name.rfind(['/', '\\']).map(|i| i + 1).unwrap_or(0);
    match name[file_start..].rfind('.') {
        Some(rel_idx) if rel_idx > 0 => &name[..file_start + rel_idx],
        _ => name,
    }
}
