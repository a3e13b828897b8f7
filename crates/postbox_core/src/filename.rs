use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::entry::Entry;

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"(?i)\{([a-z0-9_]+)\}").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    // Only suffixes containing a letter count as extensions, so dotted dates survive.
    static ref EXTENSION: Regex = Regex::new(r"\.[A-Za-z0-9]*[A-Za-z][A-Za-z0-9]*$").unwrap();
}

pub const DOCUMENT_EXTENSION: &str = "pdf";

/// Byte budget for a base name. Leaves room for ` (n).pdf` under the usual
/// 255-byte file name limit.
pub const MAX_BASE_BYTES: usize = 240;

/// Substitutes known placeholders with entry fields; unknown ones stay verbatim.
pub fn render_template(template: &str, entry: &Entry) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            entry
                .placeholder(&caps[1])
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Template-based filename `{base}.pdf`, or `None` when nothing usable remains.
pub fn build_filename(template: &str, entry: &Entry) -> Option<String> {
    let base = sanitize_base(&render_template(template, entry))?;
    Some(format!("{base}.{DOCUMENT_EXTENSION}"))
}

/// Name used when the template yields nothing usable.
pub fn fallback_filename(index: usize) -> String {
    format!("postbox_download_{index}.{DOCUMENT_EXTENSION}")
}

/// Template-based filename with the index fallback applied.
pub fn filename_for(template: &str, entry: &Entry) -> String {
    build_filename(template, entry).unwrap_or_else(|| fallback_filename(entry.index))
}

/// Makes `raw` safe as a base file name: unsafe characters become spaces,
/// whitespace collapses, existing extensions are stripped.
fn sanitize_base(raw: &str) -> Option<String> {
    let replaced: String = raw
        .chars()
        .map(|c| if is_forbidden(c) { ' ' } else { c })
        .collect();
    let mut base = WHITESPACE.replace_all(&replaced, " ").trim().to_string();

    let cut = truncate_utf8(&base, MAX_BASE_BYTES).len();
    base.truncate(cut);

    loop {
        base = base.trim_matches(&[' ', '.'][..]).to_string();
        match EXTENSION.find(&base) {
            Some(ext) => base.truncate(ext.start()),
            None => break,
        }
    }

    if base.is_empty() {
        return None;
    }
    if is_reserved_windows_name(&base) {
        base.push('_');
    }
    Some(base)
}

/// Longest prefix of `s` that fits in `max_bytes` without splitting a char.
pub fn truncate_utf8(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let end = s
        .char_indices()
        .map(|(i, _)| i)
        .take_while(|&i| i <= max_bytes)
        .last()
        .unwrap_or(0);
    &s[..end]
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}' | '\u{7F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
