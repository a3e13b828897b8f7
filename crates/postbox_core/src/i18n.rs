//! German and English user-facing strings.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\{(\w+)\}").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    De,
    #[default]
    En,
}

impl Lang {
    pub fn code(self) -> &'static str {
        match self {
            Lang::De => "de",
            Lang::En => "en",
        }
    }

    /// Parses a stored language code. Anything but `de`/`en` is rejected.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "de" => Some(Lang::De),
            "en" => Some(Lang::En),
            _ => None,
        }
    }

    /// Picks German for `de*` locales (e.g. `de_DE.UTF-8`), English otherwise.
    pub fn detect(locale: Option<&str>) -> Self {
        match locale {
            Some(value) if value.trim().to_ascii_lowercase().starts_with("de") => Lang::De,
            _ => Lang::En,
        }
    }

    /// Label shown for the "earliest" sentinel.
    pub fn start_label(self) -> &'static str {
        match self {
            Lang::De => "Anfang",
            Lang::En => "Start",
        }
    }

    /// Label shown for the "today" sentinel.
    pub fn today_label(self) -> &'static str {
        match self {
            Lang::De => "Heute",
            Lang::En => "Today",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKey {
    Title,
    FromLabel,
    ToLabel,
    FromPlaceholder,
    ToPlaceholder,
    MarkRead,
    CustomNames,
    FilenameLabel,
    FilenameTokens,
    DateFormatLabel,
    DateFormatTokens,
    SlowMode,
    ResetFilename,
    ResetDate,
    ResetAll,
    Start,
    Stop,
    Ready,
    LangLabel,
    StatusFilter,
    StatusStopRequested,
    StatusInvalidDate,
    StatusInvalidRange,
    StatusNoRange,
    StatusRunDone,
    StatusAborted,
    StatusRunning,
}

const FILENAME_TOKENS: &str = "Tokens: {date}, {date_iso}, {doctype}, {subject_complete}, {subject_text}, {isin}, {iban}, {ordernumber}, {account_number}, {index}";
const DATE_FORMAT_TOKENS: &str = "Tokens: YYYY, YY, MM, DD";

fn german(key: TextKey) -> &'static str {
    match key {
        TextKey::Title => "ING Post-Box Batch Downloader",
        TextKey::FromLabel => "Von (Datum)",
        TextKey::ToLabel => "Bis (Datum)",
        TextKey::FromPlaceholder => "Anfang oder 01.01.2023",
        TextKey::ToPlaceholder => "Heute oder 01.01.2025",
        TextKey::MarkRead => "Als gelesen markieren",
        TextKey::CustomNames => "Dateinamen umbenennen",
        TextKey::FilenameLabel => "Dateinamen-Template",
        TextKey::FilenameTokens => FILENAME_TOKENS,
        TextKey::DateFormatLabel => "Datumsformat",
        TextKey::DateFormatTokens => DATE_FORMAT_TOKENS,
        TextKey::SlowMode => "Slow Mode",
        TextKey::ResetFilename => "Dateinamen zuruecksetzen",
        TextKey::ResetDate => "Datumsformat zuruecksetzen",
        TextKey::ResetAll => "Alles auf Standard",
        TextKey::Start => "Start",
        TextKey::Stop => "Stop",
        TextKey::Ready => "Bereit.",
        TextKey::LangLabel => "Sprache",
        TextKey::StatusFilter => "Filter: {from} bis {to} (lade.)",
        TextKey::StatusStopRequested => "Stop angefordert.",
        TextKey::StatusInvalidDate => "Ungueltiges Datum bei \"{label}\": {value}",
        TextKey::StatusInvalidRange => "Ungueltiger Datumsbereich ({from} > {to}).",
        TextKey::StatusNoRange => "Keine Eintraege im Datumsbereich.",
        TextKey::StatusRunDone => "Durchlauf abgeschlossen.",
        TextKey::StatusAborted => "Abgebrochen.",
        TextKey::StatusRunning => "Laufend...",
    }
}

fn english(key: TextKey) -> &'static str {
    match key {
        TextKey::Title => "ING Post-Box Batch",
        TextKey::FromLabel => "From (date)",
        TextKey::ToLabel => "To (date)",
        TextKey::FromPlaceholder => "Start or 01.01.2023",
        TextKey::ToPlaceholder => "Today or 01.01.2025",
        TextKey::MarkRead => "Mark as read",
        TextKey::CustomNames => "Rename file names",
        TextKey::FilenameLabel => "Filename template",
        TextKey::FilenameTokens => FILENAME_TOKENS,
        TextKey::DateFormatLabel => "Date format",
        TextKey::DateFormatTokens => DATE_FORMAT_TOKENS,
        TextKey::SlowMode => "Slow mode",
        TextKey::ResetFilename => "Reset filename",
        TextKey::ResetDate => "Reset date format",
        TextKey::ResetAll => "Reset all",
        TextKey::Start => "Start",
        TextKey::Stop => "Stop",
        TextKey::Ready => "Ready.",
        TextKey::LangLabel => "Language",
        TextKey::StatusFilter => "Filter: {from} to {to} (loading.)",
        TextKey::StatusStopRequested => "Stop requested.",
        TextKey::StatusInvalidDate => "Invalid date in \"{label}\": {value}",
        TextKey::StatusInvalidRange => "Invalid date range ({from} > {to}).",
        TextKey::StatusNoRange => "No entries in date range.",
        TextKey::StatusRunDone => "Run finished.",
        TextKey::StatusAborted => "Aborted.",
        TextKey::StatusRunning => "Running...",
    }
}

/// Looks up the raw (unfilled) text for `key`.
pub fn text(lang: Lang, key: TextKey) -> &'static str {
    match lang {
        Lang::De => german(key),
        Lang::En => english(key),
    }
}

/// Replaces `{name}` placeholders with values from `ctx`; unknown names stay verbatim.
pub fn fill(template: &str, ctx: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            let name = &caps[1];
            ctx.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Looks up `key` in `lang` and fills its placeholders.
pub fn tr(lang: Lang, key: TextKey, ctx: &[(&str, &str)]) -> String {
    fill(text(lang, key), ctx)
}
