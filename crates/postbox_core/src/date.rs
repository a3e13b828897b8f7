//! Entry dates, user date formats and the from/to range filter.

use chrono::{Datelike, NaiveDate};
use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::entry::RawEntry;
use crate::i18n::{text, Lang, TextKey};
use crate::tokens::normalize_text;

lazy_static! {
    static ref DOTTED_DATE: Regex = Regex::new(r"^(\d{2})\.(\d{2})\.(\d{4})$").unwrap();
    static ref FORMAT_TOKEN: Regex = Regex::new(r"YYYY|YY|MM|DD").unwrap();
}

/// Parses the postbox date column (`DD.MM.YYYY`). Impossible dates are rejected.
pub fn parse_entry_date(text: &str) -> Option<NaiveDate> {
    let caps = DOTTED_DATE.captures(text)?;
    let day = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let year = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Renders `date` through a user format built from `YYYY`, `YY`, `MM` and `DD`.
pub fn format_date(date: NaiveDate, format: &str) -> String {
    let year = format!("{:04}", date.year());
    FORMAT_TOKEN
        .replace_all(format, |caps: &Captures| match &caps[0] {
            "YYYY" => year.clone(),
            "YY" => year[year.len() - 2..].to_string(),
            "MM" => format!("{:02}", date.month()),
            "DD" => format!("{:02}", date.day()),
            other => other.to_string(),
        })
        .into_owned()
}

pub fn format_date_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("invalid date in \"{label}\": {value}")]
    InvalidDate { label: String, value: String },
    #[error("invalid date range ({from} > {to})")]
    InvalidRange { from: String, to: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundSide {
    From,
    To,
}

impl BoundSide {
    fn field_label(self, lang: Lang) -> &'static str {
        match self {
            BoundSide::From => text(lang, TextKey::FromLabel),
            BoundSide::To => text(lang, TextKey::ToLabel),
        }
    }
}

/// A resolved boundary input and the label used in status messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    pub date: Option<NaiveDate>,
    pub label: String,
}

/// Resolves one boundary input.
///
/// Empty input, `start` and `anfang` mean "no bound"; `today` and `heute`
/// resolve to `today`. Sentinels are accepted on either side.
pub fn parse_bound(
    raw: &str,
    side: BoundSide,
    lang: Lang,
    today: NaiveDate,
) -> Result<Bound, FilterError> {
    let trimmed = raw.trim();
    match trimmed.to_lowercase().as_str() {
        "" | "start" | "anfang" => {
            return Ok(Bound {
                date: None,
                label: lang.start_label().to_string(),
            })
        }
        "today" | "heute" => {
            return Ok(Bound {
                date: Some(today),
                label: lang.today_label().to_string(),
            })
        }
        _ => {}
    }

    match parse_entry_date(trimmed) {
        Some(date) => Ok(Bound {
            date: Some(date),
            label: trimmed.to_string(),
        }),
        None => Err(FilterError::InvalidDate {
            label: side.field_label(lang).to_string(),
            value: raw.to_string(),
        }),
    }
}

/// Inclusive date range; a missing side is unconstrained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub from: Bound,
    pub to: Bound,
}

impl DateRange {
    /// Validates both inputs. The from side is checked first, then the to side,
    /// then their order.
    pub fn parse(from: &str, to: &str, lang: Lang, today: NaiveDate) -> Result<Self, FilterError> {
        let from = parse_bound(from, BoundSide::From, lang, today)?;
        let to = parse_bound(to, BoundSide::To, lang, today)?;
        if let (Some(lower), Some(upper)) = (from.date, to.date) {
            if lower > upper {
                return Err(FilterError::InvalidRange {
                    from: from.label,
                    to: to.label,
                });
            }
        }
        Ok(Self { from, to })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.date.is_none_or(|lower| date >= lower)
            && self.to.date.is_none_or(|upper| date <= upper)
    }

    /// Keeps entries whose date column parses and lies in range, in order.
    pub fn retain(&self, entries: Vec<RawEntry>) -> Vec<RawEntry> {
        entries
            .into_iter()
            .filter(|entry| {
                parse_entry_date(&normalize_text(&entry.date_text))
                    .is_some_and(|date| self.contains(date))
            })
            .collect()
    }
}
