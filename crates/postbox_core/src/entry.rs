use chrono::NaiveDate;
use serde::Serialize;

use crate::date::{format_date, format_date_iso, parse_entry_date};
use crate::tokens::{build_subject_text, extract_tokens, normalize_text, Tokens};

/// Raw field strings of one postbox row, as read by an [`EntrySource`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawEntry {
    pub doctype: String,
    pub subject: String,
    pub date_text: String,
    /// Absolute URL of the row's "Download" link, if any.
    pub download_url: Option<String>,
    /// Absolute URL that opens the message (and marks it read), if any.
    pub open_url: Option<String>,
    pub unread: bool,
}

/// Anything that can list postbox rows in page order.
pub trait EntrySource {
    fn entries(&self) -> Vec<RawEntry>;
}

impl EntrySource for Vec<RawEntry> {
    fn entries(&self) -> Vec<RawEntry> {
        self.clone()
    }
}

/// Keeps the rows at the given 1-based positions; an empty selection keeps all.
///
/// Page order is preserved regardless of the order of `positions`. Unknown
/// positions are ignored.
pub fn select_entries(entries: Vec<RawEntry>, positions: &[usize]) -> Vec<RawEntry> {
    if positions.is_empty() {
        return entries;
    }
    entries
        .into_iter()
        .enumerate()
        .filter(|(i, _)| positions.contains(&(i + 1)))
        .map(|(_, entry)| entry)
        .collect()
}

/// A retained row with everything the filename template can refer to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub index: usize,
    pub doctype: String,
    pub subject_complete: String,
    pub subject_text: String,
    /// Date rendered with the user's date format; empty if unparsable.
    pub date: String,
    pub date_iso: String,
    #[serde(skip)]
    pub parsed_date: Option<NaiveDate>,
    pub isin: String,
    pub iban: String,
    pub ordernumber: String,
    pub account_number: String,
    pub download_url: Option<String>,
    pub open_url: Option<String>,
    pub unread: bool,
}

impl Entry {
    pub fn from_raw(raw: &RawEntry, index: usize, date_format: &str) -> Self {
        let doctype = normalize_text(&raw.doctype);
        let subject_complete = normalize_text(&raw.subject);
        let parsed_date = parse_entry_date(&normalize_text(&raw.date_text));
        let tokens = extract_tokens(&subject_complete);
        let subject_text = build_subject_text(&subject_complete, &tokens);
        let Tokens {
            isin,
            iban,
            ordernumber,
            account_number,
        } = tokens;

        Self {
            index,
            doctype,
            subject_complete,
            subject_text,
            date: parsed_date
                .map(|d| format_date(d, date_format))
                .unwrap_or_default(),
            date_iso: parsed_date.map(format_date_iso).unwrap_or_default(),
            parsed_date,
            isin,
            iban,
            ordernumber,
            account_number,
            download_url: raw.download_url.clone().filter(|url| !url.is_empty()),
            open_url: raw.open_url.clone().filter(|url| !url.is_empty()),
            unread: raw.unread,
        }
    }

    /// Builds entries for retained rows, numbering them from 1.
    pub fn from_retained(rows: &[RawEntry], date_format: &str) -> Vec<Self> {
        rows.iter()
            .enumerate()
            .map(|(i, raw)| Self::from_raw(raw, i + 1, date_format))
            .collect()
    }

    /// Value for a filename placeholder, or `None` if the name is unknown.
    pub fn placeholder(&self, name: &str) -> Option<String> {
        let value = match name {
            "date" => self.date.clone(),
            "date_iso" => self.date_iso.clone(),
            "doctype" => self.doctype.clone(),
            "subject_complete" => self.subject_complete.clone(),
            "subject_text" => self.subject_text.clone(),
            "isin" => self.isin.clone(),
            "iban" => self.iban.clone(),
            "ordernumber" => self.ordernumber.clone(),
            "account_number" => self.account_number.clone(),
            "index" => self.index.to_string(),
            _ => return None,
        };
        Some(value)
    }
}
