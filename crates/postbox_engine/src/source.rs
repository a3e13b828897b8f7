//! Postbox rows read from the bank's inbox HTML.

use std::fs;
use std::path::PathBuf;

use engine_logging::{engine_debug, engine_info};
use postbox_core::{normalize_text, EntrySource, RawEntry};
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::decode::{decode_page, DecodeError};
use crate::fetch::Fetcher;
use crate::FetchError;

const ROW_SELECTOR: &str = ".ibbr-table-row.postbox-message, .ibbr-table-row.postbox-unread";
const DOCTYPE_SELECTOR: &str = ".postbox-grid-left > span:not(.postbox-indicator)";
const SUBJECT_SELECTOR: &str = ".postbox-grid-description";
const DATE_SELECTOR: &str = ".postbox-grid-right";
const UNREAD_CLASS: &str = "postbox-unread";
const DOWNLOAD_LINK_TEXT: &str = "Download";

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read page {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to fetch page: {0}")]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("invalid base url {0:?}")]
    InvalidBaseUrl(String),
}

struct RowSelectors {
    row: Selector,
    doctype: Selector,
    subject: Selector,
    date: Selector,
    link: Selector,
}

impl RowSelectors {
    fn new() -> Self {
        // Constant selectors, exercised by the parser tests.
        let parse = |css: &str| Selector::parse(css).expect("static selector");
        Self {
            row: parse(ROW_SELECTOR),
            doctype: parse(DOCTYPE_SELECTOR),
            subject: parse(SUBJECT_SELECTOR),
            date: parse(DATE_SELECTOR),
            link: parse("a[href]"),
        }
    }
}

/// Rows parsed once from a postbox page, in page order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlEntrySource {
    entries: Vec<RawEntry>,
}

impl HtmlEntrySource {
    /// Parses `html`. Relative links resolve against `base_url` when given and
    /// are kept verbatim otherwise.
    pub fn parse(html: &str, base_url: Option<&Url>) -> Self {
        let doc = Html::parse_document(html);
        let selectors = RowSelectors::new();
        let entries: Vec<RawEntry> = doc
            .select(&selectors.row)
            .map(|row| parse_row(row, &selectors, base_url))
            .collect();
        engine_debug!("Parsed {} postbox rows", entries.len());
        Self { entries }
    }

    /// Reads a page from a local file or an `http(s)` URL.
    ///
    /// For URLs the page address doubles as the base URL unless `base_url`
    /// overrides it.
    pub async fn load(
        location: &str,
        base_url: Option<&str>,
        fetcher: &dyn Fetcher,
    ) -> Result<Self, SourceError> {
        let explicit_base = base_url
            .map(|raw| Url::parse(raw).map_err(|_| SourceError::InvalidBaseUrl(raw.to_string())))
            .transpose()?;

        let remote = Url::parse(location)
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https"));

        let (decoded, base) = match remote {
            Some(url) => {
                engine_info!("Fetching postbox page {}", url);
                let output = fetcher.fetch(url.as_str()).await?;
                let decoded =
                    decode_page(&output.bytes, output.metadata.content_type.as_deref())?;
                let final_url = Url::parse(&output.metadata.final_url).unwrap_or(url);
                (decoded, Some(explicit_base.unwrap_or(final_url)))
            }
            None => {
                let path = PathBuf::from(location);
                engine_info!("Reading postbox page {:?}", path);
                let bytes = fs::read(&path).map_err(|source| SourceError::Io {
                    path: path.clone(),
                    source,
                })?;
                (decode_page(&bytes, None)?, explicit_base)
            }
        };
        engine_debug!("Page decoded as {}", decoded.encoding_label);

        Ok(Self::parse(&decoded.html, base.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl EntrySource for HtmlEntrySource {
    fn entries(&self) -> Vec<RawEntry> {
        self.entries.clone()
    }
}

fn parse_row(row: ElementRef<'_>, selectors: &RowSelectors, base_url: Option<&Url>) -> RawEntry {
    let text_of = |selector: &Selector| {
        row.select(selector)
            .next()
            .map(|el| normalize_text(&el.text().collect::<String>()))
            .unwrap_or_default()
    };

    let mut download_url = None;
    let mut open_url = None;
    for link in row.select(&selectors.link) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let label = normalize_text(&link.text().collect::<String>());
        if label == DOWNLOAD_LINK_TEXT {
            if download_url.is_none() {
                download_url = Some(resolve(href, base_url));
            }
        } else if open_url.is_none() && is_navigable(href) {
            open_url = Some(resolve(href, base_url));
        }
    }

    RawEntry {
        doctype: text_of(&selectors.doctype),
        subject: text_of(&selectors.subject),
        date_text: text_of(&selectors.date),
        download_url,
        open_url,
        unread: row.value().classes().any(|class| class == UNREAD_CLASS),
    }
}

fn is_navigable(href: &str) -> bool {
    let href = href.trim();
    !href.is_empty()
        && !href.starts_with('#')
        && !href.to_ascii_lowercase().starts_with("javascript:")
}

fn resolve(href: &str, base_url: Option<&Url>) -> String {
    let href = href.trim();
    match base_url {
        Some(base) => base
            .join(href)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| href.to_string()),
        None => href.to_string(),
    }
}
