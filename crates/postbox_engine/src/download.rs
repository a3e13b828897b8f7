use std::path::PathBuf;
use std::sync::Arc;

use engine_logging::engine_debug;
use postbox_core::{fallback_filename, truncate_utf8, MAX_BASE_BYTES};
use url::Url;

use crate::fetch::Fetcher;
use crate::persist::{AtomicFileWriter, PersistError};
use crate::{FetchError, FetchMetadata};

/// One document to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    /// 1-based position in the batch, used for the fallback name.
    pub index: usize,
    pub url: String,
    /// Target name; `None` keeps the server-provided name.
    pub file_name: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("failed to save document: {0}")]
    Persist(#[from] PersistError),
}

#[async_trait::async_trait]
pub trait Downloader: Send + Sync {
    /// Fetches the document and returns where it was saved.
    async fn download(&self, request: &DownloadRequest) -> Result<PathBuf, DownloadError>;
}

/// Saves documents into one directory, never overwriting existing files.
pub struct HttpDownloader {
    fetcher: Arc<dyn Fetcher>,
    writer: AtomicFileWriter,
}

impl HttpDownloader {
    pub fn new(fetcher: Arc<dyn Fetcher>, output_dir: PathBuf) -> Self {
        Self {
            fetcher,
            writer: AtomicFileWriter::new(output_dir),
        }
    }
}

#[async_trait::async_trait]
impl Downloader for HttpDownloader {
    async fn download(&self, request: &DownloadRequest) -> Result<PathBuf, DownloadError> {
        let output = self.fetcher.fetch(&request.url).await?;
        let name = match request.file_name.as_deref() {
            Some(name) => name.to_string(),
            None => original_filename(&output.metadata, request.index),
        };
        engine_debug!("Saving {} bytes as {:?}", output.metadata.byte_len, name);
        Ok(self.writer.write_new(&name, &output.bytes)?)
    }
}

/// Server-provided file name: `Content-Disposition`, then the last path
/// segment of the final URL, then the index fallback.
pub fn original_filename(metadata: &FetchMetadata, index: usize) -> String {
    metadata
        .content_disposition
        .as_deref()
        .and_then(content_disposition_filename)
        .and_then(|name| sanitize_original(&name))
        .or_else(|| url_filename(&metadata.final_url))
        .unwrap_or_else(|| fallback_filename(index))
}

fn url_filename(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    let segment = url.path_segments()?.next_back()?;
    let decoded = percent_decode(segment);
    // A bare endpoint like `/download` carries no usable document name.
    if !decoded.contains('.') {
        return None;
    }
    sanitize_original(&decoded)
}

/// Keeps only the final path component, replaces unsafe characters and
/// shortens the stem so the name fits the file name byte limit.
fn sanitize_original(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| match c {
            ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = fit_name(cleaned.trim().trim_matches('.'));
    (!cleaned.is_empty()).then_some(cleaned)
}

fn fit_name(name: &str) -> String {
    let max_bytes = MAX_BASE_BYTES + 4;
    if name.len() <= max_bytes {
        return name.to_string();
    }
    let (stem, ext) = match name.rfind('.') {
        Some(pos) if pos > 0 && name.len() - pos <= 16 => name.split_at(pos),
        _ => (name, ""),
    };
    let stem = truncate_utf8(stem, max_bytes - ext.len()).trim_end();
    format!("{stem}{ext}")
}

/// Extracts the filename from a raw `Content-Disposition` header value.
///
/// `filename*=UTF-8''...` (RFC 5987) takes precedence over `filename=`.
pub fn content_disposition_filename(header_value: &str) -> Option<String> {
    let mut plain: Option<String> = None;

    for param in header_value.split(';') {
        let Some((name, value)) = param.trim().split_once('=') else {
            continue;
        };
        let name = name.trim().to_ascii_lowercase();
        let value = value.trim();

        if name == "filename*" {
            let encoded = value
                .strip_prefix("UTF-8''")
                .or_else(|| value.strip_prefix("utf-8''"));
            if let Some(encoded) = encoded {
                let decoded = percent_decode(encoded);
                if !decoded.is_empty() {
                    return Some(decoded);
                }
            }
        } else if name == "filename" {
            let unquoted = match value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
                Some(inner) => inner.replace("\\\"", "\"").replace("\\\\", "\\"),
                None => value.to_string(),
            };
            if !unquoted.is_empty() {
                plain = Some(unquoted);
            }
        }
    }

    plain
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(high), Some(low)) = (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                out.push(high << 4 | low);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
