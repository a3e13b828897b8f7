//! Postbox engine: page loading, downloads and the batch runner.
mod decode;
mod download;
mod fetch;
mod mark_read;
mod persist;
mod prefs_store;
mod runner;
mod source;
mod types;

pub use decode::{decode_page, DecodeError, DecodedPage};
pub use download::{
    content_disposition_filename, original_filename, DownloadError, DownloadRequest, Downloader,
    HttpDownloader,
};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use mark_read::{HttpReadMarker, MarkReadError, ReadMarker};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use prefs_store::{RonPreferenceStore, PREFERENCES_FILENAME};
pub use runner::{BatchRunner, LogProgressSink, ProgressSink};
pub use source::{HtmlEntrySource, SourceError};
pub use types::{
    EngineEvent, FailureKind, FetchError, FetchMetadata, FetchOutput, RunReport, SkipReason,
};
