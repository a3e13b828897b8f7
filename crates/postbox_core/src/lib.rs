//! Postbox core: subject parsing, date filtering, file naming, preferences
//! and the pure control-panel state machine.
mod cancel;
mod date;
mod effect;
mod entry;
mod filename;
mod i18n;
mod msg;
mod prefs;
mod state;
mod status;
mod tokens;
mod update;
mod view_model;

pub use cancel::CancelFlag;
pub use date::{
    format_date, format_date_iso, parse_bound, parse_entry_date, Bound, BoundSide, DateRange,
    FilterError,
};
pub use effect::{BatchPlan, DownloadMode, Effect};
pub use entry::{select_entries, Entry, EntrySource, RawEntry};
pub use filename::{
    build_filename, fallback_filename, filename_for, render_template, truncate_utf8,
    DOCUMENT_EXTENSION, MAX_BASE_BYTES,
};
pub use i18n::{fill, text, tr, Lang, TextKey};
pub use msg::Msg;
pub use prefs::{
    keys, MemoryStore, PrefValue, PreferenceStore, Preferences, DEFAULT_DATE_FORMAT,
    DEFAULT_MARK_READ, DEFAULT_SLOW_MODE, DEFAULT_TEMPLATE, DEFAULT_USE_CUSTOM_NAMES, FAST_DELAY,
    SLOW_DELAY,
};
pub use state::{AppState, SessionState};
pub use status::Status;
pub use tokens::{build_subject_text, extract_tokens, normalize_text, Tokens};
pub use update::update;
pub use view_model::AppViewModel;
