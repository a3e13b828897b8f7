use crate::{Lang, SessionState};

/// Everything a front end shows, with the status line already localized.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub session: SessionState,
    pub lang: Lang,
    pub status_line: String,
    pub from_input: String,
    pub to_input: String,
    pub template: String,
    pub date_format: String,
    pub use_custom_names: bool,
    pub mark_read: bool,
    pub slow_mode: bool,
    pub dirty: bool,
}
