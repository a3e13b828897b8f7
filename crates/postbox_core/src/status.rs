use crate::date::FilterError;
use crate::i18n::{tr, Lang, TextKey};

/// What the status line currently says. Rendered per language on demand.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Ready,
    Running,
    Filter {
        from: String,
        to: String,
    },
    StopRequested,
    InvalidDate {
        label: String,
        value: String,
    },
    InvalidRange {
        from: String,
        to: String,
    },
    NoEntries,
    Finished,
    Aborted,
}

impl Status {
    pub fn render(&self, lang: Lang) -> String {
        match self {
            Status::Ready => tr(lang, TextKey::Ready, &[]),
            Status::Running => tr(lang, TextKey::StatusRunning, &[]),
            Status::Filter { from, to } => {
                tr(lang, TextKey::StatusFilter, &[("from", from.as_str()), ("to", to.as_str())])
            }
            Status::StopRequested => tr(lang, TextKey::StatusStopRequested, &[]),
            Status::InvalidDate { label, value } => tr(
                lang,
                TextKey::StatusInvalidDate,
                &[("label", label.as_str()), ("value", value.as_str())],
            ),
            Status::InvalidRange { from, to } => {
                tr(lang, TextKey::StatusInvalidRange, &[("from", from.as_str()), ("to", to.as_str())])
            }
            Status::NoEntries => tr(lang, TextKey::StatusNoRange, &[]),
            Status::Finished => tr(lang, TextKey::StatusRunDone, &[]),
            Status::Aborted => tr(lang, TextKey::StatusAborted, &[]),
        }
    }

    /// Validation failures that block a run.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Status::InvalidDate { .. } | Status::InvalidRange { .. } | Status::NoEntries
        )
    }
}

impl From<FilterError> for Status {
    fn from(err: FilterError) -> Self {
        match err {
            FilterError::InvalidDate { label, value } => Status::InvalidDate { label, value },
            FilterError::InvalidRange { from, to } => Status::InvalidRange { from, to },
        }
    }
}
