use chrono::NaiveDate;

use crate::entry::RawEntry;
use crate::i18n::Lang;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the "from" date input.
    FromChanged(String),
    /// User edited the "to" date input.
    ToChanged(String),
    TemplateChanged(String),
    DateFormatChanged(String),
    CustomNamesToggled(bool),
    MarkReadToggled(bool),
    SlowModeToggled(bool),
    LangSelected(Lang),
    ResetTemplateClicked,
    ResetDateFormatClicked,
    ResetAllClicked,
    /// Date inputs are final; report a bad date before any rows are loaded.
    DatesConfirmed { today: NaiveDate },
    /// User clicked Start with the currently selected rows.
    StartClicked {
        entries: Vec<RawEntry>,
        today: NaiveDate,
    },
    /// User clicked Stop.
    StopClicked,
    /// Batch runner returned.
    RunFinished { aborted: bool },
    NoOp,
}
