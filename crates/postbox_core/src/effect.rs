use std::time::Duration;

use crate::entry::Entry;
use crate::prefs::PrefValue;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Write one preference to the store.
    PersistPreference { key: &'static str, value: PrefValue },
    /// Clear the cancel flag and run the batch.
    StartBatch(BatchPlan),
    /// Set the cancel flag.
    RequestStop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadMode {
    /// Keep the server-provided file name.
    Original,
    /// Name each file from the template.
    Renamed { template: String },
}

/// Everything the batch runner needs, fixed at start time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPlan {
    pub entries: Vec<Entry>,
    pub mode: DownloadMode,
    pub mark_read: bool,
    pub delay: Duration,
}
