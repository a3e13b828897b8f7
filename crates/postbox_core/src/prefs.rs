//! User preferences and the key-value store they persist to.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::i18n::Lang;

pub const DEFAULT_TEMPLATE: &str = "{date}_{doctype}_{subject_complete}";
pub const DEFAULT_DATE_FORMAT: &str = "YYYYMMDD";
pub const DEFAULT_USE_CUSTOM_NAMES: bool = true;
pub const DEFAULT_MARK_READ: bool = true;
pub const DEFAULT_SLOW_MODE: bool = true;

pub const SLOW_DELAY: Duration = Duration::from_millis(1200);
pub const FAST_DELAY: Duration = Duration::from_millis(400);

/// Store keys.
pub mod keys {
    pub const TEMPLATE: &str = "pb_template";
    pub const DATE_FORMAT: &str = "pb_date_format";
    pub const USE_CUSTOM_NAMES: &str = "pb_use_custom_names";
    pub const MARK_READ: &str = "pb_mark_read";
    pub const SLOW_MODE: &str = "pb_slow_mode";
    pub const LANG: &str = "pb_lang";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrefValue {
    Text(String),
    Flag(bool),
}

impl PrefValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PrefValue::Text(value) => Some(value),
            PrefValue::Flag(_) => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            PrefValue::Flag(value) => Some(*value),
            PrefValue::Text(_) => None,
        }
    }
}

/// String-keyed persistence for preferences.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<PrefValue>;
    fn set(&mut self, key: &str, value: PrefValue);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    values: BTreeMap<String, PrefValue>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<PrefValue> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: PrefValue) {
        self.values.insert(key.to_string(), value);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub template: String,
    pub date_format: String,
    pub use_custom_names: bool,
    pub mark_read: bool,
    pub slow_mode: bool,
    pub lang: Lang,
}

impl Preferences {
    /// Defaults with the given language.
    pub fn defaults(lang: Lang) -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            use_custom_names: DEFAULT_USE_CUSTOM_NAMES,
            mark_read: DEFAULT_MARK_READ,
            slow_mode: DEFAULT_SLOW_MODE,
            lang,
        }
    }

    /// Reads every key, using the documented default for missing or mistyped
    /// values. `fallback_lang` applies when no valid language is stored.
    pub fn load(store: &dyn PreferenceStore, fallback_lang: Lang) -> Self {
        let defaults = Self::defaults(fallback_lang);
        let text = |key: &str, default: String| {
            store
                .get(key)
                .and_then(|v| v.as_text().map(str::to_string))
                .unwrap_or(default)
        };
        let flag = |key: &str, default: bool| {
            store.get(key).and_then(|v| v.as_flag()).unwrap_or(default)
        };

        Self {
            template: text(keys::TEMPLATE, defaults.template),
            date_format: text(keys::DATE_FORMAT, defaults.date_format),
            use_custom_names: flag(keys::USE_CUSTOM_NAMES, defaults.use_custom_names),
            mark_read: flag(keys::MARK_READ, defaults.mark_read),
            slow_mode: flag(keys::SLOW_MODE, defaults.slow_mode),
            lang: store
                .get(keys::LANG)
                .and_then(|v| v.as_text().and_then(Lang::from_code))
                .unwrap_or(defaults.lang),
        }
    }

    /// Inter-entry delay selected by slow mode.
    pub fn delay(&self) -> Duration {
        if self.slow_mode {
            SLOW_DELAY
        } else {
            FAST_DELAY
        }
    }

    /// All values keyed for persistence.
    pub fn to_pairs(&self) -> Vec<(&'static str, PrefValue)> {
        vec![
            (keys::TEMPLATE, PrefValue::Text(self.template.clone())),
            (keys::DATE_FORMAT, PrefValue::Text(self.date_format.clone())),
            (keys::USE_CUSTOM_NAMES, PrefValue::Flag(self.use_custom_names)),
            (keys::MARK_READ, PrefValue::Flag(self.mark_read)),
            (keys::SLOW_MODE, PrefValue::Flag(self.slow_mode)),
            (keys::LANG, PrefValue::Text(self.lang.code().to_string())),
        ]
    }
}
