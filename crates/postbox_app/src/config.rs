//! Where preferences live and how the HTTP client is set up.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use postbox_core::Lang;
use postbox_engine::{FetchSettings, PREFERENCES_FILENAME};

const APP_DIR: &str = "postbox-batch";

/// `<config dir>/postbox-batch/preferences.ron`, or the working directory
/// when the platform has no config dir.
pub fn default_preferences_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(PREFERENCES_FILENAME)
}

pub fn preferences_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(default_preferences_path)
}

/// Language used when none is stored, from `LC_ALL` then `LANG`.
pub fn locale_lang() -> Lang {
    let locale = env::var("LC_ALL")
        .ok()
        .filter(|value| !value.is_empty())
        .or_else(|| env::var("LANG").ok());
    Lang::detect(locale.as_deref())
}

/// Session credentials for talking to the bank.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub cookie: Option<String>,
    pub cookie_file: Option<PathBuf>,
    pub user_agent: Option<String>,
}

impl Credentials {
    /// Base settings carrying the cookie and user agent. A cookie file wins
    /// over an inline cookie.
    pub fn fetch_settings(&self) -> anyhow::Result<FetchSettings> {
        let cookie = match &self.cookie_file {
            Some(path) => Some(
                fs::read_to_string(path)
                    .with_context(|| format!("failed to read cookie file {path:?}"))?
                    .trim()
                    .to_string(),
            ),
            None => self.cookie.clone(),
        };
        Ok(FetchSettings {
            cookie: cookie.filter(|value| !value.is_empty()),
            user_agent: self.user_agent.clone(),
            ..FetchSettings::default()
        })
    }
}
