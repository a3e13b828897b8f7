//! Text forms of the panel's settings, as typed on the command line.

use anyhow::{anyhow, bail};
use postbox_core::{Lang, Msg};

/// Setting names accepted by `prefs set`.
pub const SETTING_NAMES: &[&str] = &[
    "template",
    "date-format",
    "custom-names",
    "mark-read",
    "slow-mode",
    "lang",
];

/// Turns `prefs set <name> <value>` into the message the panel would send.
pub fn setting_msg(name: &str, value: &str) -> anyhow::Result<Msg> {
    let msg = match name {
        "template" => Msg::TemplateChanged(value.to_string()),
        "date-format" => Msg::DateFormatChanged(value.to_string()),
        "custom-names" => Msg::CustomNamesToggled(parse_flag(value)?),
        "mark-read" => Msg::MarkReadToggled(parse_flag(value)?),
        "slow-mode" => Msg::SlowModeToggled(parse_flag(value)?),
        "lang" => Msg::LangSelected(parse_lang(value)?),
        other => bail!(
            "unknown setting {other:?}, expected one of: {}",
            SETTING_NAMES.join(", ")
        ),
    };
    Ok(msg)
}

pub fn parse_flag(value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" | "ja" => Ok(true),
        "false" | "off" | "no" | "0" | "nein" => Ok(false),
        other => bail!("expected on/off, got {other:?}"),
    }
}

pub fn parse_lang(value: &str) -> anyhow::Result<Lang> {
    Lang::from_code(value).ok_or_else(|| anyhow!("unsupported language {value:?}, use de or en"))
}

/// Settings given on the command line for a single run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub template: Option<String>,
    pub date_format: Option<String>,
    pub use_custom_names: Option<bool>,
    pub mark_read: Option<bool>,
    pub slow_mode: Option<bool>,
    pub lang: Option<Lang>,
}

impl Overrides {
    /// The messages that apply these settings, language first so the date
    /// inputs pick up its sentinel labels.
    pub fn messages(&self) -> Vec<Msg> {
        let mut msgs = Vec::new();
        if let Some(lang) = self.lang {
            msgs.push(Msg::LangSelected(lang));
        }
        if let Some(template) = &self.template {
            msgs.push(Msg::TemplateChanged(template.clone()));
        }
        if let Some(format) = &self.date_format {
            msgs.push(Msg::DateFormatChanged(format.clone()));
        }
        if let Some(on) = self.use_custom_names {
            msgs.push(Msg::CustomNamesToggled(on));
        }
        if let Some(on) = self.mark_read {
            msgs.push(Msg::MarkReadToggled(on));
        }
        if let Some(on) = self.slow_mode {
            msgs.push(Msg::SlowModeToggled(on));
        }
        msgs
    }
}

/// Collapses an `--x` / `--no-x` flag pair.
pub fn toggle(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}
