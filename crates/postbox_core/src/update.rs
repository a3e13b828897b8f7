use chrono::NaiveDate;

use crate::date::{DateRange, FilterError};
use crate::effect::{BatchPlan, DownloadMode};
use crate::entry::{Entry, RawEntry};
use crate::prefs::{
    keys, PrefValue, DEFAULT_DATE_FORMAT, DEFAULT_MARK_READ, DEFAULT_SLOW_MODE, DEFAULT_TEMPLATE,
    DEFAULT_USE_CUSTOM_NAMES,
};
use crate::{AppState, Effect, Msg, SessionState, Status};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FromChanged(value) => {
            state.set_from_input(value);
            Vec::new()
        }
        Msg::ToChanged(value) => {
            state.set_to_input(value);
            Vec::new()
        }
        Msg::TemplateChanged(value) => {
            state.prefs_mut().template = value.clone();
            vec![persist(keys::TEMPLATE, PrefValue::Text(value))]
        }
        Msg::DateFormatChanged(value) => {
            state.prefs_mut().date_format = value.clone();
            vec![persist(keys::DATE_FORMAT, PrefValue::Text(value))]
        }
        Msg::CustomNamesToggled(on) => {
            state.prefs_mut().use_custom_names = on;
            vec![persist(keys::USE_CUSTOM_NAMES, PrefValue::Flag(on))]
        }
        Msg::MarkReadToggled(on) => {
            state.prefs_mut().mark_read = on;
            vec![persist(keys::MARK_READ, PrefValue::Flag(on))]
        }
        Msg::SlowModeToggled(on) => {
            state.prefs_mut().slow_mode = on;
            vec![persist(keys::SLOW_MODE, PrefValue::Flag(on))]
        }
        Msg::LangSelected(lang) => {
            state.set_lang(lang);
            vec![persist(keys::LANG, PrefValue::Text(lang.code().to_string()))]
        }
        Msg::ResetTemplateClicked => {
            state.prefs_mut().template = DEFAULT_TEMPLATE.to_string();
            vec![persist(keys::TEMPLATE, PrefValue::Text(DEFAULT_TEMPLATE.to_string()))]
        }
        Msg::ResetDateFormatClicked => {
            state.prefs_mut().date_format = DEFAULT_DATE_FORMAT.to_string();
            vec![persist(
                keys::DATE_FORMAT,
                PrefValue::Text(DEFAULT_DATE_FORMAT.to_string()),
            )]
        }
        Msg::ResetAllClicked => {
            // Language is a separate choice and survives "reset all".
            let prefs = state.prefs_mut();
            prefs.template = DEFAULT_TEMPLATE.to_string();
            prefs.date_format = DEFAULT_DATE_FORMAT.to_string();
            prefs.use_custom_names = DEFAULT_USE_CUSTOM_NAMES;
            prefs.mark_read = DEFAULT_MARK_READ;
            prefs.slow_mode = DEFAULT_SLOW_MODE;
            vec![
                persist(keys::TEMPLATE, PrefValue::Text(DEFAULT_TEMPLATE.to_string())),
                persist(
                    keys::DATE_FORMAT,
                    PrefValue::Text(DEFAULT_DATE_FORMAT.to_string()),
                ),
                persist(keys::USE_CUSTOM_NAMES, PrefValue::Flag(DEFAULT_USE_CUSTOM_NAMES)),
                persist(keys::MARK_READ, PrefValue::Flag(DEFAULT_MARK_READ)),
                persist(keys::SLOW_MODE, PrefValue::Flag(DEFAULT_SLOW_MODE)),
            ]
        }
        Msg::DatesConfirmed { today } => {
            if state.session() != SessionState::Running {
                if let Err(err) = date_range(&state, today) {
                    state.set_status(err.into());
                }
            }
            Vec::new()
        }
        Msg::StartClicked { entries, today } => start(&mut state, entries, today),
        Msg::StopClicked => {
            if state.session() == SessionState::Running {
                state.set_status(Status::StopRequested);
                vec![Effect::RequestStop]
            } else {
                Vec::new()
            }
        }
        Msg::RunFinished { aborted } => {
            if state.session() == SessionState::Running {
                if aborted {
                    state.set_session(SessionState::Aborted);
                    state.set_status(Status::Aborted);
                } else {
                    state.set_session(SessionState::Completed);
                    state.set_status(Status::Finished);
                }
            }
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn date_range(state: &AppState, today: NaiveDate) -> Result<DateRange, FilterError> {
    DateRange::parse(state.from_input(), state.to_input(), state.prefs().lang, today)
}

fn persist(key: &'static str, value: PrefValue) -> Effect {
    Effect::PersistPreference { key, value }
}

/// Validates the date inputs, filters the selected rows and emits the plan.
///
/// Only one batch runs at a time; Start while running is ignored. Validation
/// failures and an empty selection leave the session idle with an error status.
fn start(state: &mut AppState, entries: Vec<RawEntry>, today: NaiveDate) -> Vec<Effect> {
    if state.session() == SessionState::Running {
        return Vec::new();
    }
    state.set_status(Status::Running);

    let range = match date_range(state, today) {
        Ok(range) => range,
        Err(err) => {
            state.set_session(SessionState::Idle);
            state.set_status(err.into());
            return Vec::new();
        }
    };
    state.set_status(Status::Filter {
        from: range.from.label.clone(),
        to: range.to.label.clone(),
    });

    let retained = range.retain(entries);
    if retained.is_empty() {
        state.set_session(SessionState::Idle);
        state.set_status(Status::NoEntries);
        return Vec::new();
    }

    let prefs = state.prefs();
    let plan = BatchPlan {
        entries: Entry::from_retained(&retained, &prefs.date_format),
        mode: if prefs.use_custom_names {
            DownloadMode::Renamed {
                template: prefs.template.clone(),
            }
        } else {
            DownloadMode::Original
        },
        mark_read: prefs.mark_read,
        delay: prefs.delay(),
    };
    state.set_session(SessionState::Running);
    vec![Effect::StartBatch(plan)]
}
