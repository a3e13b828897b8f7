use crate::prefs::Preferences;
use crate::status::Status;
use crate::view_model::AppViewModel;
use crate::Lang;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Running,
    Completed,
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    prefs: Preferences,
    from_input: String,
    to_input: String,
    session: SessionState,
    status: Status,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Preferences::defaults(Lang::default()))
    }
}

impl AppState {
    /// Fresh panel: date inputs show the localized "start"/"today" sentinels.
    pub fn new(prefs: Preferences) -> Self {
        let lang = prefs.lang;
        Self {
            prefs,
            from_input: lang.start_label().to_string(),
            to_input: lang.today_label().to_string(),
            session: SessionState::Idle,
            status: Status::Ready,
            dirty: false,
        }
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            session: self.session,
            lang: self.prefs.lang,
            status_line: self.status.render(self.prefs.lang),
            from_input: self.from_input.clone(),
            to_input: self.to_input.clone(),
            template: self.prefs.template.clone(),
            date_format: self.prefs.date_format.clone(),
            use_custom_names: self.prefs.use_custom_names,
            mark_read: self.prefs.mark_read,
            slow_mode: self.prefs.slow_mode,
            dirty: self.dirty,
        }
    }

    pub fn prefs(&self) -> &Preferences {
        &self.prefs
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn from_input(&self) -> &str {
        &self.from_input
    }

    pub fn to_input(&self) -> &str {
        &self.to_input
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn prefs_mut(&mut self) -> &mut Preferences {
        self.dirty = true;
        &mut self.prefs
    }

    pub(crate) fn set_status(&mut self, status: Status) {
        self.status = status;
        self.dirty = true;
    }

    pub(crate) fn set_session(&mut self, session: SessionState) {
        self.session = session;
        self.dirty = true;
    }

    pub(crate) fn set_from_input(&mut self, value: String) {
        self.from_input = value;
        self.dirty = true;
    }

    pub(crate) fn set_to_input(&mut self, value: String) {
        self.to_input = value;
        self.dirty = true;
    }

    /// Switches language, relabelling date inputs that still hold a sentinel.
    pub(crate) fn set_lang(&mut self, lang: Lang) {
        if is_start_sentinel(&self.from_input) {
            self.from_input = lang.start_label().to_string();
        }
        if is_today_sentinel(&self.to_input) {
            self.to_input = lang.today_label().to_string();
        }
        self.prefs.lang = lang;
        self.dirty = true;
    }
}

fn is_start_sentinel(value: &str) -> bool {
    value.is_empty() || value == Lang::De.start_label() || value == Lang::En.start_label()
}

fn is_today_sentinel(value: &str) -> bool {
    value.is_empty() || value == Lang::De.today_label() || value == Lang::En.today_label()
}
