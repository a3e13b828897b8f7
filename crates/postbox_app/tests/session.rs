use std::sync::Once;

use chrono::NaiveDate;
use postbox_app::effects::EffectRunner;
use postbox_app::session::Session;
use postbox_core::{
    keys, AppState, CancelFlag, Lang, MemoryStore, Msg, PrefValue, PreferenceStore, Preferences,
    RawEntry, SessionState,
};
use postbox_engine::RunReport;
use pretty_assertions::assert_eq;
use tokio::sync::mpsc;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn session(cancel: &CancelFlag) -> Session {
    init_logging();
    let effects = EffectRunner::new(Box::new(MemoryStore::new()), cancel.clone());
    Session::new(AppState::new(Preferences::defaults(Lang::En)), effects)
}

fn rows() -> Vec<RawEntry> {
    vec![RawEntry {
        doctype: "Kontoauszug".to_string(),
        subject: "Januar".to_string(),
        date_text: "15.01.2024".to_string(),
        download_url: Some("https://bank.example/dl/1".to_string()),
        ..RawEntry::default()
    }]
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

#[test]
fn setting_changes_reach_the_store() {
    let cancel = CancelFlag::new();
    let mut session = session(&cancel);

    session.dispatch(Msg::TemplateChanged("{date}_{isin}".to_string()));
    session.dispatch(Msg::SlowModeToggled(false));

    let store = session.effects().store();
    assert_eq!(
        store.get(keys::TEMPLATE),
        Some(PrefValue::Text("{date}_{isin}".to_string()))
    );
    assert_eq!(store.get(keys::SLOW_MODE), Some(PrefValue::Flag(false)));
}

#[test]
fn invocation_overrides_are_not_persisted() {
    init_logging();
    let effects =
        EffectRunner::new(Box::new(MemoryStore::new()), CancelFlag::new()).without_persistence();
    let mut session = Session::new(AppState::new(Preferences::defaults(Lang::En)), effects);

    session.dispatch(Msg::MarkReadToggled(false));

    assert!(!session.view().mark_read);
    assert_eq!(session.effects().store().get(keys::MARK_READ), None);
}

#[test]
fn start_hands_back_plan_and_stop_sets_flag() {
    let cancel = CancelFlag::new();
    cancel.request();
    let mut session = session(&cancel);

    let plan = session
        .dispatch(Msg::StartClicked {
            entries: rows(),
            today: today(),
        })
        .expect("batch starts");
    assert_eq!(plan.entries.len(), 1);
    assert!(!cancel.is_requested());
    assert_eq!(session.state().session(), SessionState::Running);

    assert_eq!(session.dispatch(Msg::StopClicked), None);
    assert!(cancel.is_requested());
}

#[test]
fn invalid_date_starts_nothing() {
    let cancel = CancelFlag::new();
    let mut session = session(&cancel);
    session.dispatch(Msg::FromChanged("31.02.2024".to_string()));

    let plan = session.dispatch(Msg::StartClicked {
        entries: rows(),
        today: today(),
    });

    assert_eq!(plan, None);
    assert!(session.state().status().is_error());
    assert_eq!(session.state().session(), SessionState::Idle);
}

#[test]
fn status_line_is_reported_once_per_change() {
    let cancel = CancelFlag::new();
    let mut session = session(&cancel);

    assert_eq!(session.take_status_change().as_deref(), Some("Ready."));
    assert_eq!(session.take_status_change(), None);

    session.dispatch(Msg::FromChanged("01.01.2024".to_string()));
    assert_eq!(session.take_status_change(), None);

    session.dispatch(Msg::StartClicked {
        entries: rows(),
        today: today(),
    });
    session.dispatch(Msg::RunFinished { aborted: true });
    assert_eq!(session.take_status_change().as_deref(), Some("Aborted."));
}

fn running_session(cancel: &CancelFlag) -> Session {
    let mut session = session(cancel);
    session.dispatch(Msg::StartClicked {
        entries: rows(),
        today: today(),
    });
    session.take_status_change();
    session
}

#[tokio::test]
async fn second_stop_abandons_the_batch() {
    let cancel = CancelFlag::new();
    let mut session = running_session(&cancel);
    let (stop_tx, mut stop_rx) = mpsc::unbounded_channel();
    stop_tx.send(()).unwrap();
    stop_tx.send(()).unwrap();

    let mut lines = Vec::new();
    let report = session
        .drive_batch(std::future::pending::<RunReport>(), &mut stop_rx, |line| {
            lines.push(line.to_string())
        })
        .await;

    assert_eq!(report, None);
    assert!(cancel.is_requested());
    assert_eq!(lines, vec!["Stop requested.".to_string()]);

    session.dispatch(Msg::RunFinished { aborted: true });
    assert_eq!(session.take_status_change().as_deref(), Some("Aborted."));
}

#[tokio::test]
async fn single_stop_lets_the_batch_finish() {
    let cancel = CancelFlag::new();
    let mut session = running_session(&cancel);
    let (stop_tx, mut stop_rx) = mpsc::unbounded_channel();
    stop_tx.send(()).unwrap();

    let flag = cancel.clone();
    let batch = async move {
        while !flag.is_requested() {
            tokio::task::yield_now().await;
        }
        RunReport {
            downloaded: 1,
            aborted: true,
            ..RunReport::default()
        }
    };
    let report = session.drive_batch(batch, &mut stop_rx, |_| {}).await;

    assert_eq!(
        report,
        Some(RunReport {
            downloaded: 1,
            aborted: true,
            ..RunReport::default()
        })
    );
}

#[tokio::test]
async fn closed_stop_channel_waits_for_the_batch() {
    let cancel = CancelFlag::new();
    let mut session = running_session(&cancel);
    let (stop_tx, mut stop_rx) = mpsc::unbounded_channel::<()>();
    drop(stop_tx);

    let batch = async {
        tokio::task::yield_now().await;
        RunReport::default()
    };
    let report = session.drive_batch(batch, &mut stop_rx, |_| {}).await;

    assert_eq!(report, Some(RunReport::default()));
    assert!(!cancel.is_requested());
}
