use std::path::PathBuf;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use postbox_core::{BatchPlan, CancelFlag, DownloadMode, Entry, RawEntry};
use postbox_engine::{
    BatchRunner, DownloadError, DownloadRequest, Downloader, EngineEvent, MarkReadError,
    ProgressSink, ReadMarker, RunReport, SkipReason,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

/// Shared call log so the order of read marks and downloads is visible.
type Calls = Arc<Mutex<Vec<String>>>;

struct FakeDownloader {
    calls: Calls,
    /// Sets the flag once this many downloads have finished.
    cancel_after: Option<(usize, CancelFlag)>,
}

#[async_trait::async_trait]
impl Downloader for FakeDownloader {
    async fn download(&self, request: &DownloadRequest) -> Result<PathBuf, DownloadError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(format!(
            "download {} {}",
            request.index,
            request.file_name.as_deref().unwrap_or("<original>")
        ));
        let downloads = calls.iter().filter(|c| c.starts_with("download")).count();
        if let Some((limit, flag)) = &self.cancel_after {
            if downloads == *limit {
                flag.request();
            }
        }
        Ok(PathBuf::from(format!("/out/{}.pdf", request.index)))
    }
}

struct FakeMarker {
    calls: Calls,
    fail: bool,
}

#[async_trait::async_trait]
impl ReadMarker for FakeMarker {
    async fn mark_read(&self, entry: &Entry) -> Result<(), MarkReadError> {
        self.calls.lock().unwrap().push(format!("read {}", entry.index));
        if self.fail {
            Err(MarkReadError::NoTarget)
        } else {
            Ok(())
        }
    }
}

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<EngineEvent>>,
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn entries(count: usize) -> Vec<Entry> {
    let rows: Vec<RawEntry> = (1..=count)
        .map(|i| RawEntry {
            doctype: "Abrechnung".to_string(),
            subject: format!("Kauf {i}"),
            date_text: format!("{:02}.01.2024", i),
            download_url: Some(format!("https://bank.example/dl/{i}")),
            ..RawEntry::default()
        })
        .collect();
    Entry::from_retained(&rows, "YYYYMMDD")
}

fn plan(entries: Vec<Entry>, mode: DownloadMode, mark_read: bool) -> BatchPlan {
    BatchPlan {
        entries,
        mode,
        mark_read,
        delay: Duration::ZERO,
    }
}

struct Harness {
    calls: Calls,
    sink: Arc<RecordingSink>,
    runner: BatchRunner,
}

fn harness(cancel_after: Option<(usize, CancelFlag)>, marker_fails: bool) -> Harness {
    init_logging();
    let calls: Calls = Arc::default();
    let sink = Arc::new(RecordingSink::default());
    let runner = BatchRunner::new(
        Arc::new(FakeDownloader {
            calls: calls.clone(),
            cancel_after,
        }),
        Arc::new(FakeMarker {
            calls: calls.clone(),
            fail: marker_fails,
        }),
        sink.clone(),
    );
    Harness {
        calls,
        sink,
        runner,
    }
}

#[tokio::test]
async fn marks_read_before_each_download() {
    let h = harness(None, false);
    let report = h
        .runner
        .run(&plan(entries(2), DownloadMode::Original, true), &CancelFlag::new())
        .await;

    assert_eq!(
        *h.calls.lock().unwrap(),
        vec![
            "read 1",
            "download 1 <original>",
            "read 2",
            "download 2 <original>"
        ]
    );
    assert_eq!(
        report,
        RunReport {
            downloaded: 2,
            ..RunReport::default()
        }
    );
}

#[tokio::test]
async fn renamed_mode_requests_template_names() {
    let h = harness(None, false);
    let mode = DownloadMode::Renamed {
        template: "{date}_{doctype}_{subject_complete}".to_string(),
    };
    h.runner
        .run(&plan(entries(1), mode, false), &CancelFlag::new())
        .await;

    assert_eq!(
        *h.calls.lock().unwrap(),
        vec!["download 1 20240101_Abrechnung_Kauf 1.pdf"]
    );
}

#[tokio::test]
async fn stop_after_second_entry_leaves_rest_untouched() {
    let cancel = CancelFlag::new();
    let h = harness(Some((2, cancel.clone())), false);
    let report = h
        .runner
        .run(&plan(entries(5), DownloadMode::Original, true), &cancel)
        .await;

    assert_eq!(
        *h.calls.lock().unwrap(),
        vec![
            "read 1",
            "download 1 <original>",
            "read 2",
            "download 2 <original>"
        ]
    );
    assert_eq!(report.downloaded, 2);
    assert!(report.aborted);
    let started = h
        .sink
        .events
        .lock()
        .unwrap()
        .iter()
        .filter(|e| matches!(e, EngineEvent::EntryStarted { .. }))
        .count();
    assert_eq!(started, 2);
}

#[tokio::test]
async fn flag_set_before_start_does_nothing() {
    let cancel = CancelFlag::new();
    cancel.request();
    let h = harness(None, false);
    let report = h
        .runner
        .run(&plan(entries(3), DownloadMode::Original, true), &cancel)
        .await;

    assert!(h.calls.lock().unwrap().is_empty());
    assert!(report.aborted);
}

#[tokio::test]
async fn entry_without_download_link_is_skipped() {
    let mut list = entries(3);
    list[1].download_url = None;
    let h = harness(None, false);
    let report = h
        .runner
        .run(&plan(list, DownloadMode::Original, true), &CancelFlag::new())
        .await;

    assert_eq!(
        *h.calls.lock().unwrap(),
        vec![
            "read 1",
            "download 1 <original>",
            "read 3",
            "download 3 <original>"
        ]
    );
    assert_eq!(report.skipped, 1);
    assert!(h.sink.events.lock().unwrap().contains(&EngineEvent::Skipped {
        index: 2,
        reason: SkipReason::MissingDownloadTarget
    }));
}

#[tokio::test]
async fn mark_read_failure_does_not_stop_download() {
    let h = harness(None, true);
    let report = h
        .runner
        .run(&plan(entries(2), DownloadMode::Original, true), &CancelFlag::new())
        .await;

    assert_eq!(report.downloaded, 2);
    assert!(!report.aborted);
    let failures = h
        .sink
        .events
        .lock()
        .unwrap()
        .iter()
        .filter(|e| matches!(e, EngineEvent::MarkReadFailed { .. }))
        .count();
    assert_eq!(failures, 2);
}

#[tokio::test(start_paused = true)]
async fn waits_between_entries_only() {
    let h = harness(None, false);
    let mut batch = plan(entries(3), DownloadMode::Original, false);
    batch.delay = Duration::from_millis(1200);

    let started = tokio::time::Instant::now();
    h.runner.run(&batch, &CancelFlag::new()).await;
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(2400), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(3600), "{elapsed:?}");
}
