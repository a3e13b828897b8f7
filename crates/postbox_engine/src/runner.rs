use std::sync::Arc;

use engine_logging::{engine_debug, engine_info, engine_warn};
use postbox_core::{filename_for, BatchPlan, CancelFlag, DownloadMode, Entry};

use crate::download::{DownloadRequest, Downloader};
use crate::mark_read::ReadMarker;
use crate::{EngineEvent, RunReport, SkipReason};

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

/// Writes every event to the log.
pub struct LogProgressSink;

impl ProgressSink for LogProgressSink {
    fn emit(&self, event: EngineEvent) {
        match event {
            EngineEvent::EntryStarted { index, total } => {
                engine_info!("Entry {}/{}", index, total)
            }
            EngineEvent::MarkedRead { index } => engine_debug!("Entry {} marked read", index),
            EngineEvent::MarkReadFailed { index, reason } => {
                engine_debug!("Entry {} not marked read: {}", index, reason)
            }
            EngineEvent::Downloaded { index, path } => {
                engine_info!("Entry {} saved to {:?}", index, path)
            }
            EngineEvent::DownloadFailed { index, reason } => {
                engine_warn!("Entry {} download failed: {}", index, reason)
            }
            EngineEvent::Skipped { index, reason } => {
                engine_warn!("Entry {} skipped: {:?}", index, reason)
            }
        }
    }
}

/// Processes a plan one entry at a time.
///
/// The cancel flag is checked before each entry and never interrupts an
/// entry already in progress.
pub struct BatchRunner {
    downloader: Arc<dyn Downloader>,
    marker: Arc<dyn ReadMarker>,
    sink: Arc<dyn ProgressSink>,
}

impl BatchRunner {
    pub fn new(
        downloader: Arc<dyn Downloader>,
        marker: Arc<dyn ReadMarker>,
        sink: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            downloader,
            marker,
            sink,
        }
    }

    pub async fn run(&self, plan: &BatchPlan, cancel: &CancelFlag) -> RunReport {
        let total = plan.entries.len();
        let mut report = RunReport::default();
        engine_info!("Starting batch of {} entries", total);

        for (position, entry) in plan.entries.iter().enumerate() {
            if cancel.is_requested() {
                engine_info!("Stop requested, {} entries left", total - position);
                break;
            }
            self.sink.emit(EngineEvent::EntryStarted {
                index: entry.index,
                total,
            });

            let Some(url) = entry.download_url.clone() else {
                report.skipped += 1;
                self.sink.emit(EngineEvent::Skipped {
                    index: entry.index,
                    reason: SkipReason::MissingDownloadTarget,
                });
                continue;
            };

            if plan.mark_read {
                self.mark_read(entry).await;
            }

            let request = DownloadRequest {
                index: entry.index,
                url,
                file_name: requested_name(&plan.mode, entry),
            };
            match self.downloader.download(&request).await {
                Ok(path) => {
                    report.downloaded += 1;
                    self.sink.emit(EngineEvent::Downloaded {
                        index: entry.index,
                        path,
                    });
                }
                Err(err) => {
                    report.failed += 1;
                    self.sink.emit(EngineEvent::DownloadFailed {
                        index: entry.index,
                        reason: err.to_string(),
                    });
                }
            }

            if position + 1 < total && !plan.delay.is_zero() {
                tokio::time::sleep(plan.delay).await;
            }
        }

        report.aborted = cancel.is_requested();
        engine_info!(
            "Batch done: {} downloaded, {} skipped, {} failed{}",
            report.downloaded,
            report.skipped,
            report.failed,
            if report.aborted { ", aborted" } else { "" }
        );
        report
    }

    async fn mark_read(&self, entry: &Entry) {
        match self.marker.mark_read(entry).await {
            Ok(()) => self.sink.emit(EngineEvent::MarkedRead { index: entry.index }),
            Err(err) => self.sink.emit(EngineEvent::MarkReadFailed {
                index: entry.index,
                reason: err.to_string(),
            }),
        }
    }
}

fn requested_name(mode: &DownloadMode, entry: &Entry) -> Option<String> {
    match mode {
        DownloadMode::Original => None,
        DownloadMode::Renamed { template } => Some(filename_for(template, entry)),
    }
}
