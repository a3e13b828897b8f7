use std::future::Future;

use engine_logging::engine_warn;
use postbox_core::{update, AppState, AppViewModel, BatchPlan, Msg};
use postbox_engine::RunReport;
use tokio::sync::mpsc;

use crate::effects::EffectRunner;

/// Owns the panel state and feeds every message through `update`.
pub struct Session {
    state: AppState,
    effects: EffectRunner,
    render_pending: bool,
    last_status: Option<String>,
}

impl Session {
    pub fn new(state: AppState, effects: EffectRunner) -> Self {
        Self {
            state,
            effects,
            render_pending: true,
            last_status: None,
        }
    }

    /// Runs one message. Returns the plan when the message started a batch.
    pub fn dispatch(&mut self, msg: Msg) -> Option<BatchPlan> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            self.render_pending = true;
        }
        self.state = state;
        self.effects.apply(effects)
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn effects(&self) -> &EffectRunner {
        &self.effects
    }

    /// The localized status line, if it changed since the last call.
    pub fn take_status_change(&mut self) -> Option<String> {
        if !std::mem::take(&mut self.render_pending) {
            return None;
        }
        let line = self.state.view().status_line;
        if self.last_status.as_deref() == Some(line.as_str()) {
            return None;
        }
        self.last_status = Some(line.clone());
        Some(line)
    }

    /// Awaits `batch` while turning stop requests into `StopClicked`.
    ///
    /// The first stop lets the current entry finish. A second one abandons
    /// the batch and returns `None`. `on_status` sees each new status line.
    pub async fn drive_batch<F>(
        &mut self,
        batch: F,
        stops: &mut mpsc::UnboundedReceiver<()>,
        mut on_status: impl FnMut(&str),
    ) -> Option<RunReport>
    where
        F: Future<Output = RunReport>,
    {
        tokio::pin!(batch);
        let mut stop_count = 0;
        loop {
            tokio::select! {
                report = &mut batch => return Some(report),
                stop = stops.recv(), if stop_count < 2 => {
                    if stop.is_none() {
                        // Sender gone: nothing can stop the batch any more.
                        stop_count = 2;
                        continue;
                    }
                    stop_count += 1;
                    if stop_count == 1 {
                        self.dispatch(Msg::StopClicked);
                        if let Some(line) = self.take_status_change() {
                            on_status(&line);
                        }
                    } else {
                        engine_warn!("Second stop, abandoning the current download");
                        return None;
                    }
                }
            }
        }
    }
}
