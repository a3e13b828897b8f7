use engine_logging::{engine_debug, engine_info};
use postbox_core::{BatchPlan, CancelFlag, Effect, PreferenceStore};

/// Applies the effects `update` asks for. A batch start is handed back to the
/// caller, which owns the async runtime.
pub struct EffectRunner {
    store: Box<dyn PreferenceStore>,
    cancel: CancelFlag,
    persist: bool,
}

impl EffectRunner {
    pub fn new(store: Box<dyn PreferenceStore>, cancel: CancelFlag) -> Self {
        Self {
            store,
            cancel,
            persist: true,
        }
    }

    /// Drops preference writes, for settings that apply to one invocation.
    pub fn without_persistence(mut self) -> Self {
        self.persist = false;
        self
    }

    pub fn store(&self) -> &dyn PreferenceStore {
        self.store.as_ref()
    }

    pub fn apply(&mut self, effects: Vec<Effect>) -> Option<BatchPlan> {
        let mut plan = None;
        for effect in effects {
            match effect {
                Effect::PersistPreference { key, value } => {
                    if self.persist {
                        engine_debug!("Persisting {} = {:?}", key, value);
                        self.store.set(key, value);
                    }
                }
                Effect::StartBatch(batch) => {
                    engine_info!("StartBatch entries={}", batch.entries.len());
                    self.cancel.clear();
                    plan = Some(batch);
                }
                Effect::RequestStop => {
                    engine_info!("RequestStop");
                    self.cancel.request();
                }
            }
        }
        plan
    }
}
