//! RON-file backed preference store.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use engine_logging::{engine_error, engine_info, engine_warn};
use postbox_core::{PrefValue, PreferenceStore};

use crate::persist::AtomicFileWriter;

pub const PREFERENCES_FILENAME: &str = "preferences.ron";

/// Keeps all preferences in memory and rewrites the file on every `set`.
///
/// Read and write failures are logged and never abort the caller: a broken
/// file behaves like an empty one.
#[derive(Debug)]
pub struct RonPreferenceStore {
    path: PathBuf,
    values: BTreeMap<String, PrefValue>,
}

impl RonPreferenceStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = load_values(&path);
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let Some(filename) = self.path.file_name().and_then(|name| name.to_str()) else {
            engine_error!("Preferences path {:?} has no usable file name", self.path);
            return;
        };

        let pretty = ron::ser::PrettyConfig::new();
        let content = match ron::ser::to_string_pretty(&self.values, pretty) {
            Ok(text) => text,
            Err(err) => {
                engine_error!("Failed to serialize preferences: {}", err);
                return;
            }
        };

        let writer = AtomicFileWriter::new(dir.to_path_buf());
        if let Err(err) = writer.write(filename, content.as_bytes()) {
            engine_error!("Failed to write preferences to {:?}: {}", self.path, err);
        }
    }
}

impl PreferenceStore for RonPreferenceStore {
    fn get(&self, key: &str) -> Option<PrefValue> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: PrefValue) {
        self.values.insert(key.to_string(), value);
        self.save();
    }
}

fn load_values(path: &Path) -> BTreeMap<String, PrefValue> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return BTreeMap::new();
        }
        Err(err) => {
            engine_warn!("Failed to read preferences from {:?}: {}", path, err);
            return BTreeMap::new();
        }
    };

    match ron::from_str(&content) {
        Ok(values) => {
            engine_info!("Loaded preferences from {:?}", path);
            values
        }
        Err(err) => {
            engine_warn!("Failed to parse preferences from {:?}: {}", path, err);
            BTreeMap::new()
        }
    }
}
