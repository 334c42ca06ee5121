use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use prefcore::boot::{SettingsStore, StoreError};
use prefcore::primitives::logger::{LogLevel, Logger};
use prefcore::{path, settings};
use serde_json::{json, Value};

/// Store backed by a `HashMap`, standing in for the extension's storage area.
#[derive(Default)]
pub struct InMemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl InMemoryStore {
    #[allow(dead_code)]
    pub fn seeded(value: &Value) -> Arc<Self> {
        let store = Self::default();
        store
            .values
            .lock()
            .unwrap()
            .insert("settings".to_string(), value.to_string());
        Arc::new(store)
    }

    #[allow(dead_code)]
    pub fn settings(&self) -> Option<Value> {
        self.values
            .lock()
            .unwrap()
            .get("settings")
            .map(|raw| serde_json::from_str(raw).unwrap())
    }
}

impl SettingsStore for InMemoryStore {
    fn get(&self, key: String) -> Result<String, StoreError> {
        self.values
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .ok_or(StoreError::KeyNotFound)
    }

    fn set(&self, key: String, value: String) -> Result<(), StoreError> {
        self.values.lock().unwrap().insert(key, value);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingLogger {
    entries: Mutex<Vec<(LogLevel, String)>>,
}

impl RecordingLogger {
    #[allow(dead_code)]
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl Logger for RecordingLogger {
    fn log(&self, level: LogLevel, message: String) {
        self.entries.lock().unwrap().push((level, message));
    }
}

/// Settings as written by release 1.3.0: one global filtering switch, no task control.
#[allow(dead_code)]
pub fn legacy_settings() -> Value {
    let mut legacy = settings::default_settings();
    path::set(&mut legacy, "version", json!("1.3.0"));
    path::remove(&mut legacy, "Tab.TaskControl");
    path::remove(&mut legacy, "Filtering.Copy.enable");
    path::remove(&mut legacy, "Filtering.Paste.enable");
    path::set(&mut legacy, "Filtering.enable", json!(true));
    legacy
}
