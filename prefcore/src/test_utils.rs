//! Test utilities for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

use crate::boot::{SettingsStore, StoreError};
use crate::migration::{
    MigrationArgs, MigrationError, MigrationRule, MigrationRuleMeta, RuleVersionSpan,
};
use crate::primitives::logger::{LogLevel, Logger};

/// Logger that keeps every message for later assertions.
#[derive(Default)]
pub struct RecordingLogger {
    entries: Mutex<Vec<(LogLevel, String)>>,
}

impl RecordingLogger {
    /// Messages logged at `level`, in order.
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

/// Metadata stub for rules built in tests.
pub fn meta(target: &str, introduced: &str) -> MigrationRuleMeta {
    MigrationRuleMeta {
        author: "tests".to_string(),
        reason: format!("exercise {target}"),
        target: target.to_string(),
        action: "set".to_string(),
        authored: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        version: RuleVersionSpan {
            introduced: introduced.to_string(),
            obsoleted: None,
        },
    }
}

type ConditionFn = Box<dyn Fn(&Value) -> Result<bool, MigrationError> + Send + Sync>;
type ExecuteFn = Box<dyn Fn(Value) -> Result<Value, MigrationError> + Send + Sync>;

/// Migration rule assembled from closures over the settings value.
pub struct FnRule {
    meta: MigrationRuleMeta,
    order: i32,
    condition: ConditionFn,
    execute: ExecuteFn,
}

impl FnRule {
    pub fn new(
        meta: MigrationRuleMeta,
        order: i32,
        condition: impl Fn(&Value) -> Result<bool, MigrationError> + Send + Sync + 'static,
        execute: impl Fn(Value) -> Result<Value, MigrationError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            meta,
            order,
            condition: Box::new(condition),
            execute: Box::new(execute),
        }
    }
}

#[async_trait]
impl MigrationRule for FnRule {
    fn meta(&self) -> &MigrationRuleMeta {
        &self.meta
    }

    fn order(&self) -> i32 {
        self.order
    }

    async fn condition(&self, args: &MigrationArgs) -> Result<bool, MigrationError> {
        (self.condition)(&args.data)
    }

    async fn execute(&self, args: MigrationArgs) -> Result<Value, MigrationError> {
        // Yield once so rules behave like real deferred work
        tokio::task::yield_now().await;
        (self.execute)(args.data)
    }
}

/// In-memory implementation of [`SettingsStore`] with injectable failures.
#[derive(Default)]
pub struct InMemorySettingsStore {
    values: Mutex<HashMap<String, String>>,
    fail_get: Mutex<Option<fn() -> StoreError>>,
    fail_set: Mutex<Option<fn() -> StoreError>>,
    writes: Mutex<usize>,
}

impl InMemorySettingsStore {
    /// Store pre-seeded with `value` under `key`.
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::default();
        store
            .values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        store
    }

    /// Makes every `get` fail with the error built by `error`.
    pub fn failing_get(self, error: fn() -> StoreError) -> Self {
        *self.fail_get.lock().unwrap() = Some(error);
        self
    }

    /// Makes every `set` fail with the error built by `error`.
    pub fn failing_set(self, error: fn() -> StoreError) -> Self {
        *self.fail_set.lock().unwrap() = Some(error);
        self
    }

    /// Raw stored string under `key`.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    /// Number of successful `set` calls.
    pub fn writes(&self) -> usize {
        *self.writes.lock().unwrap()
    }
}

impl SettingsStore for InMemorySettingsStore {
    fn get(&self, key: String) -> Result<String, StoreError> {
        if let Some(error) = *self.fail_get.lock().unwrap() {
            return Err(error());
        }
        self.raw(&key).ok_or(StoreError::KeyNotFound)
    }

    fn set(&self, key: String, value: String) -> Result<(), StoreError> {
        if let Some(error) = *self.fail_set.lock().unwrap() {
            return Err(error());
        }
        self.values.lock().unwrap().insert(key, value);
        *self.writes.lock().unwrap() += 1;
        Ok(())
    }
}
