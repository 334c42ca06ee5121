//! Boot sequence run by every entry surface on startup.
//!
//! `load → migrate → verify → persist`: the stored blob is upgraded by the
//! [`MigrationManager`], repaired by the [`SchemaValidator`] and written back when either
//! step changed it. The sequence never fails because of bad data; the only error it
//! reports is a storage medium that cannot be read or written.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use crate::migration::{rules, MigrateOptions, MigrationManager, MigrationReport, MigrationRule};
use crate::prefcore_export;
use crate::primitives::config::current_environment;
use crate::primitives::logger::{LogContext, Logger};
use crate::settings::{default_settings_at, validation_rules, version_rule};
use crate::validation::{SchemaValidator, ValidationRule, VerifyReport};

mod store;

pub use store::{SettingsStore, StoreError};

/// Errors that abort a boot
#[crate::prefcore_error]
pub enum BootError {
    /// The settings store could not be read or written
    #[error("settings store unavailable: {0}")]
    Store(#[from] StoreError),

    /// The repaired settings could not be serialized
    #[error("failed to serialize settings: {message}")]
    Serialization {
        /// The error message from `serde_json`
        message: String,
    },
}

impl From<serde_json::Error> for BootError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization {
            message: e.to_string(),
        }
    }
}

/// Configuration of one boot sequence
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct BootOptions {
    /// Key the settings blob is stored under
    pub storage_key: String,
    /// Stop migrating at the first failing rule
    pub fail_fast: bool,
    /// Dotted path of the declared schema version, guarded against regressions
    pub version_path: String,
}

impl Default for BootOptions {
    fn default() -> Self {
        Self {
            storage_key: "settings".to_string(),
            fail_fast: false,
            version_path: "version".to_string(),
        }
    }
}

/// Full result of [`SettingsBoot::run`]
#[derive(Debug)]
pub struct BootOutcome {
    /// The settings the application should use
    pub settings: Value,
    /// Migration report; `None` on first install or when the stored blob was unusable
    pub migration: Option<MigrationReport>,
    /// What the validator repaired
    pub verification: VerifyReport,
    /// Whether `settings` was written back to the store
    pub persisted: bool,
}

/// Foreign-facing digest of a [`BootOutcome`]
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct BootSummary {
    /// The settings as a JSON string
    pub settings_json: String,
    /// Targets of the migration rules that were applied
    pub applied_rules: Vec<String>,
    /// Number of migration rules that failed and were rolled back
    pub migration_errors: u32,
    /// Paths the validator replaced with their fallback
    pub repaired_paths: Vec<String>,
    /// The settings were reset to the defaults as a whole
    pub reset_to_defaults: bool,
    /// The settings were written back to the store
    pub persisted: bool,
}

impl BootSummary {
    fn from_outcome(outcome: &BootOutcome) -> Result<Self, BootError> {
        let (applied_rules, migration_errors) =
            outcome.migration.as_ref().map_or((Vec::new(), 0), |report| {
                (
                    report
                        .applied_rules
                        .iter()
                        .map(|meta| meta.target.clone())
                        .collect(),
                    u32::try_from(report.error_reports.len()).unwrap_or(u32::MAX),
                )
            });

        Ok(Self {
            settings_json: serde_json::to_string(&outcome.settings)?,
            applied_rules,
            migration_errors,
            repaired_paths: outcome.verification.repaired.clone(),
            reset_to_defaults: outcome.verification.reset_to_defaults,
            persisted: outcome.persisted,
        })
    }
}

/// Loads, migrates, repairs and persists the settings of one entry surface.
///
/// Each instance works on its own copy of the stored blob; concurrent boots from different
/// surfaces are independent and the store decides which write lands last.
#[derive(uniffi::Object)]
pub struct SettingsBoot {
    store: Arc<dyn SettingsStore>,
    options: BootOptions,
    defaults: Value,
    manager: MigrationManager,
    validator: SchemaValidator,
    validation_rules: Vec<ValidationRule>,
}

#[prefcore_export]
impl SettingsBoot {
    /// Creates a boot sequence over `store` with the bundled defaults and rule sets.
    ///
    /// `options` falls back to [`BootOptions::default`]. The defaults declare the current
    /// version at `version_path`, where the stamp rule writes it and the validator
    /// requires it.
    ///
    /// ## Kotlin
    ///
    /// ```kotlin
    /// val summary = SettingsBoot(PrefsSettingsStore(prefs), null).boot()
    /// val settings = JSONObject(summary.settingsJson)
    /// ```
    #[uniffi::constructor]
    pub fn new(store: Arc<dyn SettingsStore>, options: Option<BootOptions>) -> Arc<Self> {
        let options = options.unwrap_or_default();
        let defaults = default_settings_at(&options.version_path);
        let migration_rules = rules::default_rules(&options.version_path);
        let mut validation_rules = validation_rules();
        if options.version_path != "version" {
            validation_rules.push(version_rule(&options.version_path));
        }

        Arc::new(Self::with_parts(
            store,
            options,
            defaults,
            migration_rules,
            validation_rules,
        ))
    }

    /// Runs the boot sequence and returns a digest for the host.
    ///
    /// # Errors
    /// - `BootError::Store` if the store cannot be read or written
    /// - `BootError::Serialization` if the settings cannot be encoded
    pub async fn boot(&self) -> Result<BootSummary, BootError> {
        let outcome = self.run().await?;
        BootSummary::from_outcome(&outcome)
    }
}

impl SettingsBoot {
    /// Creates a boot sequence with explicit defaults and rule sets.
    #[must_use]
    pub fn with_parts(
        store: Arc<dyn SettingsStore>,
        options: BootOptions,
        defaults: Value,
        migration_rules: Vec<Arc<dyn MigrationRule>>,
        validation_rules: Vec<ValidationRule>,
    ) -> Self {
        let manager =
            MigrationManager::new(migration_rules).with_version_guard(options.version_path.clone());
        let validator = SchemaValidator::new(defaults.clone());

        Self {
            store,
            options,
            defaults,
            manager,
            validator,
            validation_rules,
        }
    }

    /// Routes migration and validation diagnostics to `logger`.
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.manager = self.manager.with_logger(logger.clone());
        self.validator = self.validator.with_logger(logger);
        self
    }

    /// Runs `load → migrate → verify → persist`.
    ///
    /// # Errors
    /// - `BootError::Store` if the store cannot be read or written
    /// - `BootError::Serialization` if the settings cannot be encoded
    pub async fn run(&self) -> Result<BootOutcome, BootError> {
        let boot_start_time = Utc::now();
        let environment = current_environment();

        // The logging context is thread-local, so it is only held between awaits
        let stored = {
            let _ctx = LogContext::new("SettingsBoot");
            crate::info!(
                "settings_boot.started key={} environment={} timestamp={}",
                self.options.storage_key,
                environment,
                boot_start_time.to_rfc3339()
            );

            if environment.audits_rules() {
                for finding in self.manager.audit_rules() {
                    crate::warn!("settings_boot.rule_audit finding={finding}");
                }
            }

            self.load()?
        };

        let migration = match &stored {
            Some(data) => Some(
                self.manager
                    .migrate(
                        data,
                        &self.defaults,
                        MigrateOptions {
                            fail_fast: self.options.fail_fast,
                        },
                    )
                    .await,
            ),
            None => None,
        };

        let _ctx = LogContext::new("SettingsBoot");
        let migrated = migration.as_ref().map(|report| &report.data);
        let verification = self.validator.verify(migrated, &self.validation_rules);

        let migration_succeeded = migration.as_ref().is_some_and(|report| report.is_succeeded);
        let persisted = migration_succeeded || verification.is_modified();
        if persisted {
            let serialized = serde_json::to_string(&verification.data)?;
            self.store
                .set(self.options.storage_key.clone(), serialized)?;
        }

        crate::info!(
            "settings_boot.completed migrated={} repaired={} reset={} persisted={} duration_ms={} timestamp={}",
            migration_succeeded,
            verification.repaired.len(),
            verification.reset_to_defaults,
            persisted,
            (Utc::now() - boot_start_time).num_milliseconds(),
            Utc::now().to_rfc3339()
        );

        Ok(BootOutcome {
            settings: verification.data.clone(),
            migration,
            verification,
            persisted,
        })
    }

    /// The stored settings object, or `None` when there is nothing usable to migrate.
    fn load(&self) -> Result<Option<Value>, BootError> {
        let key = self.options.storage_key.clone();

        let raw = match self.store.get(key) {
            Ok(raw) => raw,
            Err(StoreError::KeyNotFound) => {
                crate::info!("settings_boot.first_install key={}", self.options.storage_key);
                return Ok(None);
            }
            Err(StoreError::ParsingFailure) => {
                crate::warn!(
                    "settings_boot.unreadable key={} reason=store_parsing_failure",
                    self.options.storage_key
                );
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) if !map.is_empty() => Ok(Some(Value::Object(map))),
            Ok(other) => {
                crate::warn!(
                    "settings_boot.unreadable key={} reason=not_an_object found={}",
                    self.options.storage_key,
                    crate::version::json_type_name(&other)
                );
                Ok(None)
            }
            Err(e) => {
                crate::warn!(
                    "settings_boot.unreadable key={} reason=invalid_json error={e}",
                    self.options.storage_key
                );
                Ok(None)
            }
        }
    }
}
