use std::sync::OnceLock;

use crate::prefcore_export;
use crate::validation::array::ArrayValidationOptions;

static CONFIG_INSTANCE: OnceLock<PipelineConfig> = OnceLock::new();

/// Build flavour of the host the pipeline runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum SettingsEnvironment {
    /// Unpacked or pre-release builds. Array items are validated strictly and the
    /// migration rule set is audited on boot.
    Development,
    /// Store builds. Validation always self-heals and never throws.
    Production,
}

impl SettingsEnvironment {
    /// Returns the string representation of the environment
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }

    /// Array item validation mode used by the bundled validation rules.
    #[must_use]
    pub const fn array_validation(&self) -> ArrayValidationOptions {
        match self {
            Self::Development => ArrayValidationOptions::strict(),
            Self::Production => ArrayValidationOptions::lenient(),
        }
    }

    /// Whether the boot sequence audits the migration rule set.
    #[must_use]
    pub const fn audits_rules(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl std::fmt::Display for SettingsEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Process-wide configuration of the settings pipeline.
#[derive(Debug, Clone, uniffi::Object)]
pub struct PipelineConfig {
    environment: SettingsEnvironment,
}

#[prefcore_export]
impl PipelineConfig {
    /// Creates a configuration for `environment`.
    ///
    /// ## Kotlin
    ///
    /// ```kotlin
    /// val config = PipelineConfig(SettingsEnvironment.PRODUCTION)
    /// ```
    #[uniffi::constructor]
    #[must_use]
    pub fn new(environment: SettingsEnvironment) -> Self {
        Self { environment }
    }

    /// Gets the configured environment
    #[must_use]
    pub fn environment(&self) -> SettingsEnvironment {
        self.environment
    }
}

/// Initializes the process-wide pipeline configuration.
///
/// Call once during startup, before the first boot. Later calls are ignored with a warning.
#[uniffi::export]
pub fn init_pipeline_config(environment: SettingsEnvironment) {
    match CONFIG_INSTANCE.set(PipelineConfig::new(environment)) {
        Ok(()) => {
            crate::info!("pipeline_config.initialized environment={environment}");
        }
        Err(_) => {
            crate::warn!("pipeline_config.already_initialized ignored={environment}");
        }
    }
}

/// Gets the configured environment, falling back to `Production` when
/// [`init_pipeline_config`] was never called.
#[must_use]
pub fn current_environment() -> SettingsEnvironment {
    CONFIG_INSTANCE.get().map_or_else(
        || {
            crate::debug!("pipeline_config.not_initialized defaulting=production");
            SettingsEnvironment::Production
        },
        PipelineConfig::environment,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_display() {
        assert_eq!(SettingsEnvironment::Development.as_str(), "development");
        assert_eq!(SettingsEnvironment::Production.to_string(), "production");
    }

    #[test]
    fn test_environment_selects_array_mode() {
        let production = SettingsEnvironment::Production.array_validation();
        assert!(production.continue_on_missing_keys);
        assert!(production.continue_on_array_type_mismatch);

        let development = SettingsEnvironment::Development.array_validation();
        assert!(!development.continue_on_missing_keys);
        assert!(!development.continue_on_array_type_mismatch);

        assert!(SettingsEnvironment::Development.audits_rules());
        assert!(!SettingsEnvironment::Production.audits_rules());
    }
}
