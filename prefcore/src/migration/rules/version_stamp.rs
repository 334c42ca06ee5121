use async_trait::async_trait;
use serde_json::Value;

use crate::migration::{MigrationArgs, MigrationError, MigrationRule, MigrationRuleMeta};
use crate::path;
use crate::version;

/// Copies the default template's version at `version_path` into the settings when the
/// stored one is lower or unreadable.
///
/// A stored version above the current one is left alone; downgrades are not supported.
pub struct VersionStampRule {
    meta: MigrationRuleMeta,
    version_path: String,
}

impl VersionStampRule {
    /// Creates the rule for the version declared at the dotted `version_path`.
    #[must_use]
    pub fn new(version_path: impl Into<String>) -> Self {
        let version_path = version_path.into();
        Self {
            meta: super::rule_meta(
                &version_path,
                "stamp",
                "record the schema version the settings were migrated to",
                (2023, 11, 6),
                "1.0.0",
            ),
            version_path,
        }
    }

    fn current_version<'a>(&self, default_values: &'a Value) -> Result<&'a str, MigrationError> {
        path::get(default_values, &self.version_path)
            .and_then(Value::as_str)
            .ok_or_else(|| MigrationError::MissingField {
                path: self.version_path.clone(),
            })
    }
}

#[async_trait]
impl MigrationRule for VersionStampRule {
    fn meta(&self) -> &MigrationRuleMeta {
        &self.meta
    }

    fn order(&self) -> i32 {
        i32::MAX
    }

    async fn condition(&self, args: &MigrationArgs) -> Result<bool, MigrationError> {
        let current = self.current_version(&args.default_values)?;

        let Some(stored) = path::get(&args.data, &self.version_path).and_then(Value::as_str) else {
            return Ok(true);
        };

        // An unreadable stored version is replaced rather than treated as a failure
        Ok(version::compare(stored, current).unwrap_or(1) > 0)
    }

    async fn execute(&self, args: MigrationArgs) -> Result<Value, MigrationError> {
        let MigrationArgs {
            mut data,
            default_values,
        } = args;

        let current = version::parse(self.current_version(&default_values)?)?;
        path::set(&mut data, &self.version_path, Value::String(current.to_string()));

        Ok(data)
    }
}
