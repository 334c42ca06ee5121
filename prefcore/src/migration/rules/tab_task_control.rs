use async_trait::async_trait;
use serde_json::Value;

use crate::migration::{MigrationArgs, MigrationError, MigrationRule, MigrationRuleMeta};
use crate::path;

const TARGET: &str = "Tab.TaskControl";

/// Adds the `Tab.TaskControl` block from the defaults to settings that predate it.
pub struct TabTaskControlRule {
    meta: MigrationRuleMeta,
}

impl TabTaskControlRule {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self {
            meta: super::rule_meta(
                TARGET,
                "add",
                "tab copy gained per-task window and pinning controls",
                (2024, 4, 2),
                "1.4.0",
            ),
        }
    }
}

impl Default for TabTaskControlRule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MigrationRule for TabTaskControlRule {
    fn meta(&self) -> &MigrationRuleMeta {
        &self.meta
    }

    fn order(&self) -> i32 {
        20
    }

    async fn condition(&self, args: &MigrationArgs) -> Result<bool, MigrationError> {
        Ok(!path::has(&args.data, TARGET))
    }

    async fn execute(&self, args: MigrationArgs) -> Result<Value, MigrationError> {
        let MigrationArgs {
            mut data,
            default_values,
        } = args;

        let task_control = path::get(&default_values, TARGET).cloned().ok_or_else(|| {
            MigrationError::MissingField {
                path: TARGET.to_string(),
            }
        })?;
        path::set(&mut data, TARGET, task_control);

        Ok(data)
    }
}
