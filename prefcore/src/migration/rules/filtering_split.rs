use async_trait::async_trait;
use serde_json::Value;

use crate::migration::{MigrationArgs, MigrationError, MigrationRule, MigrationRuleMeta};
use crate::path;

const LEGACY_SWITCH: &str = "Filtering.enable";
const SPLIT_TARGETS: [&str; 2] = ["Filtering.Copy", "Filtering.Paste"];

/// Releases before 1.4.0 had one `Filtering.enable` switch for both copy and paste.
/// It becomes `Filtering.Copy.enable` and `Filtering.Paste.enable`, both carrying the
/// legacy value; the legacy key is removed.
pub struct FilteringSplitRule {
    meta: MigrationRuleMeta,
}

impl FilteringSplitRule {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self {
            meta: super::rule_meta(
                "Filtering",
                "split",
                "copy and paste filtering can be toggled independently",
                (2024, 3, 18),
                "1.4.0",
            ),
        }
    }
}

impl Default for FilteringSplitRule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MigrationRule for FilteringSplitRule {
    fn meta(&self) -> &MigrationRuleMeta {
        &self.meta
    }

    fn order(&self) -> i32 {
        10
    }

    async fn condition(&self, args: &MigrationArgs) -> Result<bool, MigrationError> {
        Ok(path::has(&args.data, LEGACY_SWITCH))
    }

    async fn execute(&self, args: MigrationArgs) -> Result<Value, MigrationError> {
        let MigrationArgs {
            mut data,
            default_values,
        } = args;

        let enabled = match path::remove(&mut data, LEGACY_SWITCH) {
            Some(Value::Bool(enabled)) => enabled,
            Some(other) => {
                return Err(MigrationError::InvalidData {
                    path: LEGACY_SWITCH.to_string(),
                    message: format!("expected a boolean, found {other}"),
                })
            }
            None => {
                return Err(MigrationError::MissingField {
                    path: LEGACY_SWITCH.to_string(),
                })
            }
        };

        for target in SPLIT_TARGETS {
            if !path::get(&data, target).is_some_and(Value::is_object) {
                let fallback = path::get(&default_values, target)
                    .cloned()
                    .ok_or_else(|| MigrationError::MissingField {
                        path: target.to_string(),
                    })?;
                path::set(&mut data, target, fallback);
            }
            path::set(&mut data, &format!("{target}.enable"), Value::Bool(enabled));
        }

        Ok(data)
    }
}
