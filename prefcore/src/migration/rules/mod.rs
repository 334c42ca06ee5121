use std::sync::Arc;

use chrono::NaiveDate;

use crate::migration::{MigrationRule, MigrationRuleMeta, RuleVersionSpan};

/// Splits the legacy global filtering switch into per-action switches.
pub mod filtering_split;
/// Adds the `Tab.TaskControl` block introduced in 1.4.0.
pub mod tab_task_control;
/// Stamps the current settings version. Always runs last.
pub mod version_stamp;

pub use filtering_split::FilteringSplitRule;
pub use tab_task_control::TabTaskControlRule;
pub use version_stamp::VersionStampRule;

/// The rules shipped with this release, in registration order.
///
/// The version stamp writes the schema version at `version_path`.
#[must_use]
pub fn default_rules(version_path: &str) -> Vec<Arc<dyn MigrationRule>> {
    vec![
        Arc::new(FilteringSplitRule::new()),
        Arc::new(TabTaskControlRule::new()),
        Arc::new(VersionStampRule::new(version_path)),
    ]
}

fn rule_meta(
    target: &str,
    action: &str,
    reason: &str,
    (year, month, day): (i32, u32, u32),
    introduced: &str,
) -> MigrationRuleMeta {
    MigrationRuleMeta {
        author: "settings-core".to_string(),
        reason: reason.to_string(),
        target: target.to_string(),
        action: action.to_string(),
        authored: NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default(),
        version: RuleVersionSpan {
            introduced: introduced.to_string(),
            obsoleted: None,
        },
    }
}
